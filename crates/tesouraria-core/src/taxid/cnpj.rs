//! CNPJ (Brazilian legal entity number) validation and formatting.

use super::{all_same, digit_vec, mod11_digit, only_digits};

const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Validate a CNPJ using both mod-11 check digits.
pub fn validate_cnpj(cnpj: &str) -> bool {
    let digits = digit_vec(cnpj);

    if digits.len() != 14 || all_same(&digits) {
        return false;
    }

    let first = mod11_digit(&digits[..12], &FIRST_WEIGHTS);
    let second = mod11_digit(&digits[..13], &SECOND_WEIGHTS);

    first == digits[12] && second == digits[13]
}

/// Format a CNPJ progressively as `00.000.000/0000-00`.
pub fn format_cnpj(cnpj: &str) -> String {
    let digits: String = only_digits(cnpj).chars().take(14).collect();
    let groups = [(0, 2, ""), (2, 5, "."), (5, 8, "."), (8, 12, "/"), (12, 14, "-")];

    let mut out = String::with_capacity(18);
    for (start, end, sep) in groups {
        if digits.len() <= start {
            break;
        }
        out.push_str(sep);
        out.push_str(&digits[start..end.min(digits.len())]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cnpj_valid() {
        assert!(validate_cnpj("11.222.333/0001-81"));
        assert!(validate_cnpj("11222333000181"));
    }

    #[test]
    fn test_validate_cnpj_altered_last_digit() {
        assert!(!validate_cnpj("11.222.333/0001-82"));
        assert!(!validate_cnpj("11.222.333/0001-80"));
    }

    #[test]
    fn test_validate_cnpj_invalid_shape() {
        assert!(!validate_cnpj("00.000.000/0000-00"));
        assert!(!validate_cnpj("1122233300018"));
        assert!(!validate_cnpj("not a cnpj"));
    }

    #[test]
    fn test_format_cnpj() {
        assert_eq!(format_cnpj("11222333000181"), "11.222.333/0001-81");
        assert_eq!(format_cnpj("112223330001"), "11.222.333/0001");
    }
}
