//! CPF (Brazilian individual taxpayer number) validation and formatting.

use super::{all_same, digit_vec, mod11_digit, only_digits};

/// Validate a CPF using both mod-11 check digits.
///
/// Format: 11 digits, punctuation ignored. Sequences of one repeated digit
/// pass the arithmetic but are not issued, so they are rejected.
pub fn validate_cpf(cpf: &str) -> bool {
    let digits = digit_vec(cpf);

    if digits.len() != 11 || all_same(&digits) {
        return false;
    }

    let first = mod11_digit(&digits[..9], &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = mod11_digit(&digits[..10], &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);

    first == digits[9] && second == digits[10]
}

/// Format a CPF progressively as `000.000.000-00`.
///
/// Extra digits beyond 11 are dropped, partial input is formatted as far
/// as it goes.
pub fn format_cpf(cpf: &str) -> String {
    let digits: String = only_digits(cpf).chars().take(11).collect();
    let groups = [(0, 3, ""), (3, 6, "."), (6, 9, "."), (9, 11, "-")];

    let mut out = String::with_capacity(14);
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
    fn test_validate_cpf_valid() {
        assert!(validate_cpf("111.444.777-35"));
        assert!(validate_cpf("11144477735"));
        assert!(validate_cpf("529.982.247-25"));
    }

    #[test]
    fn test_validate_cpf_invalid() {
        assert!(!validate_cpf("111.111.111-11")); // Repeated digits
        assert!(!validate_cpf("111.444.777-36")); // Wrong check digit
        assert!(!validate_cpf("1114447773")); // Too short
        assert!(!validate_cpf("111444777350")); // Too long
        assert!(!validate_cpf(""));
    }

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_cpf("11144477735"), "111.444.777-35");
        assert_eq!(format_cpf("111.444.777-35"), "111.444.777-35");
        assert_eq!(format_cpf("1114"), "111.4");
        assert_eq!(format_cpf(""), "");
    }
}
