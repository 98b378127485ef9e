//! Conversions between ISO (`YYYY-MM-DD`) and Brazilian (`DD/MM/YYYY`) dates.

use chrono::NaiveDate;

const ISO_FORMAT: &str = "%Y-%m-%d";
const BR_FORMAT: &str = "%d/%m/%Y";

/// Format a date as `DD/MM/YYYY`.
pub fn format_br(date: NaiveDate) -> String {
    date.format(BR_FORMAT).to_string()
}

/// Convert `YYYY-MM-DD` to `DD/MM/YYYY`.
///
/// Input that is not a strict ISO date is returned unchanged (or `-` when
/// empty), so display code never fails on odd stored values.
pub fn ymd_to_br(ymd: &str) -> String {
    if ymd.is_empty() {
        return "-".to_string();
    }
    if ymd.len() != 10 {
        return ymd.to_string();
    }
    NaiveDate::parse_from_str(ymd, ISO_FORMAT)
        .map(format_br)
        .unwrap_or_else(|_| ymd.to_string())
}

/// Convert `DD/MM/YYYY` to `YYYY-MM-DD`, returning the input unchanged when
/// it does not match.
pub fn br_to_ymd(br: &str) -> String {
    if br.len() != 10 {
        return br.to_string();
    }
    NaiveDate::parse_from_str(br, BR_FORMAT)
        .map(|d| d.format(ISO_FORMAT).to_string())
        .unwrap_or_else(|_| br.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ymd_to_br() {
        assert_eq!(ymd_to_br("2024-03-10"), "10/03/2024");
        assert_eq!(ymd_to_br(""), "-");
        assert_eq!(ymd_to_br("10/03/2024"), "10/03/2024");
        assert_eq!(ymd_to_br("2024-3-1"), "2024-3-1");
    }

    #[test]
    fn test_br_to_ymd() {
        assert_eq!(br_to_ymd("10/03/2024"), "2024-03-10");
        assert_eq!(br_to_ymd("2024-03-10"), "2024-03-10");
        assert_eq!(br_to_ymd("31/02/2024"), "31/02/2024");
    }

    #[test]
    fn test_format_br() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_br(date), "05/01/2024");
    }
}
