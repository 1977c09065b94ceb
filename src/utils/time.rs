use anyhow::{bail, Result};
use chrono::NaiveDate;

const DISPLAY_FORMAT: &str = "%d-%m-%Y";

/// Entries this many days old or younger can still be changed.
pub const EDIT_WINDOW_DAYS: i64 = 7;

/// This is the standard way of converting a date to a ledger key in jaapledger.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whether an entry dated `date` can still be edited on `today`. Future dates never are.
pub fn is_editable(date: NaiveDate, today: NaiveDate) -> bool {
    (0..=EDIT_WINDOW_DAYS).contains(&(today - date).num_days())
}

/// Formats a date the way milestones are shown to the user: `DD-MM-YYYY`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parses a manually entered `DD-MM-YYYY` date. Only the exact shape is accepted; chrono alone
/// would also take single digit days or signed years.
pub fn parse_display_date(value: &str) -> Result<NaiveDate> {
    let bytes = value.as_bytes();
    let well_shaped = bytes.len() == 10
        && bytes[2] == b'-'
        && bytes[5] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
    if !well_shaped {
        bail!("Expected a date in DD-MM-YYYY format, got \"{value}\"");
    }
    match NaiveDate::parse_from_str(value, DISPLAY_FORMAT) {
        Ok(date) => Ok(date),
        Err(e) => bail!("\"{value}\" is not a valid calendar date: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_to_record_name, format_display_date, is_editable, parse_display_date};

    #[test]
    fn parse_display_date_accepts_day_month_year() {
        assert_eq!(
            parse_display_date("15-03-2023").unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
        );
    }

    #[test]
    fn parse_display_date_rejects_malformed() {
        for value in [
            "2023-03-15",
            "15/03/2023",
            "5-3-2023",
            "15-03-23",
            "",
            "aa-bb-cccc",
            "31-02-2024",
            "00-01-2024",
            "15-13-2023",
        ] {
            assert!(parse_display_date(value).is_err(), "{value} should be rejected");
        }
    }

    #[test]
    fn formats_display_and_record_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(format_display_date(date), "01-02-2024");
        assert_eq!(date_to_record_name(date), "2024-02-01");
    }

    #[test]
    fn edit_window_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert!(is_editable(today, today));
        assert!(is_editable(NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(), today));
        assert!(!is_editable(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(), today));
        assert!(!is_editable(NaiveDate::from_ymd_opt(2024, 3, 21).unwrap(), today));
    }
}
