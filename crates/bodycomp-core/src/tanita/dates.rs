//! Conversion between device dates (`DD/MM/YYYY`) and canonical ones.

use chrono::{NaiveDate, NaiveDateTime};

use super::numeric::strip_quotes;

const DEVICE_DATE: &str = "%d/%m/%Y";
const CANONICAL_DATE: &str = "%Y-%m-%d";
const CANONICAL_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// `D/M/YYYY` or `DD/MM/YYYY` to `YYYY-MM-DD`. Invalid calendar dates yield `None`.
pub fn device_date_to_canonical(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(strip_quotes(raw), DEVICE_DATE)
        .ok()
        .map(|d| d.format(CANONICAL_DATE).to_string())
}

/// `YYYY-MM-DD` to zero-padded `DD/MM/YYYY`.
pub fn canonical_date_to_device(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), CANONICAL_DATE)
        .ok()
        .map(|d| d.format(DEVICE_DATE).to_string())
}

/// `DD/MM/YYYY HH:MM[:SS]` to `YYYY-MM-DD HH:MM:SS`.
pub fn device_timestamp_to_canonical(raw: &str) -> Option<String> {
    let cleaned = strip_quotes(raw);
    ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cleaned, fmt).ok())
        .map(|ts| ts.format(CANONICAL_TIMESTAMP).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_device_date_to_canonical() {
        assert_eq!(device_date_to_canonical("01/05/1990").as_deref(), Some("1990-05-01"));
        assert_eq!(device_date_to_canonical("1/2/1990").as_deref(), Some("1990-02-01"));
        assert_eq!(device_date_to_canonical("\"29/02/2024\"").as_deref(), Some("2024-02-29"));
        assert_eq!(device_date_to_canonical("31/02/2024"), None);
        assert_eq!(device_date_to_canonical(""), None);
    }

    #[test]
    fn test_canonical_date_to_device() {
        assert_eq!(canonical_date_to_device("1990-02-01").as_deref(), Some("01/02/1990"));
        assert_eq!(canonical_date_to_device("garbage"), None);
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(
            device_timestamp_to_canonical("01/06/2024 08:30:00").as_deref(),
            Some("2024-06-01 08:30:00")
        );
        assert_eq!(
            device_timestamp_to_canonical("1/6/2024 8:30").as_deref(),
            Some("2024-06-01 08:30:00")
        );
        assert_eq!(device_timestamp_to_canonical("01/06/2024"), None);
        assert_eq!(device_timestamp_to_canonical("32/06/2024 08:30:00"), None);
    }

    proptest! {
        #[test]
        fn prop_date_round_trip(date in (1900i32..2100, 1u32..=12, 1u32..=31)
            .prop_filter_map("valid calendar date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)))
        {
            let device = date.format("%d/%m/%Y").to_string();
            let canonical = device_date_to_canonical(&device).unwrap();
            prop_assert_eq!(&canonical, &date.format("%Y-%m-%d").to_string());
            prop_assert_eq!(canonical_date_to_device(&canonical).unwrap(), device);

            let unpadded = format!(
                "{}/{}/{}",
                date.format("%-d"),
                date.format("%-m"),
                date.format("%Y")
            );
            prop_assert_eq!(device_date_to_canonical(&unpadded).unwrap(), canonical);
        }
    }
}
