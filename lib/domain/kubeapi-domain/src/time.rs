use chrono::{DateTime, Utc};

/// Layout shared by every timestamp in records and snapshots.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders in UTC, dropping sub-second precision.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn now_formatted() -> String {
    format_timestamp(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_sub_second_part() {
        // 2024-03-05T07:08:09.123Z
        let ts = DateTime::<Utc>::from_timestamp_millis(1_709_622_489_123).unwrap();
        assert_eq!(format_timestamp(ts), "2024-03-05 07:08:09");
    }

    #[test]
    fn epoch_zero_is_formatted() {
        assert_eq!(format_timestamp(DateTime::<Utc>::UNIX_EPOCH), "1970-01-01 00:00:00");
    }

    #[test]
    fn now_matches_layout() {
        let now = now_formatted();
        assert_eq!(now.len(), "YYYY-MM-DD HH:MM:SS".len());
        assert!(
            DateTime::parse_from_str(&format!("{now} +0000"), "%Y-%m-%d %H:%M:%S %z").is_ok()
        );
    }
}
