//! Object key naming for uploaded documents.
//!
//! Keys embed a second-resolution timestamp so re-uploads of the same file
//! never overwrite each other: `20240115093045 - contract.pdf`. License files
//! additionally live under a per-license-name prefix.

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// `<timestamp> - <filename>`
pub fn timestamped_object_key(filename: &str, now: DateTime<Utc>) -> String {
    format!("{} - {}", now.format(TIMESTAMP_FORMAT), filename)
}

/// `<prefix>/<timestamp> - <filename>`
pub fn prefixed_object_key(prefix: &str, filename: &str, now: DateTime<Utc>) -> String {
    format!("{}/{}", prefix, timestamped_object_key(filename, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamped_key_format() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 45).unwrap();
        assert_eq!(
            timestamped_object_key("contract.pdf", now),
            "20240115093045 - contract.pdf"
        );
    }

    #[test]
    fn prefixed_key_includes_license_name() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 45).unwrap();
        assert_eq!(
            prefixed_object_key("Эм ханган нийлүүлэх", "license.jpg", now),
            "Эм ханган нийлүүлэх/20240115093045 - license.jpg"
        );
    }
}
