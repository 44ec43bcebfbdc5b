//! Monthly account code allocation.
//!
//! Codes are `YYYYMM###`: a year-month stamp plus a three digit sequence that
//! restarts every month. The sequence continues from the highest code already
//! issued in the current month. A parent company registered together with its
//! first branch takes the allocated code itself and hands the branch the
//! numerically next one.

use chrono::{DateTime, Utc};

use crate::error::{CustomerError, CustomerResult};

const STAMP_FORMAT: &str = "%Y%m";
const FIRST_SUFFIX: &str = "001";

/// Year-month stamp of the current allocation window, e.g. `202401`.
pub fn month_stamp(now: DateTime<Utc>) -> String {
    now.format(STAMP_FORMAT).to_string()
}

/// Next code in the month: `<stamp>001` when the month is untouched,
/// otherwise the previous code's suffix incremented and zero-padded.
///
/// Known limitation, kept to match the established code format: suffix 999
/// rolls over to the ten character `<stamp>1000`, which sorts below
/// `<stamp>999` in the text-ordered last-code lookup. The lookup then keeps
/// returning `<stamp>999` and the unique code index rejects every further
/// registration until the month turns over.
pub fn next_code(previous: Option<&str>, stamp: &str) -> CustomerResult<String> {
    let Some(previous) = previous else {
        return Ok(format!("{stamp}{FIRST_SUFFIX}"));
    };

    let suffix = previous
        .get(6..9)
        .ok_or_else(|| CustomerError::Code(previous.to_string()))?;
    let sequence: u32 = suffix
        .parse()
        .map_err(|_| CustomerError::Code(previous.to_string()))?;

    Ok(format!("{stamp}{:03}", sequence + 1))
}

/// Code of the branch registered in the same request as its parent company:
/// the parent's full code treated as a number, plus one.
pub fn child_code(parent_code: &str) -> CustomerResult<String> {
    let numeric: i64 = parent_code
        .parse()
        .map_err(|_| CustomerError::Code(parent_code.to_string()))?;
    Ok(format!("{:03}", numeric + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamp_is_year_month() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(month_stamp(now), "202401");
    }

    #[test]
    fn first_code_of_the_month() {
        assert_eq!(next_code(None, "202401").unwrap(), "202401001");
    }

    #[test]
    fn sequence_continues_within_the_month() {
        assert_eq!(next_code(Some("202401001"), "202401").unwrap(), "202401002");
        assert_eq!(next_code(Some("202401041"), "202401").unwrap(), "202401042");
    }

    #[test]
    fn suffix_stays_zero_padded() {
        assert_eq!(next_code(Some("202401009"), "202401").unwrap(), "202401010");
    }

    #[test]
    fn malformed_previous_code_is_rejected() {
        assert!(matches!(
            next_code(Some("2024"), "202401"),
            Err(CustomerError::Code(_))
        ));
        assert!(matches!(
            next_code(Some("202401abc"), "202401"),
            Err(CustomerError::Code(_))
        ));
    }

    #[test]
    fn suffix_999_overflows_to_a_ten_character_code() {
        let overflowed = next_code(Some("202401999"), "202401").unwrap();
        assert_eq!(overflowed, "2024011000");
        // The overflowed code string-sorts below the 999 one, so the
        // descending last-code lookup never advances past it.
        assert!(overflowed.as_str() < "202401999");
    }

    #[test]
    fn branch_follows_its_parent() {
        assert_eq!(child_code("202401007").unwrap(), "202401008");
    }
}
