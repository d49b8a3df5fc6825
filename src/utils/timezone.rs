//! Timezone-aware formatting for the vendor's form fields
//!
//! The transaction pages expect dates as DD-MM-YYYY and times as
//! hh:mm AM/PM in the branch's local timezone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{Cin7Error, ConfigError, Result};

/// Which half of a date/time field pair is being filled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockField {
    Date,
    Time,
}

/// Render an instant in the named timezone, formatted for the vendor form
pub fn format_in_timezone(
    instant: &DateTime<Utc>,
    timezone: &str,
    field: ClockField,
) -> Result<String> {
    let tz: Tz = timezone.parse().map_err(|_| {
        Cin7Error::Config(ConfigError::InvalidTimezone {
            value: timezone.to_string(),
        })
    })?;
    let local = instant.with_timezone(&tz);
    Ok(match field {
        ClockField::Date => local.format("%d-%m-%Y").to_string(),
        ClockField::Time => local.format("%I:%M %p").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_date_in_target_timezone() {
        // 23:30 UTC on the 14th is already the 15th in Auckland
        let instant = Utc.with_ymd_and_hms(2024, 3, 14, 23, 30, 0).unwrap();
        let date = format_in_timezone(&instant, "Pacific/Auckland", ClockField::Date).unwrap();
        assert_eq!(date, "15-03-2024");
    }

    #[test]
    fn formats_time_with_meridiem() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 14, 21, 5, 0).unwrap();
        let time = format_in_timezone(&instant, "UTC", ClockField::Time).unwrap();
        assert_eq!(time, "09:05 PM");
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let instant = Utc::now();
        let result = format_in_timezone(&instant, "Mars/Olympus", ClockField::Date);
        assert!(matches!(
            result,
            Err(Cin7Error::Config(ConfigError::InvalidTimezone { .. }))
        ));
    }
}
