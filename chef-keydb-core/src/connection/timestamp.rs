//! Timestamp values that survive PostgreSQL's `infinity`.
//!
//! Chef Server stores `'infinity'` as the expiration of keys that never
//! expire. chrono cannot represent it, so decoding such a column straight
//! into `DateTime<Utc>` fails. `PgTimestamp` decodes both `timestamp` and
//! `timestamptz` and keeps the infinite values as their string forms.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgTypeInfo, PgValueFormat, PgValueRef, Postgres};
use sqlx::{Decode, Type};
use std::str::FromStr;

const INFINITY: &str = "infinity";
const NEG_INFINITY: &str = "-infinity";

/// A PostgreSQL timestamp, finite or not.
///
/// # Example
/// ```rust
/// use chef_keydb_core::PgTimestamp;
///
/// let ts: PgTimestamp = "infinity".parse()?;
/// assert_eq!(ts, PgTimestamp::Infinity);
/// assert_eq!(ts.to_string(), "infinity");
/// # Ok::<(), chef_keydb_core::connection::TimestampParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgTimestamp {
    /// A regular point in time
    Finite(DateTime<Utc>),
    /// `infinity`
    Infinity,
    /// `-infinity`
    NegInfinity,
}

/// Error returned when a string is not a recognized timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{0}'")]
pub struct TimestampParseError(String);

impl PgTimestamp {
    /// Converts the binary wire value: microseconds since 2000-01-01 UTC,
    /// with `i64::MAX`/`i64::MIN` reserved for the infinities.
    pub fn from_micros(micros: i64) -> Option<Self> {
        match micros {
            i64::MAX => Some(Self::Infinity),
            i64::MIN => Some(Self::NegInfinity),
            _ => {
                let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single()?;
                epoch
                    .checked_add_signed(TimeDelta::microseconds(micros))
                    .map(Self::Finite)
            }
        }
    }

    /// True for `infinity` and `-infinity`.
    pub fn is_infinite(&self) -> bool {
        !matches!(self, Self::Finite(_))
    }

    /// The finite value, if any.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Finite(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl std::fmt::Display for PgTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Infinity => f.write_str(INFINITY),
            Self::NegInfinity => f.write_str(NEG_INFINITY),
        }
    }
}

impl FromStr for PgTimestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            INFINITY => return Ok(Self::Infinity),
            NEG_INFINITY => return Ok(Self::NegInfinity),
            _ => {}
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::Finite(dt.with_timezone(&Utc)));
        }
        // PostgreSQL text output: `2014-06-01 12:00:00.5+00`
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
            return Ok(Self::Finite(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
            return Ok(Self::Finite(naive.and_utc()));
        }

        Err(TimestampParseError(s.to_string()))
    }
}

impl Type<Postgres> for PgTimestamp {
    fn type_info() -> PgTypeInfo {
        <DateTime<Utc> as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        *ty == <DateTime<Utc> as Type<Postgres>>::type_info()
            || *ty == <NaiveDateTime as Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for PgTimestamp {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        match value.format() {
            PgValueFormat::Binary => {
                let bytes: [u8; 8] = value.as_bytes()?.try_into()?;
                let micros = i64::from_be_bytes(bytes);
                PgTimestamp::from_micros(micros)
                    .ok_or_else(|| format!("timestamp out of range: {}", micros).into())
            }
            PgValueFormat::Text => Ok(value.as_str()?.parse()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_infinities() {
        assert_eq!("infinity".parse::<PgTimestamp>().unwrap(), PgTimestamp::Infinity);
        assert_eq!(
            "-infinity".parse::<PgTimestamp>().unwrap(),
            PgTimestamp::NegInfinity
        );
        assert!(PgTimestamp::Infinity.is_infinite());
        assert_eq!(PgTimestamp::NegInfinity.to_string(), "-infinity");
    }

    #[test]
    fn test_parse_postgres_text_formats() {
        let expected = Utc.with_ymd_and_hms(2014, 6, 1, 12, 0, 0).unwrap();

        let tz: PgTimestamp = "2014-06-01 12:00:00+00".parse().unwrap();
        assert_eq!(tz.as_datetime(), Some(expected));

        let naive: PgTimestamp = "2014-06-01 12:00:00".parse().unwrap();
        assert_eq!(naive.as_datetime(), Some(expected));

        let rfc: PgTimestamp = "2014-06-01T12:00:00Z".parse().unwrap();
        assert_eq!(rfc, PgTimestamp::Finite(expected));
    }

    #[test]
    fn test_parse_invalid() {
        let error = "next tuesday".parse::<PgTimestamp>().unwrap_err();
        assert_eq!(error.to_string(), "invalid timestamp 'next tuesday'");
    }

    #[test]
    fn test_from_micros() {
        assert_eq!(PgTimestamp::from_micros(i64::MAX), Some(PgTimestamp::Infinity));
        assert_eq!(
            PgTimestamp::from_micros(i64::MIN),
            Some(PgTimestamp::NegInfinity)
        );

        let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(PgTimestamp::from_micros(0), Some(PgTimestamp::Finite(epoch)));
        assert_eq!(
            PgTimestamp::from_micros(1_000_000),
            Some(PgTimestamp::Finite(epoch + TimeDelta::seconds(1)))
        );
    }

    #[test]
    fn test_display_round_trip() {
        let ts: PgTimestamp = "2014-06-01T12:00:00+00:00".parse().unwrap();
        let round_trip: PgTimestamp = ts.to_string().parse().unwrap();
        assert_eq!(ts, round_trip);
    }
}
