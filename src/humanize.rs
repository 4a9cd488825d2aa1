//! Human-readable duration formatting and parsing utilities

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid duration format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
}

/// Duration wrapper with human-readable parsing ("500ms", "8s", "2m", "1h")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HumanDuration(pub Duration);

impl HumanDuration {
    pub fn from_secs(secs: u64) -> Self {
        HumanDuration(Duration::from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Self {
        HumanDuration(Duration::from_millis(millis))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Render using the largest unit that divides the value exactly
    pub fn to_human_readable(&self) -> String {
        const UNITS: &[(&str, u128)] = &[
            ("ms", 1),
            ("s", 1_000),
            ("m", 60 * 1_000),
            ("h", 60 * 60 * 1_000),
        ];

        let millis = self.0.as_millis();
        if millis == 0 {
            return "0s".to_string();
        }

        for &(unit, divisor) in UNITS.iter().rev() {
            if millis % divisor == 0 {
                return format!("{}{}", millis / divisor, unit);
            }
        }

        format!("{}ms", millis)
    }
}

impl Serialize for HumanDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_human_readable())
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct HumanDurationVisitor;

        impl<'de> serde::de::Visitor<'de> for HumanDurationVisitor {
            type Value = HumanDuration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "a duration as string (e.g., \"500ms\", \"8s\") or integer seconds",
                )
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(HumanDuration::from_secs(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(HumanDuration::from_secs)
                    .map_err(|_| E::custom(format!("duration must not be negative: {}", v)))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse::<HumanDuration>().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(HumanDurationVisitor)
    }
}

impl FromStr for HumanDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        // Bare numbers are seconds
        if let Ok(num) = s.parse::<u64>() {
            return Ok(HumanDuration::from_secs(num));
        }

        let (num_str, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
            Some(0) | None => return Err(ParseError::InvalidFormat(s.to_string())),
            Some(pos) => (&s[..pos], &s[pos..]),
        };

        let num: u64 = num_str.parse()?;

        let duration = match unit.trim() {
            "ms" => Duration::from_millis(num),
            "s" | "sec" | "secs" => Duration::from_secs(num),
            "m" | "min" | "mins" => Duration::from_secs(scale(num, 60, &s)?),
            "h" | "hr" | "hrs" => Duration::from_secs(scale(num, 60 * 60, &s)?),
            _ => return Err(ParseError::InvalidUnit(unit.to_string())),
        };

        Ok(HumanDuration(duration))
    }
}

fn scale(num: u64, factor: u64, input: &str) -> Result<u64, ParseError> {
    num.checked_mul(factor)
        .ok_or_else(|| ParseError::InvalidFormat(input.to_string()))
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!("8".parse::<HumanDuration>().unwrap(), HumanDuration::from_secs(8));
        assert_eq!("8s".parse::<HumanDuration>().unwrap(), HumanDuration::from_secs(8));
        assert_eq!(" 1S ".parse::<HumanDuration>().unwrap(), HumanDuration::from_secs(1));
    }

    #[test]
    fn test_parse_millis_and_larger_units() {
        assert_eq!("250ms".parse::<HumanDuration>().unwrap(), HumanDuration::from_millis(250));
        assert_eq!("2m".parse::<HumanDuration>().unwrap(), HumanDuration::from_secs(120));
        assert_eq!("1h".parse::<HumanDuration>().unwrap(), HumanDuration::from_secs(3600));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "s".parse::<HumanDuration>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "5 fortnights".parse::<HumanDuration>(),
            Err(ParseError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_parse_rejects_overflowing_units() {
        assert!(matches!(
            "9999999999999999h".parse::<HumanDuration>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "999999999999999999m".parse::<HumanDuration>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert_eq!(
            "5124095576030431h".parse::<HumanDuration>().unwrap(),
            HumanDuration::from_secs(5124095576030431 * 3600)
        );
    }

    #[test]
    fn test_to_human_readable() {
        assert_eq!(HumanDuration::from_secs(8).to_human_readable(), "8s");
        assert_eq!(HumanDuration::from_millis(1500).to_human_readable(), "1500ms");
        assert_eq!(HumanDuration::from_secs(120).to_human_readable(), "2m");
        assert_eq!(HumanDuration::from_secs(0).to_human_readable(), "0s");
    }

    #[test]
    fn test_deserialize_string() {
        let json = r#"{"delay": "500ms"}"#;
        #[derive(Deserialize)]
        struct TestStruct {
            delay: HumanDuration,
        }
        let parsed: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.delay.as_duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_deserialize_number() {
        let json = r#"{"delay": 4}"#;
        #[derive(Deserialize)]
        struct TestStruct {
            delay: HumanDuration,
        }
        let parsed: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.delay.as_duration(), Duration::from_secs(4));
    }

    #[test]
    fn test_serialize_roundtrips_through_display() {
        let value = serde_json::to_string(&HumanDuration::from_secs(30)).unwrap();
        assert_eq!(value, r#""30s""#);
    }
}
