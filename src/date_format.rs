//! Timestamps travel as milliseconds since the Unix epoch.
use chrono::NaiveDateTime;
use serde::{self, Deserialize, Deserializer, Serializer};

pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(date.and_utc().timestamp_millis())
}

pub fn timestamp_to_date_time(timestamp: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(timestamp).map(|dt| dt.naive_utc())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamp = i64::deserialize(deserializer)?;
    timestamp_to_date_time(timestamp).ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
    struct Stamped {
        #[serde(with = "crate::date_format")]
        created: NaiveDateTime,
    }

    #[test]
    fn millisecond_round_trip() {
        let created = timestamp_to_date_time(1_600_000_000_123).unwrap();
        let value = Stamped { created };
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"created":1600000000123}"#);
        let back: Stamped = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        assert!(serde_json::from_str::<Stamped>(r#"{"created":9223372036854775807}"#).is_err());
    }
}
