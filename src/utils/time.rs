//! RFC 3339 timestamps written with a fixed millisecond precision in UTC, so that
//! stored values compare as text in the same order as in time.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

pub fn to_sortable(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_sortable(value))
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&to_sortable(v)),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_seconds_sort_after_whole_seconds() {
        let whole: DateTime<Utc> = "2025-04-12T10:00:00Z".parse().unwrap();
        let half: DateTime<Utc> = "2025-04-12T10:00:00.5Z".parse().unwrap();

        assert_eq!(to_sortable(&whole), "2025-04-12T10:00:00.000Z");
        assert_eq!(to_sortable(&half), "2025-04-12T10:00:00.500Z");
        assert!(to_sortable(&whole) < to_sortable(&half));
    }
}
