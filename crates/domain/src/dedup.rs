use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const MILLIS_PER_MINUTE: i64 = 1000 * 60;
const LOCAL_MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Absolute minute counted from the unix epoch in UTC. Stable for the whole
/// minute and different for every other minute, which makes it the key used
/// to make sure an occurrence is only dispatched once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MinuteBucket(i64);

impl MinuteBucket {
    pub fn new(minute: i64) -> Self {
        Self(minute)
    }

    pub fn from_timestamp(ts: i64) -> Self {
        Self(ts.div_euclid(MILLIS_PER_MINUTE))
    }

    pub fn inner(&self) -> i64 {
        self.0
    }

    /// First millisecond of this minute
    pub fn start_timestamp(&self) -> i64 {
        self.0.saturating_mul(MILLIS_PER_MINUTE)
    }

    /// Reads a `YYYY-MM-DD HH:MM` key written in the local time of a user
    /// with the given offset. Returns the bucket of the same minute.
    pub fn from_local_minute_key(key: &str, offset_minutes: i64) -> Option<Self> {
        let local = NaiveDateTime::parse_from_str(key.trim(), LOCAL_MINUTE_FORMAT).ok()?;
        let local_minute = local.and_utc().timestamp().div_euclid(60);
        Some(Self(local_minute.saturating_sub(offset_minutes)))
    }
}

/// What a record remembers about the last occurrence it was notified for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LastFiredMarker {
    Bucket(MinuteBucket),
    /// Formatted local minute written by older versions of the scheduler
    LocalMinute(String),
}

impl LastFiredMarker {
    /// The canonical bucket of this marker. A local minute key that
    /// can not be parsed yields `None` and never matches any occurrence.
    pub fn to_bucket(&self, offset_minutes: i64) -> Option<MinuteBucket> {
        match self {
            Self::Bucket(bucket) => Some(*bucket),
            Self::LocalMinute(key) => MinuteBucket::from_local_minute_key(key, offset_minutes),
        }
    }

    pub fn matches(&self, bucket: MinuteBucket, offset_minutes: i64) -> bool {
        self.to_bucket(offset_minutes) == Some(bucket)
    }
}

impl From<MinuteBucket> for LastFiredMarker {
    fn from(bucket: MinuteBucket) -> Self {
        Self::Bucket(bucket)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::local_time::to_local;
    use chrono::{TimeZone, Utc};

    #[test]
    fn bucket_is_stable_within_a_minute() {
        let start = Utc
            .with_ymd_and_hms(2021, 3, 10, 8, 0, 0)
            .unwrap()
            .timestamp_millis();
        let bucket = MinuteBucket::from_timestamp(start);
        assert_eq!(bucket, MinuteBucket::from_timestamp(start + 59_999));
        assert_ne!(bucket, MinuteBucket::from_timestamp(start + 60_000));
        assert_ne!(bucket, MinuteBucket::from_timestamp(start - 1));
        assert_eq!(bucket.start_timestamp(), start);
    }

    #[test]
    fn local_minute_key_is_equivalent_to_bucket() {
        let now = Utc
            .with_ymd_and_hms(2021, 3, 10, 23, 45, 12)
            .unwrap()
            .timestamp_millis();
        for offset in &[-720, -90, 0, 60, 330, 720, 1500] {
            let key = to_local(now, *offset).format_minute().unwrap();
            let marker = LastFiredMarker::LocalMinute(key);
            assert!(marker.matches(MinuteBucket::from_timestamp(now), *offset));
            assert!(!marker.matches(MinuteBucket::from_timestamp(now + 60_000), *offset));
        }
    }

    #[test]
    fn malformed_local_key_never_matches() {
        let marker = LastFiredMarker::LocalMinute("yesterday".into());
        assert_eq!(marker.to_bucket(0), None);
        assert!(!marker.matches(MinuteBucket::new(0), 0));
    }

    #[test]
    fn bucket_marker_ignores_offset() {
        let marker = LastFiredMarker::from(MinuteBucket::new(42));
        assert!(marker.matches(MinuteBucket::new(42), 0));
        assert!(marker.matches(MinuteBucket::new(42), 330));
    }
}
