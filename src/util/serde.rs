//! Shared identifier types and serde helpers.

/// Caller-supplied job identifier. The scheduler never deduplicates ids.
pub type JobId = u64;

/// Serialize a [`std::time::Duration`] as whole milliseconds.
///
/// Use with `#[serde(with = "crate::util::serde::millis")]`.
pub mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Write the duration as a millisecond count.
    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(crate::util::clock::duration_ms(*value))
    }

    /// Read a millisecond count back into a duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
