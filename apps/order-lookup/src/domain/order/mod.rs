//! Order Match Assembly
//!
//! Builds the response record for one matched catalog entry: the entry
//! name plus the server-local time of the match.

use chrono::Utc;

/// One matched catalog entry with the time it was matched.
///
/// Timestamps are captured independently per match, so matches emitted
/// for a single request may carry differing values if matching is slow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMatch {
    /// The matched catalog entry.
    pub item_name: String,
    /// Server-local time of the match, epoch seconds as a decimal string.
    pub time_stamp: String,
}

impl OrderMatch {
    /// Assemble a match record for `item_name`, stamping it with the
    /// current server time at second resolution.
    #[must_use]
    pub fn assemble(item_name: &str) -> Self {
        Self {
            item_name: item_name.to_string(),
            time_stamp: Utc::now().timestamp().to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_populates_name_and_timestamp() {
        let m = OrderMatch::assemble("red apple");
        assert_eq!(m.item_name, "red apple");
        assert!(!m.time_stamp.is_empty());
        assert!(m.time_stamp.parse::<i64>().is_ok());
    }

    #[test]
    fn timestamp_is_roughly_now() {
        let before = Utc::now().timestamp();
        let m = OrderMatch::assemble("kiwi");
        let after = Utc::now().timestamp();
        let stamped: i64 = m.time_stamp.parse().unwrap();
        assert!(stamped >= before && stamped <= after);
    }
}
