//! Reference ids (idempotency keys) for posted transactions.
//!
//! The default `TX-<millis>-<0..999>` form is not collision-free; the backend
//! deduplicates on it, so a clash is rejected server-side rather than posted
//! twice. `ReferenceScheme::Uuid` trades the readable timestamp for a v4 uuid.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::config::ReferenceScheme;

#[derive(Debug, Clone)]
pub struct ReferenceIdGenerator {
    scheme: ReferenceScheme,
    last: Option<String>,
}

impl ReferenceIdGenerator {
    pub fn new(scheme: ReferenceScheme) -> Self {
        Self { scheme, last: None }
    }

    /// A fresh id, never equal to the one returned just before it.
    pub fn next_id(&mut self) -> String {
        loop {
            let candidate = match self.scheme {
                ReferenceScheme::Timestamp => timestamp_id(),
                ReferenceScheme::Uuid => format!("TX-{}", Uuid::new_v4()),
            };
            if self.last.as_deref() != Some(candidate.as_str()) {
                self.last = Some(candidate.clone());
                return candidate;
            }
        }
    }
}

impl Default for ReferenceIdGenerator {
    fn default() -> Self {
        Self::new(ReferenceScheme::default())
    }
}

fn timestamp_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("TX-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_ids_have_expected_shape() {
        let mut generator = ReferenceIdGenerator::new(ReferenceScheme::Timestamp);
        let id = generator.next_id();

        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3, "id {}", id);
        assert_eq!(parts[0], "TX");
        assert!(parts[1].parse::<i64>().unwrap() > 1_600_000_000_000);
        assert!(parts[2].parse::<u32>().unwrap() < 1000);
    }

    #[test]
    fn test_consecutive_ids_always_differ() {
        let mut generator = ReferenceIdGenerator::new(ReferenceScheme::Timestamp);
        let mut previous = generator.next_id();
        for _ in 0..2000 {
            let id = generator.next_id();
            assert_ne!(id, previous);
            previous = id;
        }
    }

    #[test]
    fn test_uuid_scheme() {
        let mut generator = ReferenceIdGenerator::new(ReferenceScheme::Uuid);
        let id = generator.next_id();
        let raw = id.strip_prefix("TX-").unwrap();
        assert!(Uuid::parse_str(raw).is_ok());
        assert_ne!(generator.next_id(), id);
    }
}
