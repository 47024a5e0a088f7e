//! Surrogate key generation
//!
//! Identity generation is routed through a trait so that the pipeline can
//! run with random UUIDs in production and deterministic ids under test.

use uuid::Uuid;

/// Generator of surrogate keys, one per source row
pub trait IdGenerator {
    /// Produce the next identity; must be unique within a run
    fn next_id(&mut self) -> Uuid;
}

/// Production generator backed by random v4 UUIDs
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl UuidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic generator yielding 1, 2, 3, ... encoded as UUIDs
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: u128,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self { counter: 0 }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> Uuid {
        self.counter += 1;
        Uuid::from_u128(self.counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_generator_is_deterministic() {
        let mut a = SequentialIdGenerator::new();
        let mut b = SequentialIdGenerator::new();

        assert_eq!(a.next_id(), b.next_id());
        assert_eq!(a.next_id(), Uuid::from_u128(2));
    }

    #[test]
    fn test_uuid_generator_is_unique() {
        let mut generator = UuidGenerator::new();
        let first = generator.next_id();
        let second = generator.next_id();
        assert_ne!(first, second);
    }
}
