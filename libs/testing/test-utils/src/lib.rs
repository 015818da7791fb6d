//! Shared test utilities for domain testing
//!
//! - `TestDataBuilder`: deterministic ids, names and keys derived from a seed
//! - `assertions`: decimal and option assertion helpers
//!
//! # Usage
//!
//! ```rust
//! use test_utils::{assertions::assert_decimal_eq, TestDataBuilder};
//! use rust_decimal::Decimal;
//!
//! let builder = TestDataBuilder::from_test_name("test_reference_quote");
//! let owner = builder.user_id();
//! let filament_id = builder.filament_id(1);
//!
//! assert!(!owner.is_empty());
//! assert!(filament_id > 0);
//! assert_decimal_eq(Decimal::new(1810, 2), "18.10", "final price");
//! ```

use uuid::Uuid;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    fn uuid(&self, salt: u64) -> Uuid {
        let mixed = self.seed ^ salt.rotate_left(32);
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&mixed.to_le_bytes());
        bytes[8..].copy_from_slice(&self.seed.to_be_bytes());
        Uuid::from_bytes(bytes)
    }

    /// Deterministic user id for this test
    pub fn user_id(&self) -> String {
        self.uuid(0).to_string()
    }

    /// A second user, distinct from [`Self::user_id`]
    pub fn other_user_id(&self) -> String {
        self.uuid(1).to_string()
    }

    /// Non-zero catalog id; `n` distinguishes several filaments in one test
    pub fn filament_id(&self, n: u32) -> u64 {
        (self.seed % 1_000_000) * 100 + u64::from(n % 100) + 1
    }

    /// Generate a unique name for testing, e.g. `test-quote-12345-main`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Preset key scoped to this test, e.g. `energy_12345_home`
    pub fn preset_key(&self, family: &str, label: &str) -> String {
        format!("{}_{}_{}", family, self.seed, label)
    }
}

/// Test assertion helpers
pub mod assertions {
    use rust_decimal::Decimal;
    use std::str::FromStr;

    /// Assert a decimal equals the literal `expected`, ignoring trailing zeros
    pub fn assert_decimal_eq(actual: Decimal, expected: &str, context: &str) {
        let expected = Decimal::from_str(expected)
            .unwrap_or_else(|e| panic!("{}: invalid expected decimal {:?}: {}", context, expected, e));
        assert_eq!(
            actual, expected,
            "{}: expected {}, got {}",
            context, expected, actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
