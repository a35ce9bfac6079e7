//! Seeding strategies.

use std::fmt;

/// How a chunk generator is seeded before each draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedStrategy {
    /// High-resolution monotonic clock reading, in nanoseconds.
    TimeBased,
    /// Eight bytes from the operating system's secure random source.
    SecureSeeded,
    /// Most-significant 64 bits of a fresh v4 UUID.
    IdentifierBased,
}

impl SeedStrategy {
    /// All strategies, in the order their batches are concatenated.
    pub const ALL: [SeedStrategy; 3] = [
        SeedStrategy::TimeBased,
        SeedStrategy::SecureSeeded,
        SeedStrategy::IdentifierBased,
    ];

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SeedStrategy::TimeBased => "time",
            SeedStrategy::SecureSeeded => "secure",
            SeedStrategy::IdentifierBased => "uuid",
        }
    }
}

impl fmt::Display for SeedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
