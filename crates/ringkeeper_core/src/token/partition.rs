//! Token range of the random partitioner.

use ruint::aliases::U256;

/// A ring position. 256 bits hold every intermediate product of the token
/// arithmetic (`2^127 * 2^63`) without overflow.
pub type Token = U256;

/// Closed interval `[min, max]` that ring tokens are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSpace {
    min: Token,
    max: Token,
}

/// Smallest token of the random partitioner.
pub const MIN_TOKEN: Token = Token::ZERO;

/// Largest token of the random partitioner, `2^127`.
pub const MAX_TOKEN: Token = Token::from_limbs([0, 1 << 63, 0, 0]);

impl PartitionSpace {
    /// Address space of a uniform random (MD5-style) partitioner.
    pub const RANDOM: Self = Self {
        min: MIN_TOKEN,
        max: MAX_TOKEN,
    };

    /// Build a custom space; `None` unless `min < max`.
    pub fn new(min: Token, max: Token) -> Option<Self> {
        (min < max).then_some(Self { min, max })
    }

    pub fn min(&self) -> Token {
        self.min
    }

    pub fn max(&self) -> Token {
        self.max
    }

    /// Width of the interval, `max - min`.
    pub fn span(&self) -> Token {
        self.max - self.min
    }

    pub fn contains(&self, token: Token) -> bool {
        self.min <= token && token <= self.max
    }
}

impl Default for PartitionSpace {
    fn default() -> Self {
        Self::RANDOM
    }
}
