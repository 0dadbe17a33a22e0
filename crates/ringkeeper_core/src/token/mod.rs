//! Ring token arithmetic.
//!
//! ## Core Concepts
//! - **Initial tokens**: a ring of `ring_size` slots is split evenly over the
//!   partition space; slot `position` starts at `min + span * position / ring_size`.
//! - **Region offsets**: each region shifts its tokens by a small stable hash of
//!   its name, so identical ring layouts deployed in several regions never
//!   collide.
//! - **Closest token**: nearest-neighbor lookup used during topology changes.
//!   Exact ties resolve to the larger token.

pub mod partition;


pub use partition::{PartitionSpace, Token, MAX_TOKEN, MIN_TOKEN};

use crate::error::PlacementError;

/// Region offsets are masked into `[0, 2^31)`.
const REGION_OFFSET_MASK: u32 = 0x7fff_ffff;

/// Largest ring [`TokenManager::ring_tokens`] will materialize at once.
pub const MAX_SPLIT_RING_SIZE: i64 = 1 << 16;

/// Stable per-region token offset.
///
/// Derived from the BLAKE3 digest of the UTF-8 region name, so every node in a
/// region computes the same value on any process or platform.
///
/// # Arguments
/// - `region`: Region (data center) name, e.g. `us-east-1`.
///
/// # Returns
/// The first four digest bytes read big-endian, masked into `[0, 2^31)`.
pub fn region_offset(region: &str) -> u32 {
    let digest = blake3::hash(region.as_bytes());
    let bytes = digest.as_bytes();
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) & REGION_OFFSET_MASK
}

fn non_negative(name: &str, value: i64) -> Result<u64, PlacementError> {
    u64::try_from(value).map_err(|_| {
        PlacementError::InvalidArgument(format!("{} must be >= 0, got {}", name, value))
    })
}

fn ring_size_arg(ring_size: i64) -> Result<u64, PlacementError> {
    if ring_size < 1 {
        return Err(PlacementError::InvalidArgument(format!(
            "ring size must be >= 1, got {}",
            ring_size
        )));
    }
    non_negative("ring size", ring_size)
}

fn overflow() -> PlacementError {
    PlacementError::InvalidArgument("token arithmetic overflow".to_string())
}

/// Computes ring tokens over a [`PartitionSpace`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenManager {
    space: PartitionSpace,
}

impl TokenManager {
    pub fn new(space: PartitionSpace) -> Self {
        Self { space }
    }

    pub fn space(&self) -> PartitionSpace {
        self.space
    }

    /// Token for slot `position` of an evenly split ring, shifted by `offset`.
    ///
    /// The result is not clamped; callers keep `offset` small enough that the
    /// token stays within the partition space.
    ///
    /// # Arguments
    /// - `ring_size`: Number of slots the space is split into.
    /// - `position`: Zero-based slot index.
    /// - `offset`: Shift added after the split, usually a region offset.
    ///
    /// # Returns
    /// `min + floor(span * position / ring_size) + offset`.
    ///
    /// # Errors
    /// `InvalidArgument` when `ring_size < 1`, `position < 0` or `offset < 0`.
    pub fn initial_token(
        &self,
        ring_size: i64,
        position: i64,
        offset: i64,
    ) -> Result<Token, PlacementError> {
        let ring_size = ring_size_arg(ring_size)?;
        let position = non_negative("position", position)?;
        let offset = non_negative("offset", offset)?;

        let step = self
            .space
            .span()
            .checked_mul(Token::from(position))
            .ok_or_else(overflow)?
            / Token::from(ring_size);
        self.space
            .min()
            .checked_add(step)
            .and_then(|token| token.checked_add(Token::from(offset)))
            .ok_or_else(overflow)
    }

    /// Region-aware token for slot `position`, as a decimal string.
    ///
    /// Equals `floor(max / ring_size) * position + region_offset(region)`.
    ///
    /// # Errors
    /// `InvalidArgument` when `ring_size < 1` or `position < 0`.
    pub fn create_token(
        &self,
        position: i64,
        ring_size: i64,
        region: &str,
    ) -> Result<String, PlacementError> {
        let ring_size = ring_size_arg(ring_size)?;
        let position = non_negative("position", position)?;

        let token = (self.space.max() / Token::from(ring_size))
            .checked_mul(Token::from(position))
            .and_then(|token| token.checked_add(Token::from(self.region_offset(region))))
            .ok_or_else(overflow)?;
        Ok(token.to_string())
    }

    /// Token for `slot` in a ring of `rack_count` racks of `rack_size` nodes.
    ///
    /// # Errors
    /// `InvalidArgument` when the rack geometry is empty or negative.
    pub fn create_rack_token(
        &self,
        slot: i64,
        rack_count: i64,
        rack_size: i64,
        region: &str,
    ) -> Result<String, PlacementError> {
        let rack_count = ring_size_arg(rack_count)?;
        let rack_size = ring_size_arg(rack_size)?;
        let ring_size = rack_count
            .checked_mul(rack_size)
            .and_then(|size| i64::try_from(size).ok())
            .ok_or_else(overflow)?;
        self.create_token(slot, ring_size, region)
    }

    /// See [`region_offset`].
    pub fn region_offset(&self, region: &str) -> u32 {
        region_offset(region)
    }

    /// Every slot token of an evenly split ring, shifted by `offset`.
    ///
    /// # Errors
    /// Same as [`TokenManager::initial_token`], plus `InvalidArgument` when
    /// `ring_size` exceeds [`MAX_SPLIT_RING_SIZE`].
    pub fn ring_tokens(&self, ring_size: i64, offset: i64) -> Result<Vec<Token>, PlacementError> {
        ring_size_arg(ring_size)?;
        if ring_size > MAX_SPLIT_RING_SIZE {
            return Err(PlacementError::InvalidArgument(format!(
                "ring size {} exceeds the split limit of {}",
                ring_size, MAX_SPLIT_RING_SIZE
            )));
        }
        (0..ring_size)
            .map(|position| self.initial_token(ring_size, position, offset))
            .collect()
    }

    /// Candidate nearest to `target`; exact ties go to the larger candidate.
    ///
    /// # Errors
    /// `InvalidArgument` when `candidates` is empty.
    pub fn find_closest_token(
        &self,
        target: Token,
        candidates: &[Token],
    ) -> Result<Token, PlacementError> {
        let distance = |token: Token| {
            if token > target {
                token - target
            } else {
                target - token
            }
        };

        let mut iter = candidates.iter().copied();
        let first = iter.next().ok_or_else(|| {
            PlacementError::InvalidArgument("token candidate list is empty".to_string())
        })?;

        let mut closest = first;
        let mut closest_distance = distance(first);
        for candidate in iter {
            let candidate_distance = distance(candidate);
            if candidate_distance < closest_distance
                || (candidate_distance == closest_distance && candidate > closest)
            {
                closest = candidate;
                closest_distance = candidate_distance;
            }
        }
        Ok(closest)
    }
}
