//! # Occupancy Map
//!
//! One flag per pool slot; `true` means allocated.

use std::collections::TryReserveError;

/// Per-slot allocation flags for a block pool.
///
/// Cloning the map gives a snapshot that can be compared after later
/// operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyMap {
    flags: Box<[bool]>,
    occupied: usize,
}

impl OccupancyMap {
    /// Reserves a map of `len` free slots without aborting on failure.
    pub(crate) fn try_new(len: usize) -> Result<Self, TryReserveError> {
        let mut flags = Vec::new();
        flags.try_reserve_exact(len)?;
        flags.resize(len, false);
        Ok(Self {
            flags: flags.into_boxed_slice(),
            occupied: 0,
        })
    }

    /// Number of slots tracked.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether the map tracks no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of slots currently marked allocated.
    #[inline]
    #[must_use]
    pub const fn occupied(&self) -> usize {
        self.occupied
    }

    /// Whether slot `index` is allocated. Out-of-range slots are never allocated.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Lowest free slot index, scanning upward from 0.
    #[must_use]
    pub fn first_free(&self) -> Option<usize> {
        self.flags.iter().position(|&taken| !taken)
    }

    /// Indices of allocated slots in ascending order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(index, &taken)| taken.then_some(index))
    }

    /// The raw flags.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }

    /// Marks a free slot allocated. Caller guarantees `index` is free and in range.
    pub(crate) fn occupy(&mut self, index: usize) {
        debug_assert!(!self.flags[index], "slot {index} already occupied");
        self.flags[index] = true;
        self.occupied += 1;
    }

    /// Marks an allocated slot free. Caller guarantees `index` is occupied.
    pub(crate) fn vacate(&mut self, index: usize) {
        debug_assert!(self.flags[index], "slot {index} already free");
        self.flags[index] = false;
        self.occupied -= 1;
    }

    /// Marks every slot free.
    pub(crate) fn reset(&mut self) {
        self.flags.fill(false);
        self.occupied = 0;
    }
}
