//! # Block Pool
//!
//! Fixed-size block allocator over one pre-allocated arena.
//!
//! The arena is `slot_size * slot_count` bytes, reserved once at creation.
//! Allocation scans the occupancy map upward from slot 0 and takes the first
//! free slot, so the layout is deterministic: after releasing slot 1 of
//! `[0, 1, 2]`, the next allocation is slot 1 again.

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::Pod;

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::memory::occupancy::OccupancyMap;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolId(u64);

fn next_pool_id() -> PoolId {
    PoolId(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one allocated block.
///
/// A handle is scoped to the pool that issued it and carries the slot index,
/// never an address. It is neither `Clone` nor `Copy`, and
/// [`BlockPool::release`] consumes it, so releasing the same handle twice
/// does not compile:
///
/// ```compile_fail,E0382
/// use keystone_core::BlockPool;
///
/// let mut pool = BlockPool::create(32, 4).unwrap();
/// let handle = pool.allocate().unwrap();
/// pool.release(handle).unwrap();
/// pool.release(handle).unwrap();
/// ```
#[derive(Debug)]
#[must_use = "dropping a block handle leaks its slot until the pool is cleared"]
pub struct BlockHandle {
    pool: PoolId,
    epoch: u64,
    index: usize,
}

impl BlockHandle {
    /// The pool that issued this handle.
    #[inline]
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool
    }

    /// Slot index within the issuing pool.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Allocation counters for one pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful allocations.
    pub allocations: u64,
    /// Successful releases.
    pub releases: u64,
    /// Allocations refused because every slot was in use.
    pub exhausted: u64,
    /// Releases refused as foreign or double releases.
    pub rejected_releases: u64,
    /// Highest number of slots in use at once.
    pub peak_in_use: usize,
}

/// A fixed-size block allocator.
///
/// All blocks have the same size. The arena and the occupancy map are
/// reserved once; allocate and release never touch the global allocator.
///
/// # Thread Safety
///
/// Every mutating call takes `&mut self`. A pool can be moved to another
/// thread but never shared for mutation without external locking.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = BlockPool::create(32, 4)?;
///
/// // O(`slot_count`) first-fit scan, no heap allocation
/// let handle = pool.allocate()?;
/// pool.write_value(&handle, &[1.0_f32, 2.0, 3.0, 4.0])?;
///
/// // Consumes the handle
/// pool.release(handle)?;
/// ```
pub struct BlockPool {
    id: PoolId,
    /// Bumped by `clear`; handles from an older epoch are stale.
    epoch: u64,
    arena: Box<[u8]>,
    occupancy: OccupancyMap,
    slot_size: usize,
    stats: PoolStats,
}

impl BlockPool {
    /// Creates a pool of `slot_count` blocks of `slot_size` bytes each.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroSlotSize`] / [`PoolError::ZeroSlotCount`] for empty
    ///   dimensions; nothing is reserved.
    /// - [`PoolError::OutOfMemory`] if the arena or the map cannot be
    ///   reserved; anything already reserved is released first.
    pub fn create(slot_size: usize, slot_count: usize) -> PoolResult<Self> {
        Self::with_config(PoolConfig::new(slot_size, slot_count))
    }

    /// Creates a pool from a validated configuration.
    ///
    /// # Errors
    ///
    /// Same as [`BlockPool::create`].
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        let PoolConfig {
            slot_size,
            slot_count,
        } = config;
        let out_of_memory = PoolError::OutOfMemory {
            slot_size,
            slot_count,
        };

        let bytes = config
            .arena_bytes()
            .ok_or_else(|| out_of_memory.clone())?;
        let mut arena = Vec::new();
        arena
            .try_reserve_exact(bytes)
            .map_err(|_| out_of_memory.clone())?;
        // Zero-filling touches every page, so under overcommit an oversized
        // arena can still be killed here rather than reported as out of memory.
        arena.resize(bytes, 0u8);

        // On failure `arena` drops here, so no partial reservation survives.
        let occupancy = OccupancyMap::try_new(slot_count).map_err(|_| out_of_memory)?;

        let id = next_pool_id();
        tracing::debug!(pool = %id, slot_size, slot_count, "pool created");

        Ok(Self {
            id,
            epoch: 0,
            arena: arena.into_boxed_slice(),
            occupancy,
            slot_size,
            stats: PoolStats::default(),
        })
    }

    /// Identity of this pool.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Size of each block in bytes.
    #[inline]
    #[must_use]
    pub const fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Total number of blocks.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.occupancy.len()
    }

    /// Number of blocks currently allocated.
    #[inline]
    #[must_use]
    pub const fn allocated_count(&self) -> usize {
        self.occupancy.occupied()
    }

    /// Number of free blocks.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.capacity() - self.allocated_count()
    }

    /// Size of the arena in bytes.
    #[inline]
    #[must_use]
    pub fn arena_bytes(&self) -> usize {
        self.arena.len()
    }

    /// Read-only view of the occupancy map.
    #[inline]
    #[must_use]
    pub const fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    /// Whether slot `index` is allocated.
    #[inline]
    #[must_use]
    pub fn is_allocated(&self, index: usize) -> bool {
        self.occupancy.is_occupied(index)
    }

    /// Allocation counters since creation.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Allocates the lowest-indexed free block.
    ///
    /// This is an **O(`slot_count`)** scan with **zero heap allocations**.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Exhausted`] if every block is in use; the
    /// occupancy map is left untouched.
    pub fn allocate(&mut self) -> PoolResult<BlockHandle> {
        let Some(index) = self.occupancy.first_free() else {
            self.stats.exhausted += 1;
            tracing::debug!(pool = %self.id, capacity = self.capacity(), "pool exhausted");
            return Err(PoolError::Exhausted {
                capacity: self.capacity(),
            });
        };

        self.occupancy.occupy(index);
        self.stats.allocations += 1;
        self.stats.peak_in_use = self.stats.peak_in_use.max(self.occupancy.occupied());
        tracing::trace!(pool = %self.id, slot = index, "block allocated");

        Ok(BlockHandle {
            pool: self.id,
            epoch: self.epoch,
            index,
        })
    }

    /// Returns a block to the pool.
    ///
    /// The handle is consumed whether or not the release succeeds.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ForeignHandle`] if another pool issued the handle, or
    ///   it predates an identity renewal in [`BlockPool::clear`].
    /// - [`PoolError::DoubleRelease`] if the handle's slot was already
    ///   returned (for example by [`BlockPool::clear`]).
    ///
    /// Either way the occupancy map is left unchanged.
    pub fn release(&mut self, handle: BlockHandle) -> PoolResult<()> {
        let index = match self.validate(&handle) {
            Ok(index) => index,
            Err(err) => {
                self.stats.rejected_releases += 1;
                let err = match err {
                    PoolError::StaleHandle { slot } => PoolError::DoubleRelease { slot },
                    other => other,
                };
                tracing::warn!(pool = %self.id, slot = handle.index, error = %err, "release rejected");
                return Err(err);
            }
        };

        self.occupancy.vacate(index);
        self.stats.releases += 1;
        tracing::trace!(pool = %self.id, slot = index, "block released");
        Ok(())
    }

    /// Frees every block at once.
    ///
    /// Outstanding handles become stale. The arena is kept, not zeroed.
    ///
    /// The epoch never wraps. If it would overflow, the pool takes a fresh
    /// [`PoolId`] instead, so every earlier handle is rejected as foreign.
    pub fn clear(&mut self) {
        let outstanding = self.occupancy.occupied();
        self.occupancy.reset();
        match self.epoch.checked_add(1) {
            Some(epoch) => self.epoch = epoch,
            None => {
                let retired = self.id;
                self.id = next_pool_id();
                self.epoch = 0;
                tracing::debug!(
                    pool = %self.id,
                    %retired,
                    "pool epochs exhausted, identity renewed"
                );
            }
        }
        tracing::debug!(pool = %self.id, outstanding, "pool cleared");
    }

    /// Releases the arena and the occupancy map.
    ///
    /// Outstanding handles are not tracked; presenting one to another pool
    /// is rejected as foreign.
    pub fn destroy(self) {
        drop(self);
    }

    /// Byte offset of the handle's block from the start of the arena.
    ///
    /// # Errors
    ///
    /// [`PoolError::ForeignHandle`] or [`PoolError::StaleHandle`].
    pub fn offset_of(&self, handle: &BlockHandle) -> PoolResult<usize> {
        self.validate(handle).map(|index| index * self.slot_size)
    }

    /// The bytes of the handle's block.
    ///
    /// # Errors
    ///
    /// [`PoolError::ForeignHandle`] or [`PoolError::StaleHandle`].
    pub fn block(&self, handle: &BlockHandle) -> PoolResult<&[u8]> {
        let start = self.offset_of(handle)?;
        Ok(&self.arena[start..start + self.slot_size])
    }

    /// The bytes of the handle's block, mutably.
    ///
    /// # Errors
    ///
    /// [`PoolError::ForeignHandle`] or [`PoolError::StaleHandle`].
    pub fn block_mut(&mut self, handle: &BlockHandle) -> PoolResult<&mut [u8]> {
        let start = self.offset_of(handle)?;
        Ok(&mut self.arena[start..start + self.slot_size])
    }

    /// Stores a plain-old-data value at the start of the handle's block.
    ///
    /// # Errors
    ///
    /// [`PoolError::BlockTooSmall`] if `T` is larger than a slot, plus the
    /// handle errors of [`BlockPool::block_mut`].
    pub fn write_value<T: Pod>(&mut self, handle: &BlockHandle, value: &T) -> PoolResult<()> {
        let bytes = bytemuck::bytes_of(value);
        self.check_fits(bytes.len())?;
        self.block_mut(handle)?[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Loads a plain-old-data value from the start of the handle's block.
    ///
    /// # Errors
    ///
    /// [`PoolError::BlockTooSmall`] if `T` is larger than a slot, plus the
    /// handle errors of [`BlockPool::block`].
    pub fn read_value<T: Pod>(&self, handle: &BlockHandle) -> PoolResult<T> {
        let size = mem::size_of::<T>();
        self.check_fits(size)?;
        Ok(bytemuck::pod_read_unaligned(&self.block(handle)?[..size]))
    }

    fn check_fits(&self, required: usize) -> PoolResult<()> {
        if required > self.slot_size {
            return Err(PoolError::BlockTooSmall {
                slot_size: self.slot_size,
                required,
            });
        }
        Ok(())
    }

    /// Confirms the handle belongs to this pool and still owns its slot.
    fn validate(&self, handle: &BlockHandle) -> PoolResult<usize> {
        if handle.pool != self.id || handle.index >= self.capacity() {
            return Err(PoolError::ForeignHandle {
                handle_pool: handle.pool,
                pool: self.id,
            });
        }
        if handle.epoch != self.epoch || !self.occupancy.is_occupied(handle.index) {
            return Err(PoolError::StaleHandle {
                slot: handle.index,
            });
        }
        Ok(handle.index)
    }

    #[cfg(test)]
    fn set_epoch(&mut self, epoch: u64) {
        self.epoch = epoch;
    }
}

impl fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPool")
            .field("id", &self.id)
            .field("slot_size", &self.slot_size)
            .field("capacity", &self.capacity())
            .field("allocated", &self.allocated_count())
            .finish_non_exhaustive()
    }
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        tracing::debug!(
            pool = %self.id,
            outstanding = self.occupancy.occupied(),
            "pool destroyed"
        );
    }
}
