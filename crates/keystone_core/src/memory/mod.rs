//! # Memory Management
//!
//! Fixed-block pools carved from one pre-allocated arena.
//!
//! ## Design Philosophy
//!
//! All memory is reserved when the pool is created. Afterwards:
//! - No heap allocations on allocate or release
//! - Handles are slot indices scoped to one pool, never raw addresses
//! - Releasing a handle consumes it

mod occupancy;
mod pool;

pub use occupancy::OccupancyMap;
pub use pool::{BlockHandle, BlockPool, PoolId, PoolStats};
