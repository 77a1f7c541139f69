//! # KEYSTONE Core
//!
//! Two runtime primitives with no shared state:
//! - **Dispatch registry**: heterogeneous variants behind one call surface,
//!   resolved through a per-variant table in O(1)
//! - **Block pool**: equally-sized blocks handed out from one pre-allocated
//!   arena, reclaimed through pool-scoped handles
//!
//! ## Rules
//!
//! 1. **Incomplete tables never exist** - binding checks every slot up front
//! 2. **Handles are indices, not addresses** - release is validated by pool
//!    identity and slot index
//! 3. **Errors are values** - exhaustion and contract violations come back
//!    as `Err`, never as a panic
//!
//! ## Example
//!
//! ```rust,ignore
//! use keystone_core::{BlockPool, DispatchTable, InterfaceDescriptor};
//!
//! let shape = InterfaceDescriptor::define("shape", slots)?;
//! let circle = DispatchTable::bind(&shape, "circle", circle_ops)?;
//! let area = circle.construct(Circle { radius: 5.0 }).invoke("area", &[])?;
//!
//! let mut pool = BlockPool::create(32, 4)?;
//! let block = pool.allocate()?;
//! pool.release(block)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod memory;

pub use config::PoolConfig;
pub use dispatch::{
    DispatchTable, Instance, InterfaceDescriptor, InterfaceId, Operation, SlotId, SlotSignature,
    Value, ValueKind,
};
pub use error::{DispatchError, DispatchResult, PoolError, PoolResult};
pub use memory::{BlockHandle, BlockPool, OccupancyMap, PoolId, PoolStats};
