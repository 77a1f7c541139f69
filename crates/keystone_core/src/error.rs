//! # Error Types
//!
//! All errors reported by the dispatch registry and the block pool.
//!
//! Configuration errors and resource exhaustion are ordinary values the
//! caller is expected to handle. Caller-contract violations (unknown slots,
//! foreign or stale handles) are reported as distinct variants so they can
//! be asserted on, never swallowed.

use thiserror::Error;

use crate::dispatch::{SlotSignature, ValueKind};
use crate::memory::PoolId;

/// Errors that can occur while defining, binding, or invoking interfaces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// An interface was defined without any operation slots.
    #[error("interface `{interface}` declares no operation slots")]
    EmptyInterface {
        /// Name of the interface.
        interface: String,
    },

    /// The same slot name appears twice in one interface.
    #[error("interface `{interface}` declares slot `{slot}` more than once")]
    DuplicateSlot {
        /// Name of the interface.
        interface: String,
        /// The repeated slot name.
        slot: String,
    },

    /// A variant left one or more interface slots without an implementation.
    #[error("variant `{variant}` does not implement slots {missing:?}")]
    IncompleteBinding {
        /// Name of the variant being bound.
        variant: String,
        /// Unbound slot names, in interface order.
        missing: Vec<String>,
    },

    /// An implementation's shape does not match its slot's declared shape.
    #[error("variant `{variant}` implements `{slot}` as {found}, interface declares {expected}")]
    SignatureMismatch {
        /// Name of the variant being bound.
        variant: String,
        /// The slot whose implementation is wrong.
        slot: String,
        /// Signature declared by the interface.
        expected: SlotSignature,
        /// Signature declared by the implementation.
        found: SlotSignature,
    },

    /// A variant supplied two implementations for the same slot.
    #[error("variant `{variant}` implements slot `{slot}` more than once")]
    DuplicateImplementation {
        /// Name of the variant being bound.
        variant: String,
        /// The slot implemented twice.
        slot: String,
    },

    /// A slot name (or slot id) that is not part of the interface.
    #[error("interface `{interface}` has no slot `{slot}`")]
    UnknownSlot {
        /// Name of the interface.
        interface: String,
        /// The slot that was requested.
        slot: String,
    },

    /// Invocation arguments do not match the slot's parameter kinds.
    #[error("slot `{slot}` takes {expected:?}, called with {found:?}")]
    ArgumentMismatch {
        /// The slot being invoked.
        slot: String,
        /// Declared parameter kinds.
        expected: Vec<ValueKind>,
        /// Kinds of the supplied arguments.
        found: Vec<ValueKind>,
    },

    /// An implementation returned a value of the wrong kind.
    #[error("variant `{variant}` returned {found:?} from `{slot}`, expected {expected:?}")]
    ReturnMismatch {
        /// The variant whose implementation misbehaved.
        variant: String,
        /// The slot being invoked.
        slot: String,
        /// Declared return kind.
        expected: ValueKind,
        /// Kind of the value actually returned.
        found: ValueKind,
    },
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that can occur while creating or using a block pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A pool was requested with zero-byte slots.
    #[error("slot size must be greater than zero")]
    ZeroSlotSize,

    /// A pool was requested with no slots.
    #[error("slot count must be greater than zero")]
    ZeroSlotCount,

    /// A pool configuration could not be read or parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The arena or the occupancy map could not be reserved.
    #[error("out of memory reserving {slot_count} slots of {slot_size} bytes")]
    OutOfMemory {
        /// Requested slot size in bytes.
        slot_size: usize,
        /// Requested number of slots.
        slot_count: usize,
    },

    /// Every slot is allocated.
    #[error("pool exhausted: all {capacity} slots are in use")]
    Exhausted {
        /// Number of slots in the pool.
        capacity: usize,
    },

    /// The handle was issued by a different pool.
    #[error("handle belongs to pool {handle_pool}, not pool {pool}")]
    ForeignHandle {
        /// Pool that issued the handle.
        handle_pool: PoolId,
        /// Pool the handle was presented to.
        pool: PoolId,
    },

    /// The handle's slot has already been returned to the pool.
    #[error("slot {slot} was already released")]
    DoubleRelease {
        /// Slot index carried by the handle.
        slot: usize,
    },

    /// The handle no longer owns its slot, so its block cannot be accessed.
    #[error("handle for slot {slot} is stale")]
    StaleHandle {
        /// Slot index carried by the handle.
        slot: usize,
    },

    /// A value is larger than one slot.
    #[error("value of {required} bytes does not fit a {slot_size}-byte slot")]
    BlockTooSmall {
        /// Slot size in bytes.
        slot_size: usize,
        /// Size of the value in bytes.
        required: usize,
    },
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
