//! # Dispatch Registry
//!
//! Runtime polymorphism without inheritance: one interface, many variants,
//! resolved at the call site.
//!
//! ## Flow
//!
//! ```text
//! InterfaceDescriptor::define ──► DispatchTable::bind (per variant)
//!                                        │
//!                                        ▼
//!                             DispatchTable::construct ──► Instance
//!                                                            │
//!                                   Instance::invoke("area") ◄┘
//! ```
//!
//! A call costs one name lookup (or none, through a [`SlotId`]) plus one
//! indexed load from the variant's table, independent of how many variants
//! exist.

mod instance;
mod interface;
mod table;
mod value;

pub use instance::Instance;
pub use interface::{InterfaceDescriptor, InterfaceId, SlotId, SlotSignature};
pub use table::{DispatchTable, Operation};
pub use value::{Value, ValueKind};
