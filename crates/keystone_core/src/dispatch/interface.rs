//! # Interface Descriptors
//!
//! An interface is a fixed, ordered set of named operation slots. Each slot
//! declares the kinds of its parameters and the kind of its result; the
//! receiver (`self`) is implicit. Descriptors are immutable once defined and
//! cheap to clone.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::dispatch::value::{Value, ValueKind};
use crate::error::{DispatchError, DispatchResult};

static NEXT_INTERFACE_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of an interface descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterfaceId(u64);

/// Declared shape of one operation slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SlotSignature {
    params: Vec<ValueKind>,
    returns: ValueKind,
}

impl SlotSignature {
    /// Creates a signature with the given parameter kinds and result kind.
    #[must_use]
    pub fn new(params: impl Into<Vec<ValueKind>>, returns: ValueKind) -> Self {
        Self {
            params: params.into(),
            returns,
        }
    }

    /// Creates a signature that takes no arguments besides the receiver.
    #[must_use]
    pub fn nullary(returns: ValueKind) -> Self {
        Self::new(Vec::new(), returns)
    }

    /// Parameter kinds, in order.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    /// Result kind.
    #[inline]
    #[must_use]
    pub const fn returns(&self) -> ValueKind {
        self.returns
    }

    /// Whether `args` match the parameter kinds exactly.
    #[must_use]
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self.params.iter().zip(args).all(|(kind, arg)| arg.kind() == *kind)
    }
}

impl fmt::Display for SlotSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, kind) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}")?;
        }
        write!(f, ") -> {}", self.returns)
    }
}

/// A slot resolved against one particular interface.
///
/// Resolving a name once and dispatching through the id skips the name
/// lookup on every call, like indexing a jump table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId {
    interface: InterfaceId,
    index: usize,
}

impl SlotId {
    /// Position of the slot within its interface.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// The interface this slot was resolved against.
    #[inline]
    #[must_use]
    pub const fn interface(self) -> InterfaceId {
        self.interface
    }
}

#[derive(Debug)]
struct Slot {
    name: String,
    signature: SlotSignature,
}

#[derive(Debug)]
struct Inner {
    id: InterfaceId,
    name: String,
    slots: Vec<Slot>,
    by_name: HashMap<String, usize>,
}

/// The named, ordered set of operations a family of variants implements.
///
/// # Example
///
/// ```rust,ignore
/// let shape = InterfaceDescriptor::define("shape", [
///     ("area", SlotSignature::nullary(ValueKind::Float)),
///     ("render", SlotSignature::nullary(ValueKind::Text)),
/// ])?;
/// ```
#[derive(Clone, Debug)]
pub struct InterfaceDescriptor {
    inner: Arc<Inner>,
}

impl InterfaceDescriptor {
    /// Declares an interface from its ordered operation slots.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::EmptyInterface`] if `slots` is empty and
    /// [`DispatchError::DuplicateSlot`] if a slot name repeats.
    pub fn define<N: Into<String>>(
        name: impl Into<String>,
        slots: impl IntoIterator<Item = (N, SlotSignature)>,
    ) -> DispatchResult<Self> {
        let name = name.into();
        let mut defined = Vec::new();
        let mut by_name = HashMap::new();

        for (slot_name, signature) in slots {
            let slot_name = slot_name.into();
            if by_name.contains_key(&slot_name) {
                return Err(DispatchError::DuplicateSlot {
                    interface: name,
                    slot: slot_name,
                });
            }
            by_name.insert(slot_name.clone(), defined.len());
            defined.push(Slot {
                name: slot_name,
                signature,
            });
        }

        if defined.is_empty() {
            return Err(DispatchError::EmptyInterface { interface: name });
        }

        let id = InterfaceId(NEXT_INTERFACE_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(interface = %name, slots = defined.len(), "interface defined");

        Ok(Self {
            inner: Arc::new(Inner {
                id,
                name,
                slots: defined,
                by_name,
            }),
        })
    }

    /// Identity of this interface.
    #[inline]
    #[must_use]
    pub fn id(&self) -> InterfaceId {
        self.inner.id
    }

    /// Name of this interface.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of slots. Always at least one.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    /// Always `false`; an interface cannot be defined without slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    /// Slot names in declaration order.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.inner.slots.iter().map(|slot| slot.name.as_str())
    }

    /// Resolves a slot name to its id.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<SlotId> {
        self.inner.by_name.get(name).map(|&index| SlotId {
            interface: self.inner.id,
            index,
        })
    }

    /// Signature of a slot, if the id belongs to this interface.
    #[must_use]
    pub fn signature(&self, slot: SlotId) -> Option<&SlotSignature> {
        self.owned_index(slot)
            .map(|index| &self.inner.slots[index].signature)
    }

    /// Name of a slot, if the id belongs to this interface.
    #[must_use]
    pub fn slot_name(&self, slot: SlotId) -> Option<&str> {
        self.owned_index(slot)
            .map(|index| self.inner.slots[index].name.as_str())
    }

    /// Resolves a slot name, reporting unknown names as errors.
    pub(crate) fn resolve(&self, name: &str) -> DispatchResult<SlotId> {
        self.slot(name).ok_or_else(|| DispatchError::UnknownSlot {
            interface: self.inner.name.clone(),
            slot: name.to_owned(),
        })
    }

    /// Checks that `slot` was resolved against this interface.
    pub(crate) fn check(&self, slot: SlotId) -> DispatchResult<usize> {
        self.owned_index(slot)
            .ok_or_else(|| DispatchError::UnknownSlot {
                interface: self.inner.name.clone(),
                slot: format!("#{}", slot.index),
            })
    }

    /// Name and signature of the slot at `index`.
    pub(crate) fn slot_at(&self, index: usize) -> (&str, &SlotSignature) {
        let slot = &self.inner.slots[index];
        (&slot.name, &slot.signature)
    }

    fn owned_index(&self, slot: SlotId) -> Option<usize> {
        (slot.interface == self.inner.id && slot.index < self.inner.slots.len())
            .then_some(slot.index)
    }
}

impl PartialEq for InterfaceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for InterfaceDescriptor {}
