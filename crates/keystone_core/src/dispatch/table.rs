//! # Dispatch Tables
//!
//! A [`DispatchTable`] binds one concrete function to every slot of an
//! interface for one variant. Binding is all-or-nothing: an unbound slot,
//! an extra slot, or a shape mismatch is rejected before any instance can
//! be constructed, so a table that exists is always complete.

use std::fmt;
use std::sync::Arc;

use crate::dispatch::instance::Instance;
use crate::dispatch::interface::{InterfaceDescriptor, SlotSignature};
use crate::dispatch::value::Value;
use crate::error::{DispatchError, DispatchResult};

type Body<F> = dyn Fn(&F, &[Value]) -> Value;

/// One concrete implementation of a slot for variant fields `F`.
///
/// The operation declares its own signature; binding compares it against
/// the slot it is bound to.
pub struct Operation<F> {
    signature: SlotSignature,
    body: Box<Body<F>>,
}

impl<F: 'static> Operation<F> {
    /// Wraps a function over the variant's fields and the call arguments.
    ///
    /// Arguments are checked against `signature` before `body` runs, so the
    /// body may assume their kinds.
    pub fn new(signature: SlotSignature, body: impl Fn(&F, &[Value]) -> Value + 'static) -> Self {
        Self {
            signature,
            body: Box::new(body),
        }
    }

    /// Declared signature of this implementation.
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &SlotSignature {
        &self.signature
    }

    #[inline]
    pub(crate) fn call(&self, fields: &F, args: &[Value]) -> Value {
        (self.body)(fields, args)
    }
}

impl<F> fmt::Debug for Operation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

pub(crate) struct TableInner<F> {
    pub(crate) variant: String,
    pub(crate) interface: InterfaceDescriptor,
    /// One operation per slot, in interface order.
    pub(crate) operations: Box<[Operation<F>]>,
}

/// Per-variant mapping from every interface slot to its implementation.
///
/// Tables are shared by reference: cloning a table is cheap, and every
/// instance constructed from it points at the same bindings.
pub struct DispatchTable<F> {
    inner: Arc<TableInner<F>>,
}

impl<F: 'static> DispatchTable<F> {
    /// Binds one implementation per slot of `interface` for `variant`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownSlot`] if an implementation names a slot
    ///   the interface does not declare.
    /// - [`DispatchError::DuplicateImplementation`] if a slot is bound twice.
    /// - [`DispatchError::SignatureMismatch`] if an implementation's
    ///   signature differs from its slot's.
    /// - [`DispatchError::IncompleteBinding`] if any slot is left unbound.
    pub fn bind<N: AsRef<str>>(
        interface: &InterfaceDescriptor,
        variant: impl Into<String>,
        implementations: impl IntoIterator<Item = (N, Operation<F>)>,
    ) -> DispatchResult<Self> {
        let variant = variant.into();
        let mut bound: Vec<Option<Operation<F>>> =
            std::iter::repeat_with(|| None).take(interface.len()).collect();

        for (name, operation) in implementations {
            let name = name.as_ref();
            let index = interface.resolve(name)?.index();
            let (_, expected) = interface.slot_at(index);

            if bound[index].is_some() {
                return Err(DispatchError::DuplicateImplementation {
                    variant,
                    slot: name.to_owned(),
                });
            }
            if operation.signature() != expected {
                return Err(DispatchError::SignatureMismatch {
                    variant,
                    slot: name.to_owned(),
                    expected: expected.clone(),
                    found: operation.signature().clone(),
                });
            }
            bound[index] = Some(operation);
        }

        let missing: Vec<String> = interface
            .slot_names()
            .zip(&bound)
            .filter(|(_, operation)| operation.is_none())
            .map(|(name, _)| name.to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(DispatchError::IncompleteBinding { variant, missing });
        }

        tracing::debug!(
            interface = interface.name(),
            variant = %variant,
            "variant bound"
        );

        Ok(Self {
            inner: Arc::new(TableInner {
                variant,
                interface: interface.clone(),
                operations: bound.into_iter().flatten().collect(),
            }),
        })
    }

    /// Produces an instance carrying this table and the given fields.
    #[must_use]
    pub fn construct(&self, fields: F) -> Instance {
        Instance::new(Arc::clone(&self.inner), fields)
    }
}

impl<F> DispatchTable<F> {
    /// Name of the variant this table was bound for.
    #[inline]
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.inner.variant
    }

    /// The interface this table implements.
    #[inline]
    #[must_use]
    pub fn interface(&self) -> &InterfaceDescriptor {
        &self.inner.interface
    }

    /// Address identifying this table's bindings.
    pub(crate) fn identity(&self) -> *const () {
        Arc::as_ptr(&self.inner).cast()
    }
}

impl<F> Clone for DispatchTable<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F> fmt::Debug for DispatchTable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("variant", &self.inner.variant)
            .field("interface", &self.inner.interface.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::value::ValueKind;

    struct Square {
        side: f64,
    }

    fn shape() -> InterfaceDescriptor {
        InterfaceDescriptor::define(
            "shape",
            [
                ("area", SlotSignature::nullary(ValueKind::Float)),
                ("render", SlotSignature::nullary(ValueKind::Text)),
            ],
        )
        .unwrap()
    }

    fn area() -> Operation<Square> {
        Operation::new(SlotSignature::nullary(ValueKind::Float), |s: &Square, _| {
            Value::Float(s.side * s.side)
        })
    }

    fn render() -> Operation<Square> {
        Operation::new(SlotSignature::nullary(ValueKind::Text), |s: &Square, _| {
            Value::Text(format!("square {}", s.side))
        })
    }

    #[test]
    fn test_bind_complete() {
        let iface = shape();
        let table = DispatchTable::bind(&iface, "square", [("render", render()), ("area", area())])
            .unwrap();
        assert_eq!(table.variant(), "square");
        assert_eq!(table.interface(), &iface);
        // Stored in interface order regardless of supply order.
        assert_eq!(
            table.inner.operations[0].signature().returns(),
            ValueKind::Float
        );
    }

    #[test]
    fn test_bind_incomplete() {
        let err = DispatchTable::bind(&shape(), "square", [("area", area())]).unwrap_err();
        assert_eq!(
            err,
            DispatchError::IncompleteBinding {
                variant: "square".to_owned(),
                missing: vec!["render".to_owned()],
            }
        );
    }

    #[test]
    fn test_bind_signature_mismatch() {
        let wrong = Operation::new(SlotSignature::nullary(ValueKind::Int), |s: &Square, _| {
            Value::Int(s.side as i64)
        });
        let err = DispatchTable::bind(&shape(), "square", [("area", wrong), ("render", render())])
            .unwrap_err();
        assert!(matches!(err, DispatchError::SignatureMismatch { ref slot, .. } if slot == "area"));
    }

    #[test]
    fn test_bind_extra_and_duplicate() {
        let err = DispatchTable::bind(
            &shape(),
            "square",
            [("area", area()), ("render", render()), ("volume", area())],
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownSlot { ref slot, .. } if slot == "volume"));

        let err = DispatchTable::bind(
            &shape(),
            "square",
            [("area", area()), ("area", area()), ("render", render())],
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateImplementation { ref slot, .. } if slot == "area"));
    }

    #[test]
    fn test_clone_shares_bindings() {
        let table = DispatchTable::bind(&shape(), "square", [("area", area()), ("render", render())])
            .unwrap();
        let copy = table.clone();
        assert_eq!(table.identity(), copy.identity());
    }
}
