//! # Instances
//!
//! An [`Instance`] pairs a variant's dispatch table with that variant's
//! fields behind one uniform type, so a collection can hold circles and
//! rectangles side by side and call `area` on each without knowing which
//! is which.
//!
//! The table reference is fixed at construction. Fields may be read or
//! mutated through safe downcasts; the table never can be.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::interface::{InterfaceDescriptor, SlotId};
use crate::dispatch::table::{DispatchTable, TableInner};
use crate::dispatch::value::Value;
use crate::error::{DispatchError, DispatchResult};

/// Type-erased view of a table plus its fields.
trait Bound {
    fn table(&self) -> *const ();
    fn variant(&self) -> &str;
    fn interface(&self) -> &InterfaceDescriptor;
    fn call(&self, index: usize, args: &[Value]) -> Value;
    fn fields(&self) -> &dyn Any;
    fn fields_mut(&mut self) -> &mut dyn Any;
}

struct Object<F> {
    table: Arc<TableInner<F>>,
    fields: F,
}

impl<F: 'static> Bound for Object<F> {
    fn table(&self) -> *const () {
        Arc::as_ptr(&self.table).cast()
    }

    fn variant(&self) -> &str {
        &self.table.variant
    }

    fn interface(&self) -> &InterfaceDescriptor {
        &self.table.interface
    }

    fn call(&self, index: usize, args: &[Value]) -> Value {
        self.table.operations[index].call(&self.fields, args)
    }

    fn fields(&self) -> &dyn Any {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut dyn Any {
        &mut self.fields
    }
}

/// A constructed value: a dispatch table reference plus variant fields.
pub struct Instance {
    object: Box<dyn Bound>,
}

impl Instance {
    pub(crate) fn new<F: 'static>(table: Arc<TableInner<F>>, fields: F) -> Self {
        Self {
            object: Box::new(Object { table, fields }),
        }
    }

    /// Calls the operation bound to `slot` for this instance's variant.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownSlot`] if `slot` is not part of the interface.
    /// - [`DispatchError::ArgumentMismatch`] if `args` do not fit the slot.
    /// - [`DispatchError::ReturnMismatch`] if the implementation returns the
    ///   wrong kind of value.
    pub fn invoke(&self, slot: &str, args: &[Value]) -> DispatchResult<Value> {
        let id = self.object.interface().resolve(slot)?;
        self.dispatch(id.index(), args)
    }

    /// Calls the operation at a pre-resolved slot.
    ///
    /// # Errors
    ///
    /// Same as [`Instance::invoke`]; a `SlotId` resolved against another
    /// interface is reported as [`DispatchError::UnknownSlot`].
    pub fn invoke_slot(&self, slot: SlotId, args: &[Value]) -> DispatchResult<Value> {
        let index = self.object.interface().check(slot)?;
        self.dispatch(index, args)
    }

    fn dispatch(&self, index: usize, args: &[Value]) -> DispatchResult<Value> {
        let (name, signature) = self.object.interface().slot_at(index);

        if !signature.accepts(args) {
            return Err(DispatchError::ArgumentMismatch {
                slot: name.to_owned(),
                expected: signature.params().to_vec(),
                found: args.iter().map(Value::kind).collect(),
            });
        }

        let result = self.object.call(index, args);
        if result.kind() != signature.returns() {
            return Err(DispatchError::ReturnMismatch {
                variant: self.object.variant().to_owned(),
                slot: name.to_owned(),
                expected: signature.returns(),
                found: result.kind(),
            });
        }
        Ok(result)
    }

    /// Name of the variant this instance was constructed as.
    #[must_use]
    pub fn variant(&self) -> &str {
        self.object.variant()
    }

    /// The interface this instance implements.
    #[must_use]
    pub fn interface(&self) -> &InterfaceDescriptor {
        self.object.interface()
    }

    /// Whether this instance was constructed from `table` (or a clone of it).
    #[must_use]
    pub fn is_instance_of<F>(&self, table: &DispatchTable<F>) -> bool {
        std::ptr::eq(self.object.table(), table.identity())
    }

    /// The variant fields, if they are of type `F`.
    #[must_use]
    pub fn fields<F: 'static>(&self) -> Option<&F> {
        self.object.fields().downcast_ref()
    }

    /// Mutable variant fields, if they are of type `F`.
    pub fn fields_mut<F: 'static>(&mut self) -> Option<&mut F> {
        self.object.fields_mut().downcast_mut()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("interface", &self.object.interface().name())
            .field("variant", &self.object.variant())
            .finish_non_exhaustive()
    }
}
