//! Constructed instances.
//!
//! An [`Instance`] pairs a type-erased value with the descriptor that
//! produced it. Ownership transfers to the caller as soon as the
//! instantiator returns; the toolkit keeps no reference.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use speculo_core::BoxedValue;

use crate::descriptor::TypeDescriptor;

/// A constructed object of a discovered type.
pub struct Instance {
    descriptor: Arc<TypeDescriptor>,
    value: BoxedValue,
}

impl Instance {
    pub(crate) fn new(descriptor: Arc<TypeDescriptor>, value: BoxedValue) -> Self {
        Self { descriptor, value }
    }

    /// The descriptor of the instance's type.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Fully-qualified dotted name of the instance's type.
    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    /// Whether the instance holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.as_ref().is::<T>()
    }

    /// Borrow the value as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Mutably borrow the value as a `T`.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Take the value out as a `Box<T>`, handing the instance back
    /// unchanged on a type mismatch.
    pub fn downcast<T: Any>(self) -> Result<Box<T>, Instance> {
        let Instance { descriptor, value } = self;
        value
            .downcast::<T>()
            .map_err(|value| Instance { descriptor, value })
    }

    /// Take the value out as a `Box<B>` for a registered base type,
    /// handing the instance back unchanged when no binding to `B` exists.
    pub fn into_base<B: ?Sized + 'static>(self) -> Result<Box<B>, Instance> {
        let Instance { descriptor, value } = self;
        match descriptor.caster_for::<B>() {
            Some(cast) => cast(value).map_err(|value| Instance { descriptor, value }),
            None => Err(Instance { descriptor, value }),
        }
    }

    pub(crate) fn value_ref(&self) -> &(dyn Any + Send + Sync) {
        self.value.as_ref()
    }

    pub(crate) fn value_mut(&mut self) -> &mut (dyn Any + Send + Sync) {
        self.value.as_mut()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.descriptor.name())
            .finish()
    }
}
