//! Type and member descriptors.
//!
//! A [`TypeDescriptor`] is the handle produced by resolving a dotted name
//! against a loader: the concrete Rust `TypeId`, the declared
//! constructors, methods, and fields, and the base-type bindings that
//! define assignability. Descriptors are immutable once registered and
//! shared as `Arc`s; the toolkit never caches them across calls on the
//! caller's behalf.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use speculo_core::{BoxedValue, Member, Modifiers};

/// A boxed error produced by a registered constructor, method, or field
/// accessor body.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Caster from a type-erased instance to a boxed base type.
///
/// On failure the original value is handed back untouched.
pub type CasterFn<B> = Arc<dyn Fn(BoxedValue) -> Result<Box<B>, BoxedValue> + Send + Sync>;

pub(crate) type Factory =
    Arc<dyn Fn(Vec<BoxedValue>) -> Result<BoxedValue, BoxedError> + Send + Sync>;
pub(crate) type MethodHandler =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), Vec<BoxedValue>) -> Result<(), BoxedError> + Send + Sync>;
pub(crate) type FieldGetter =
    Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Result<BoxedValue, BoxedError> + Send + Sync>;
pub(crate) type FieldSetter =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), BoxedValue) -> Result<(), BoxedError> + Send + Sync>;

/// A declared constructor of a registered type.
pub struct ConstructorDescriptor {
    pub(crate) declaring_type: String,
    pub(crate) params: Vec<TypeId>,
    pub(crate) param_names: Vec<&'static str>,
    pub(crate) modifiers: Modifiers,
    pub(crate) factory: Factory,
}

impl ConstructorDescriptor {
    /// Declared parameter type ids, in order.
    pub fn params(&self) -> &[TypeId] {
        &self.params
    }

    /// Declared parameter type names, in order.
    pub fn param_names(&self) -> &[&'static str] {
        &self.param_names
    }

    pub(crate) fn instantiate(&self, values: Vec<BoxedValue>) -> Result<BoxedValue, BoxedError> {
        (self.factory)(values)
    }
}

impl Member for ConstructorDescriptor {
    fn name(&self) -> &str {
        "new"
    }

    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("declaring_type", &self.declaring_type)
            .field("params", &self.param_names)
            .field("modifiers", &self.modifiers.render())
            .finish()
    }
}

/// A declared method of a registered type.
pub struct MethodDescriptor {
    pub(crate) declaring_type: String,
    pub(crate) name: String,
    pub(crate) params: Vec<TypeId>,
    pub(crate) param_names: Vec<&'static str>,
    pub(crate) modifiers: Modifiers,
    pub(crate) handler: MethodHandler,
}

impl MethodDescriptor {
    /// Declared parameter type ids, in order.
    pub fn params(&self) -> &[TypeId] {
        &self.params
    }

    /// Declared parameter type names, in order.
    pub fn param_names(&self) -> &[&'static str] {
        &self.param_names
    }

    pub(crate) fn call(
        &self,
        receiver: &mut (dyn Any + Send + Sync),
        values: Vec<BoxedValue>,
    ) -> Result<(), BoxedError> {
        (self.handler)(receiver, values)
    }
}

impl Member for MethodDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("declaring_type", &self.declaring_type)
            .field("name", &self.name)
            .field("params", &self.param_names)
            .field("modifiers", &self.modifiers.render())
            .finish()
    }
}

/// A declared field of a registered type.
pub struct FieldDescriptor {
    pub(crate) declaring_type: String,
    pub(crate) name: String,
    pub(crate) value_type: TypeId,
    pub(crate) value_type_name: &'static str,
    pub(crate) modifiers: Modifiers,
    pub(crate) getter: FieldGetter,
    pub(crate) setter: Option<FieldSetter>,
}

impl FieldDescriptor {
    /// The field's value type id.
    pub fn value_type(&self) -> TypeId {
        self.value_type
    }

    /// The field's value type name.
    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    /// Whether the field can be written.
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub(crate) fn get(&self, receiver: &(dyn Any + Send + Sync)) -> Result<BoxedValue, BoxedError> {
        (self.getter)(receiver)
    }
}

impl Member for FieldDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("declaring_type", &self.declaring_type)
            .field("name", &self.name)
            .field("value_type", &self.value_type_name)
            .field("modifiers", &self.modifiers.render())
            .finish()
    }
}

/// A binding from a registered type to one of its base types.
pub(crate) struct BaseBinding {
    pub(crate) base_name: &'static str,
    /// A `CasterFn<B>` boxed behind `Any`, keyed by `TypeId::of::<B>()`.
    pub(crate) caster: Box<dyn Any + Send + Sync>,
}

/// A runtime-resolved representation of a registered type.
pub struct TypeDescriptor {
    pub(crate) name: String,
    pub(crate) short_name: String,
    pub(crate) type_id: TypeId,
    pub(crate) rust_name: &'static str,
    pub(crate) constructors: Vec<ConstructorDescriptor>,
    pub(crate) methods: Vec<MethodDescriptor>,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) bases: FxHashMap<TypeId, BaseBinding>,
}

impl TypeDescriptor {
    /// Fully-qualified dotted name the type was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last segment of the dotted name.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// `TypeId` of the concrete Rust type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the concrete Rust type, for diagnostics.
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// All declared constructors.
    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    /// All declared methods.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// All declared fields.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Constructors matching a predicate.
    pub fn constructors_where(
        &self,
        pred: impl Fn(&ConstructorDescriptor) -> bool,
    ) -> Vec<&ConstructorDescriptor> {
        self.constructors.iter().filter(|c| pred(c)).collect()
    }

    /// Methods matching a predicate.
    pub fn methods_where(
        &self,
        pred: impl Fn(&MethodDescriptor) -> bool,
    ) -> Vec<&MethodDescriptor> {
        self.methods.iter().filter(|m| pred(m)).collect()
    }

    /// Fields matching a predicate.
    pub fn fields_where(&self, pred: impl Fn(&FieldDescriptor) -> bool) -> Vec<&FieldDescriptor> {
        self.fields.iter().filter(|f| pred(f)).collect()
    }

    /// Whether instances of this type can be handed out as `Box<B>`.
    ///
    /// True for every base registered via the builder's `implements`, and
    /// for the concrete type itself.
    pub fn is_assignable_to<B: ?Sized + 'static>(&self) -> bool {
        self.is_assignable_to_id(TypeId::of::<B>())
    }

    /// Non-generic form of [`is_assignable_to`](Self::is_assignable_to).
    pub fn is_assignable_to_id(&self, base: TypeId) -> bool {
        self.bases.contains_key(&base)
    }

    /// The caster for base type `B`, if one was registered.
    pub fn caster_for<B: ?Sized + 'static>(&self) -> Option<CasterFn<B>> {
        self.bases
            .get(&TypeId::of::<B>())
            .and_then(|binding| binding.caster.downcast_ref::<CasterFn<B>>())
            .cloned()
    }

    /// Names of the registered base types, for diagnostics.
    pub fn base_names(&self) -> Vec<&'static str> {
        self.bases.values().map(|b| b.base_name).collect()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("rust_name", &self.rust_name)
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .field("fields", &self.fields.len())
            .finish()
    }
}
