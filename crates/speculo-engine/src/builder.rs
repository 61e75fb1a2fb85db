//! Registration builder for dynamic types.
//!
//! A [`TypeBuilder`] describes one concrete Rust type under a dotted
//! name: its constructors, methods, fields, and the base types its
//! instances can be handed out as. Registration happens once, at process
//! startup; the registry then resolves dotted names to the resulting
//! descriptors on every scan.
//!
//! Constructor and method argument shapes are ordinary tuples of up to
//! four `'static` values:
//!
//! ```ignore
//! registry.register(
//!     TypeBuilder::<Widget>::new("app.widgets.Widget")
//!         .constructor(|(): ()| Widget::default())
//!         .constructor(|(label,): (String,)| Widget::labeled(label))
//!         .method("refresh", |w: &mut Widget, (): ()| w.refresh())
//!         .implements::<dyn Render>(|w| w as Box<dyn Render>),
//! );
//! ```

use std::any::{type_name, Any, TypeId};
use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use speculo_core::{ArgError, BoxedValue, Modifiers};

use crate::descriptor::{
    BaseBinding, BoxedError, CasterFn, ConstructorDescriptor, FieldDescriptor, MethodDescriptor,
    TypeDescriptor,
};

/// A tuple of argument values with statically known runtime types.
///
/// Implemented for tuples of arity 0 through 4.
pub trait ArgTuple: 'static + Sized {
    /// Declared parameter type ids, in order.
    fn type_ids() -> Vec<TypeId>;

    /// Declared parameter type names, in order.
    fn type_names() -> Vec<&'static str>;

    /// Unpack type-erased values into the tuple.
    fn from_values(values: Vec<BoxedValue>) -> Result<Self, ArgError>;
}

fn take_one<V: Any + Send + Sync>(
    iter: &mut std::vec::IntoIter<BoxedValue>,
    index: usize,
) -> Result<V, ArgError> {
    let mismatch = || ArgError::Mismatch {
        index,
        expected: type_name::<V>(),
    };
    let value = iter.next().ok_or_else(mismatch)?;
    value.downcast::<V>().map(|b| *b).map_err(|_| mismatch())
}

impl ArgTuple for () {
    fn type_ids() -> Vec<TypeId> {
        Vec::new()
    }

    fn type_names() -> Vec<&'static str> {
        Vec::new()
    }

    fn from_values(_values: Vec<BoxedValue>) -> Result<Self, ArgError> {
        Ok(())
    }
}

macro_rules! impl_arg_tuple {
    ($($ty:ident : $idx:expr),+) => {
        impl<$($ty: Any + Send + Sync),+> ArgTuple for ($($ty,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$ty>()),+]
            }

            fn type_names() -> Vec<&'static str> {
                vec![$(type_name::<$ty>()),+]
            }

            fn from_values(values: Vec<BoxedValue>) -> Result<Self, ArgError> {
                let mut iter = values.into_iter();
                Ok(($(take_one::<$ty>(&mut iter, $idx)?,)+))
            }
        }
    };
}

impl_arg_tuple!(A: 0);
impl_arg_tuple!(A: 0, B: 1);
impl_arg_tuple!(A: 0, B: 1, C: 2);
impl_arg_tuple!(A: 0, B: 1, C: 2, D: 3);

/// Builder describing one concrete type for registration.
pub struct TypeBuilder<T: Any + Send + Sync> {
    name: String,
    constructors: Vec<ConstructorDescriptor>,
    methods: Vec<MethodDescriptor>,
    fields: Vec<FieldDescriptor>,
    bases: FxHashMap<TypeId, BaseBinding>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeBuilder<T> {
    /// Start describing `T` under the given dotted name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            bases: FxHashMap::default(),
            _marker: PhantomData,
        }
    }

    /// Declare a public constructor.
    pub fn constructor<A, F>(self, f: F) -> Self
    where
        A: ArgTuple,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.constructor_with(Modifiers::PUBLIC, f)
    }

    /// Declare a private constructor. Constructing through it requires an
    /// access grant.
    pub fn private_constructor<A, F>(self, f: F) -> Self
    where
        A: ArgTuple,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.constructor_with(Modifiers::PRIVATE, f)
    }

    /// Declare a constructor with an explicit modifier set.
    pub fn constructor_with<A, F>(mut self, modifiers: Modifiers, f: F) -> Self
    where
        A: ArgTuple,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        let factory = move |values: Vec<BoxedValue>| -> Result<BoxedValue, BoxedError> {
            let args = A::from_values(values)?;
            Ok(Box::new(f(args)) as BoxedValue)
        };
        self.push_constructor::<A>(modifiers, std::sync::Arc::new(factory));
        self
    }

    /// Declare a public constructor whose body can fail.
    pub fn fallible_constructor<A, F, E>(mut self, f: F) -> Self
    where
        A: ArgTuple,
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let factory = move |values: Vec<BoxedValue>| -> Result<BoxedValue, BoxedError> {
            let args = A::from_values(values)?;
            match f(args) {
                Ok(value) => Ok(Box::new(value) as BoxedValue),
                Err(e) => Err(Box::new(e) as BoxedError),
            }
        };
        self.push_constructor::<A>(Modifiers::PUBLIC, std::sync::Arc::new(factory));
        self
    }

    fn push_constructor<A: ArgTuple>(
        &mut self,
        modifiers: Modifiers,
        factory: crate::descriptor::Factory,
    ) {
        self.constructors.push(ConstructorDescriptor {
            declaring_type: self.name.clone(),
            params: A::type_ids(),
            param_names: A::type_names(),
            modifiers,
            factory,
        });
    }

    /// Declare a public method, invoked for effect only.
    pub fn method<A, F>(self, name: impl Into<String>, f: F) -> Self
    where
        A: ArgTuple,
        F: Fn(&mut T, A) + Send + Sync + 'static,
    {
        self.method_with(name, Modifiers::PUBLIC, f)
    }

    /// Declare a method with an explicit modifier set.
    pub fn method_with<A, F>(mut self, name: impl Into<String>, modifiers: Modifiers, f: F) -> Self
    where
        A: ArgTuple,
        F: Fn(&mut T, A) + Send + Sync + 'static,
    {
        let handler = move |receiver: &mut (dyn Any + Send + Sync),
                            values: Vec<BoxedValue>|
              -> Result<(), BoxedError> {
            let target = receiver
                .downcast_mut::<T>()
                .ok_or_else(|| ArgError::ReceiverMismatch {
                    expected: type_name::<T>(),
                })?;
            let args = A::from_values(values)?;
            f(target, args);
            Ok(())
        };
        self.push_method::<A>(name.into(), modifiers, std::sync::Arc::new(handler));
        self
    }

    /// Declare a public method whose body can fail.
    pub fn fallible_method<A, F, E>(mut self, name: impl Into<String>, f: F) -> Self
    where
        A: ArgTuple,
        F: Fn(&mut T, A) -> Result<(), E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let handler = move |receiver: &mut (dyn Any + Send + Sync),
                            values: Vec<BoxedValue>|
              -> Result<(), BoxedError> {
            let target = receiver
                .downcast_mut::<T>()
                .ok_or_else(|| ArgError::ReceiverMismatch {
                    expected: type_name::<T>(),
                })?;
            let args = A::from_values(values)?;
            f(target, args).map_err(|e| Box::new(e) as BoxedError)
        };
        self.push_method::<A>(name.into(), Modifiers::PUBLIC, std::sync::Arc::new(handler));
        self
    }

    fn push_method<A: ArgTuple>(
        &mut self,
        name: String,
        modifiers: Modifiers,
        handler: crate::descriptor::MethodHandler,
    ) {
        self.methods.push(MethodDescriptor {
            declaring_type: self.name.clone(),
            name,
            params: A::type_ids(),
            param_names: A::type_names(),
            modifiers,
            handler,
        });
    }

    /// Declare a public read-only field exposed through a getter.
    pub fn field<V, G>(self, name: impl Into<String>, get: G) -> Self
    where
        V: Any + Clone + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.field_entry(name.into(), Modifiers::PUBLIC, get, None::<fn(&mut T, V)>)
    }

    /// Declare a read-only field with an explicit modifier set.
    pub fn field_with<V, G>(self, name: impl Into<String>, modifiers: Modifiers, get: G) -> Self
    where
        V: Any + Clone + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.field_entry(name.into(), modifiers, get, None::<fn(&mut T, V)>)
    }

    /// Declare a public read-write field.
    pub fn field_rw<V, G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        V: Any + Clone + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.field_entry(name.into(), Modifiers::PUBLIC, get, Some(set))
    }

    /// Declare a read-write field with an explicit modifier set.
    pub fn field_rw_with<V, G, S>(
        self,
        name: impl Into<String>,
        modifiers: Modifiers,
        get: G,
        set: S,
    ) -> Self
    where
        V: Any + Clone + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.field_entry(name.into(), modifiers, get, Some(set))
    }

    fn field_entry<V, G, S>(
        mut self,
        name: String,
        modifiers: Modifiers,
        get: G,
        set: Option<S>,
    ) -> Self
    where
        V: Any + Clone + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let getter = move |receiver: &(dyn Any + Send + Sync)| -> Result<BoxedValue, BoxedError> {
            let target = receiver
                .downcast_ref::<T>()
                .ok_or_else(|| ArgError::ReceiverMismatch {
                    expected: type_name::<T>(),
                })?;
            Ok(Box::new(get(target)) as BoxedValue)
        };
        let setter = set.map(|set| {
            let setter = move |receiver: &mut (dyn Any + Send + Sync),
                               value: BoxedValue|
                  -> Result<(), BoxedError> {
                let target = receiver
                    .downcast_mut::<T>()
                    .ok_or_else(|| ArgError::ReceiverMismatch {
                        expected: type_name::<T>(),
                    })?;
                let value = value
                    .downcast::<V>()
                    .map_err(|_| ArgError::Mismatch {
                        index: 0,
                        expected: type_name::<V>(),
                    })?;
                set(target, *value);
                Ok(())
            };
            std::sync::Arc::new(setter) as crate::descriptor::FieldSetter
        });
        self.fields.push(FieldDescriptor {
            declaring_type: self.name.clone(),
            name,
            value_type: TypeId::of::<V>(),
            value_type_name: type_name::<V>(),
            modifiers,
            getter: std::sync::Arc::new(getter),
            setter,
        });
        self
    }

    /// Bind a base type: instances can then be handed out as `Box<B>`,
    /// and the type participates in scans filtered on `B`.
    ///
    /// The caster is the unsizing coercion, e.g.
    /// `|w| w as Box<dyn Render>`.
    pub fn implements<B: ?Sized + 'static>(mut self, cast: fn(Box<T>) -> Box<B>) -> Self {
        let caster: CasterFn<B> = std::sync::Arc::new(move |value: BoxedValue| {
            value.downcast::<T>().map(cast)
        });
        self.bases.insert(
            TypeId::of::<B>(),
            BaseBinding {
                base_name: type_name::<B>(),
                caster: Box::new(caster),
            },
        );
        self
    }

    /// Finalize into a descriptor. Called by the registry.
    pub(crate) fn build(mut self) -> TypeDescriptor {
        // Every type is assignable to itself.
        let identity: CasterFn<T> =
            std::sync::Arc::new(|value: BoxedValue| value.downcast::<T>());
        self.bases.entry(TypeId::of::<T>()).or_insert(BaseBinding {
            base_name: type_name::<T>(),
            caster: Box::new(identity),
        });

        let short_name = self
            .name
            .rsplit('.')
            .next()
            .unwrap_or(self.name.as_str())
            .to_string();
        TypeDescriptor {
            short_name,
            name: self.name,
            type_id: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            constructors: self.constructors,
            methods: self.methods,
            fields: self.fields,
            bases: self.bases,
        }
    }
}
