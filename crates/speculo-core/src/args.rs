//! Argument vectors for dynamic construction and invocation.
//!
//! An [`ArgVec`] is an ordered sequence of type-erased values. Overload
//! resolution is driven by each element's *runtime* type, never by any
//! declared type: a constructor or method matches only when its declared
//! parameter type ids equal the vector's type ids position for position.
//!
//! Elements must be `Clone` so that one vector can drive the construction
//! of every candidate type produced by a package scan; each construction
//! attempt receives a fresh clone of the values.

use std::any::{type_name, Any, TypeId};
use std::fmt;

/// A type-erased owned value.
pub type BoxedValue = Box<dyn Any + Send + Sync>;

type CloneFn = fn(&(dyn Any + Send + Sync)) -> BoxedValue;

struct Argument {
    type_id: TypeId,
    type_name: &'static str,
    value: BoxedValue,
    clone_value: CloneFn,
}

fn clone_as<V: Any + Clone + Send + Sync>(value: &(dyn Any + Send + Sync)) -> BoxedValue {
    match value.downcast_ref::<V>() {
        Some(v) => Box::new(v.clone()),
        // Unreachable: the clone fn is only ever paired with a value of V.
        None => unreachable!("argument value lost its type"),
    }
}

/// An ordered sequence of values whose runtime types drive overload
/// resolution.
#[derive(Default)]
pub struct ArgVec {
    args: Vec<Argument>,
}

impl ArgVec {
    /// Create an empty argument vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, consuming and returning the vector for chaining.
    pub fn with<V: Any + Clone + Send + Sync>(mut self, value: V) -> Self {
        self.push(value);
        self
    }

    /// Append a value.
    pub fn push<V: Any + Clone + Send + Sync>(&mut self, value: V) {
        self.args.push(Argument {
            type_id: TypeId::of::<V>(),
            type_name: type_name::<V>(),
            value: Box::new(value),
            clone_value: clone_as::<V>,
        });
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether the vector holds no arguments.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Runtime type ids of the arguments, in order.
    pub fn type_ids(&self) -> Vec<TypeId> {
        self.args.iter().map(|a| a.type_id).collect()
    }

    /// Runtime type names of the arguments, in order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.args.iter().map(|a| a.type_name).collect()
    }

    /// A fresh clone of every argument value, in order.
    pub fn clone_values(&self) -> Vec<BoxedValue> {
        self.args
            .iter()
            .map(|a| (a.clone_value)(a.value.as_ref()))
            .collect()
    }
}

impl fmt::Debug for ArgVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgVec")
            .field("types", &self.type_names())
            .finish()
    }
}

/// Errors produced while unpacking argument values into their declared
/// parameter types.
///
/// These cannot occur once type ids have been matched positionally, but
/// they are typed rather than panicking so that no registration mistake
/// can take down the caller.
#[derive(Debug, thiserror::Error)]
pub enum ArgError {
    /// An argument value did not have the declared parameter type.
    #[error("argument {index} is not a {expected}")]
    Mismatch {
        /// Position of the offending argument.
        index: usize,
        /// Declared parameter type name.
        expected: &'static str,
    },

    /// The receiver value did not have the declaring type.
    #[error("receiver is not a {expected}")]
    ReceiverMismatch {
        /// Declaring type name.
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids_in_order() {
        let args = ArgVec::new().with(1i32).with("name".to_string()).with(2.5f64);
        assert_eq!(args.len(), 3);
        assert_eq!(
            args.type_ids(),
            vec![
                TypeId::of::<i32>(),
                TypeId::of::<String>(),
                TypeId::of::<f64>()
            ]
        );
    }

    #[test]
    fn test_empty() {
        let args = ArgVec::new();
        assert!(args.is_empty());
        assert!(args.type_ids().is_empty());
        assert!(args.clone_values().is_empty());
    }

    #[test]
    fn test_clone_values_are_independent() {
        let args = ArgVec::new().with(vec![1, 2, 3]);

        let mut first = args.clone_values();
        let second = args.clone_values();

        let v = first.remove(0).downcast::<Vec<i32>>().unwrap();
        assert_eq!(*v, vec![1, 2, 3]);
        let w = second.into_iter().next().unwrap().downcast::<Vec<i32>>().unwrap();
        assert_eq!(*w, vec![1, 2, 3]);
    }

    #[test]
    fn test_type_names_for_diagnostics() {
        let args = ArgVec::new().with(7u8);
        assert_eq!(args.type_names(), vec!["u8"]);
    }
}
