//! Dynamic instantiation.
//!
//! Constructor selection is driven by the *runtime* types of the
//! argument vector: a constructor matches only when its declared
//! parameter type ids equal the argument type ids position for position.
//! There is no widening, no supertype resolution, and no coercion of any
//! kind. Every failure is a typed error returned to the caller.

use std::sync::Arc;

use speculo_core::{accessible, AccessGrant, ArgVec, Member};

use crate::descriptor::{BoxedError, TypeDescriptor};
use crate::instance::Instance;

/// Errors produced while constructing an instance.
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    /// No declared constructor matched the argument runtime types.
    #[error("no constructor on {type_name} matches argument types ({arg_types})")]
    NoMatchingConstructor {
        /// Dotted name of the target type.
        type_name: String,
        /// Rendered runtime type names of the arguments.
        arg_types: String,
    },

    /// The matching constructor is not public and no grant covers it.
    #[error("constructor of {type_name} is {modifiers} and not accessible")]
    Denied {
        /// Dotted name of the target type.
        type_name: String,
        /// Rendered modifier string of the constructor.
        modifiers: String,
    },

    /// The constructor body failed.
    #[error("constructor of {type_name} failed: {source}")]
    Failed {
        /// Dotted name of the target type.
        type_name: String,
        /// The error raised by the constructor body.
        #[source]
        source: BoxedError,
    },
}

/// Construct an instance of `ty` from the argument vector.
///
/// Only public constructors are considered accessible; see
/// [`construct_with`] for guarded construction.
pub fn construct(ty: &Arc<TypeDescriptor>, args: &ArgVec) -> Result<Instance, ConstructError> {
    construct_with(ty, args, None)
}

/// Construct an instance of `ty`, optionally under an access grant.
pub fn construct_with(
    ty: &Arc<TypeDescriptor>,
    args: &ArgVec,
    grant: Option<&AccessGrant>,
) -> Result<Instance, ConstructError> {
    let arg_ids = args.type_ids();

    let ctor = ty
        .constructors()
        .iter()
        .find(|c| c.params() == arg_ids.as_slice())
        .ok_or_else(|| ConstructError::NoMatchingConstructor {
            type_name: ty.name().to_string(),
            arg_types: args.type_names().join(", "),
        })?;

    if !accessible(ctor, grant) {
        return Err(ConstructError::Denied {
            type_name: ty.name().to_string(),
            modifiers: ctor.modifiers().render(),
        });
    }

    let value = ctor
        .instantiate(args.clone_values())
        .map_err(|source| ConstructError::Failed {
            type_name: ty.name().to_string(),
            source,
        })?;

    Ok(Instance::new(ty.clone(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TypeBuilder;
    use speculo_core::{with_member_access, Member, Modifiers};

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("refusing to build")]
    struct BuildRefused;

    fn point_type() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeBuilder::<Point>::new("app.geo.Point")
                .constructor(|(): ()| Point { x: 0, y: 0 })
                .constructor(|(x, y): (i32, i32)| Point { x, y })
                .build(),
        )
    }

    #[test]
    fn test_exact_match_selects_constructor() {
        let ty = point_type();

        let zero = construct(&ty, &ArgVec::new()).unwrap();
        assert_eq!(*zero.downcast_ref::<Point>().unwrap(), Point { x: 0, y: 0 });

        let args = ArgVec::new().with(3i32).with(4i32);
        let p = construct(&ty, &args).unwrap();
        assert_eq!(*p.downcast_ref::<Point>().unwrap(), Point { x: 3, y: 4 });
    }

    #[test]
    fn test_no_widening_between_numeric_types() {
        let ty = point_type();

        // Declared (i32, i32); i64 arguments must not match.
        let args = ArgVec::new().with(3i64).with(4i64);
        let err = construct(&ty, &args).unwrap_err();
        assert!(matches!(err, ConstructError::NoMatchingConstructor { .. }));
        assert!(err.to_string().contains("i64"));
    }

    #[test]
    fn test_zero_constructors_yields_no_match() {
        struct Opaque;
        let ty = Arc::new(TypeBuilder::<Opaque>::new("app.geo.Opaque").build());

        let args = ArgVec::new().with(1i32);
        let err = construct(&ty, &args).unwrap_err();
        assert!(matches!(err, ConstructError::NoMatchingConstructor { .. }));
    }

    #[test]
    fn test_private_constructor_denied_without_grant() {
        struct Sealed;
        let ty = Arc::new(
            TypeBuilder::<Sealed>::new("app.geo.Sealed")
                .private_constructor(|(): ()| Sealed)
                .build(),
        );

        let err = construct(&ty, &ArgVec::new()).unwrap_err();
        match err {
            ConstructError::Denied { modifiers, .. } => assert_eq!(modifiers, "private"),
            other => panic!("expected Denied, got {other:?}"),
        }
    }

    #[test]
    fn test_private_constructor_allowed_under_grant() {
        struct Sealed;
        let ty = Arc::new(
            TypeBuilder::<Sealed>::new("app.geo.Sealed")
                .private_constructor(|(): ()| Sealed)
                .build(),
        );

        let ctor = &ty.constructors()[0];
        let instance = with_member_access(ctor, |grant| {
            construct_with(&ty, &ArgVec::new(), Some(grant))
        })
        .unwrap();
        assert!(instance.is::<Sealed>());
    }

    #[test]
    fn test_failing_constructor_body() {
        struct Fussy;
        let ty = Arc::new(
            TypeBuilder::<Fussy>::new("app.geo.Fussy")
                .fallible_constructor(|(): ()| Err::<Fussy, _>(BuildRefused))
                .build(),
        );

        let err = construct(&ty, &ArgVec::new()).unwrap_err();
        match err {
            ConstructError::Failed { source, .. } => {
                assert_eq!(source.to_string(), "refusing to build");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_protected_constructor_modifier_reported() {
        struct Guarded;
        let ty = Arc::new(
            TypeBuilder::<Guarded>::new("app.geo.Guarded")
                .constructor_with(Modifiers::PROTECTED, |(): ()| Guarded)
                .build(),
        );

        assert_eq!(ty.constructors()[0].modifier_string(), "protected");
        let err = construct(&ty, &ArgVec::new()).unwrap_err();
        assert!(matches!(err, ConstructError::Denied { .. }));
    }
}
