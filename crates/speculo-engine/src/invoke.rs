//! Method invocation and field access.
//!
//! Invocation is for effect only: a successful call returns `Ok(())` and
//! any result the method wants to expose travels through its receiver.
//! Field reads hand back a clone of the value; writes require the field
//! to have been registered with a setter. Non-public members need an
//! access grant covering them.

use speculo_core::{accessible, with_member_access, AccessGrant, ArgVec, BoxedValue, Member};

use crate::descriptor::{BoxedError, FieldDescriptor, MethodDescriptor};
use crate::instance::Instance;

/// Errors produced while invoking a method.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// No method with the requested name exists on the type.
    #[error("no method named {method} on {type_name}")]
    NoSuchMethod {
        /// Dotted name of the receiver's type.
        type_name: String,
        /// Requested method name.
        method: String,
    },

    /// The method is not public and no grant covers it.
    #[error("method {method} on {type_name} is not accessible")]
    Denied {
        /// Dotted name of the receiver's type.
        type_name: String,
        /// Method name.
        method: String,
    },

    /// The argument runtime types differ from the declared parameters.
    #[error("method {method} on {type_name} does not take argument types ({arg_types})")]
    SignatureMismatch {
        /// Dotted name of the receiver's type.
        type_name: String,
        /// Method name.
        method: String,
        /// Rendered runtime type names of the arguments.
        arg_types: String,
    },

    /// The method body failed.
    #[error("method {method} on {type_name} failed: {source}")]
    Failed {
        /// Dotted name of the receiver's type.
        type_name: String,
        /// Method name.
        method: String,
        /// The error raised by the method body.
        #[source]
        source: BoxedError,
    },
}

/// Invoke a previously resolved method on an instance.
pub fn invoke(
    method: &MethodDescriptor,
    instance: &mut Instance,
    args: &ArgVec,
) -> Result<(), InvokeError> {
    invoke_with(method, instance, args, None)
}

/// Invoke a previously resolved method, optionally under an access grant.
pub fn invoke_with(
    method: &MethodDescriptor,
    instance: &mut Instance,
    args: &ArgVec,
    grant: Option<&AccessGrant>,
) -> Result<(), InvokeError> {
    if !accessible(method, grant) {
        return Err(InvokeError::Denied {
            type_name: method.declaring_type().to_string(),
            method: method.name().to_string(),
        });
    }

    if method.params() != args.type_ids().as_slice() {
        return Err(InvokeError::SignatureMismatch {
            type_name: method.declaring_type().to_string(),
            method: method.name().to_string(),
            arg_types: args.type_names().join(", "),
        });
    }

    method
        .call(instance.value_mut(), args.clone_values())
        .map_err(|source| InvokeError::Failed {
            type_name: method.declaring_type().to_string(),
            method: method.name().to_string(),
            source,
        })
}

impl Instance {
    /// Resolve a method by name on this instance's type and invoke it.
    pub fn invoke(&mut self, name: &str, args: &ArgVec) -> Result<(), InvokeError> {
        let ty = self.descriptor().clone();
        let method = ty.method(name).ok_or_else(|| InvokeError::NoSuchMethod {
            type_name: ty.name().to_string(),
            method: name.to_string(),
        })?;
        invoke(method, self, args)
    }
}

/// Errors produced while reading or writing a field.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// No field with the requested name exists on the type.
    #[error("no field named {field} on {type_name}")]
    NoSuchField {
        /// Dotted name of the receiver's type.
        type_name: String,
        /// Requested field name.
        field: String,
    },

    /// The field is not public and no grant covers it.
    #[error("field {field} on {type_name} is not accessible")]
    Denied {
        /// Dotted name of the receiver's type.
        type_name: String,
        /// Field name.
        field: String,
    },

    /// The field was registered without a setter.
    #[error("field {field} on {type_name} is read-only")]
    ReadOnly {
        /// Dotted name of the receiver's type.
        type_name: String,
        /// Field name.
        field: String,
    },

    /// The written value's runtime type differs from the field type.
    #[error("field {field} on {type_name} holds {expected}, not the written type")]
    TypeMismatch {
        /// Dotted name of the receiver's type.
        type_name: String,
        /// Field name.
        field: String,
        /// Declared field value type name.
        expected: &'static str,
    },

    /// The accessor body failed.
    #[error("field {field} on {type_name} access failed: {source}")]
    Failed {
        /// Dotted name of the receiver's type.
        type_name: String,
        /// Field name.
        field: String,
        /// The error raised by the accessor.
        #[source]
        source: BoxedError,
    },
}

fn field_error(
    field: &FieldDescriptor,
    make: impl FnOnce(String, String) -> FieldError,
) -> FieldError {
    make(field.declaring_type().to_string(), field.name().to_string())
}

/// Read a field's value (as a clone), optionally under an access grant.
pub fn read_field(
    field: &FieldDescriptor,
    instance: &Instance,
    grant: Option<&AccessGrant>,
) -> Result<BoxedValue, FieldError> {
    if !accessible(field, grant) {
        return Err(field_error(field, |type_name, field| FieldError::Denied {
            type_name,
            field,
        }));
    }
    field
        .get(instance.value_ref())
        .map_err(|source| FieldError::Failed {
            type_name: field.declaring_type().to_string(),
            field: field.name().to_string(),
            source,
        })
}

/// Write a field's value, optionally under an access grant.
pub fn write_field<V: std::any::Any + Send + Sync>(
    field: &FieldDescriptor,
    instance: &mut Instance,
    value: V,
    grant: Option<&AccessGrant>,
) -> Result<(), FieldError> {
    if !accessible(field, grant) {
        return Err(field_error(field, |type_name, field| FieldError::Denied {
            type_name,
            field,
        }));
    }
    let setter = field.setter.as_ref().ok_or_else(|| {
        field_error(field, |type_name, field| FieldError::ReadOnly {
            type_name,
            field,
        })
    })?;
    if std::any::TypeId::of::<V>() != field.value_type() {
        return Err(FieldError::TypeMismatch {
            type_name: field.declaring_type().to_string(),
            field: field.name().to_string(),
            expected: field.value_type_name(),
        });
    }
    setter(instance.value_mut(), Box::new(value)).map_err(|source| FieldError::Failed {
        type_name: field.declaring_type().to_string(),
        field: field.name().to_string(),
        source,
    })
}

/// Look up a field by name and run `op` with a grant covering it.
///
/// The grant lives for exactly the one invocation of `op`; the field's
/// visibility outside the call is untouched.
pub fn with_accessible_field<R>(
    instance: &mut Instance,
    name: &str,
    op: impl FnOnce(&mut Instance, &FieldDescriptor, &AccessGrant) -> R,
) -> Result<R, FieldError> {
    let ty = instance.descriptor().clone();
    let field = ty.field(name).ok_or_else(|| FieldError::NoSuchField {
        type_name: ty.name().to_string(),
        field: name.to_string(),
    })?;
    Ok(with_member_access(field, |grant| op(instance, field, grant)))
}
