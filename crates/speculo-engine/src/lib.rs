//! Speculo engine — dynamic type registry, package scanning,
//! construction, and invocation.
//!
//! The engine discovers registered types by scanning a namespace's
//! on-disk representation, constructs instances by matching constructor
//! parameter types against argument *runtime* types, and invokes methods
//! or accesses fields with per-call access grants for non-public
//! members.
//!
//! Types are made discoverable by explicit registration at startup:
//!
//! ```ignore
//! use speculo_engine::{registry, ArgVec, PackageScanner, TypeBuilder};
//!
//! registry::global().register(
//!     TypeBuilder::<Widget>::new("app.widgets.Widget")
//!         .constructor(|(label,): (String,)| Widget::labeled(label))
//!         .implements::<dyn Render>(|w| w as Box<dyn Render>),
//! );
//!
//! let args = ArgVec::new().with("dashboard".to_string());
//! let (widgets, report) =
//!     speculo_engine::collect_instances_global::<dyn Render>("app.widgets", &args)?;
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod construct;
pub mod descriptor;
pub mod instance;
pub mod invoke;
pub mod pipeline;
pub mod registry;
pub mod scan;

pub use builder::{ArgTuple, TypeBuilder};
pub use construct::{construct, construct_with, ConstructError};
pub use descriptor::{
    BoxedError, CasterFn, ConstructorDescriptor, FieldDescriptor, MethodDescriptor, TypeDescriptor,
};
pub use instance::Instance;
pub use invoke::{
    invoke, invoke_with, read_field, with_accessible_field, write_field, FieldError, InvokeError,
};
pub use pipeline::{
    collect_instances, collect_instances_global, create_instances, create_instances_global,
    for_each_instance, for_each_instance_global, ItemOutcome, ItemStatus, PipelineReport,
};
pub use registry::{global, TypeLoader, TypeRegistry};
pub use scan::{PackageScanner, Scan, ScanError, ScanItem};

// Core member model, re-exported for convenience.
pub use speculo_core::{
    accessible, has_modifier, has_name_prefix, is_final, is_private, is_protected, is_public,
    is_static, is_static_and_final, with_member_access, AccessGrant, ArgError, ArgVec, BoxedValue,
    Member, ModifierQuery, Modifiers,
};
