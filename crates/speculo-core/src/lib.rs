//! Speculo core — the member model shared by the introspection toolkit.
//!
//! This crate provides the minimal types needed to describe and guard
//! members of registered types without depending on the full engine:
//!
//! - [`modifiers`]: the [`Modifiers`] bitset and the pure predicate
//!   functions over members (`is_static`, `is_public`, ...)
//! - [`member`]: the [`Member`] trait implemented by every descriptor
//! - [`access`]: per-call [`AccessGrant`] capabilities that lift a
//!   member's visibility restriction for exactly one operation
//! - [`args`]: the [`ArgVec`] argument vector whose runtime types drive
//!   constructor and method overload resolution

#![warn(missing_docs)]

pub mod access;
pub mod args;
pub mod member;
pub mod modifiers;

pub use access::{accessible, with_member_access, AccessGrant};
pub use args::{ArgError, ArgVec, BoxedValue};
pub use member::Member;
pub use modifiers::{
    has_modifier, has_name_prefix, is_final, is_private, is_protected, is_public, is_static,
    is_static_and_final, ModifierQuery, Modifiers,
};
