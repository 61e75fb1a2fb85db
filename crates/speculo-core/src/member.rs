//! The `Member` trait implemented by every descriptor.
//!
//! A member is a field, method, or constructor belonging to a registered
//! type. The toolkit only ever reads a member's identity and modifier set;
//! descriptors themselves are owned by the type registry.

use crate::modifiers::Modifiers;

/// A field, method, or constructor of a registered type.
pub trait Member {
    /// The member's own name (`"new"` for constructors).
    fn name(&self) -> &str;

    /// Fully-qualified dotted name of the type declaring this member.
    fn declaring_type(&self) -> &str;

    /// The member's modifier set.
    fn modifiers(&self) -> Modifiers;

    /// The canonical rendered modifier string, e.g. `"public static final"`.
    fn modifier_string(&self) -> String {
        self.modifiers().render()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Minimal member used by unit tests across the crate.
    pub(crate) struct TestMember {
        pub name: &'static str,
        pub declaring_type: &'static str,
        pub modifiers: Modifiers,
    }

    impl Member for TestMember {
        fn name(&self) -> &str {
            self.name
        }

        fn declaring_type(&self) -> &str {
            self.declaring_type
        }

        fn modifiers(&self) -> Modifiers {
            self.modifiers
        }
    }
}
