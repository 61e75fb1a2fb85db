//! Member modifier set and predicates.
//!
//! [`Modifiers`] is a compact bitset over the visibility and binding
//! modifiers a member can carry. The predicate functions are pure and
//! total over any [`Member`]; none of them can fail.
//!
//! Textual modifier queries match whole tokens of the rendered modifier
//! string, never substrings, so distinctly-named modifiers can never
//! false-positive on one another.

use std::fmt;

use crate::member::Member;

/// Modifier flags for members of registered types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No modifiers set.
    pub const NONE: Self = Self(0x00);
    /// Accessible from anywhere.
    pub const PUBLIC: Self = Self(0x01);
    /// Accessible to the declaring type and its subtypes.
    pub const PROTECTED: Self = Self(0x02);
    /// Accessible to the declaring type only.
    pub const PRIVATE: Self = Self(0x04);
    /// Bound to the type rather than an instance.
    pub const STATIC: Self = Self(0x08);
    /// Not reassignable / not overridable.
    pub const FINAL: Self = Self(0x10);

    /// Create from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get raw bits.
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if this set contains every flag of `other`.
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of modifier sets.
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Parse a single canonical modifier name.
    pub fn parse_name(name: &str) -> Option<Self> {
        match name {
            "public" => Some(Self::PUBLIC),
            "protected" => Some(Self::PROTECTED),
            "private" => Some(Self::PRIVATE),
            "static" => Some(Self::STATIC),
            "final" => Some(Self::FINAL),
            _ => None,
        }
    }

    /// Canonical names of the flags set, in rendering order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.contains(Self::PUBLIC) {
            out.push("public");
        }
        if self.contains(Self::PROTECTED) {
            out.push("protected");
        }
        if self.contains(Self::PRIVATE) {
            out.push("private");
        }
        if self.contains(Self::STATIC) {
            out.push("static");
        }
        if self.contains(Self::FINAL) {
            out.push("final");
        }
        out
    }

    /// Render the canonical space-separated modifier string,
    /// e.g. `"public static final"`. Empty for [`Modifiers::NONE`].
    pub fn render(&self) -> String {
        self.names().join(" ")
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A modifier query: either a flag set or a canonical textual name.
#[derive(Debug, Clone, Copy)]
pub enum ModifierQuery<'a> {
    /// Match members whose modifier set contains these flags.
    Flags(Modifiers),
    /// Match members whose rendered modifier string contains this name
    /// as a whole token.
    Name(&'a str),
}

impl From<Modifiers> for ModifierQuery<'static> {
    fn from(flags: Modifiers) -> Self {
        ModifierQuery::Flags(flags)
    }
}

impl<'a> From<&'a str> for ModifierQuery<'a> {
    fn from(name: &'a str) -> Self {
        ModifierQuery::Name(name)
    }
}

/// Whether the member is bound to its type rather than an instance.
pub fn is_static<M: Member + ?Sized>(member: &M) -> bool {
    member.modifiers().contains(Modifiers::STATIC)
}

/// Whether the member is final.
pub fn is_final<M: Member + ?Sized>(member: &M) -> bool {
    member.modifiers().contains(Modifiers::FINAL)
}

/// Whether the member is public.
pub fn is_public<M: Member + ?Sized>(member: &M) -> bool {
    member.modifiers().contains(Modifiers::PUBLIC)
}

/// Whether the member is protected.
pub fn is_protected<M: Member + ?Sized>(member: &M) -> bool {
    member.modifiers().contains(Modifiers::PROTECTED)
}

/// Whether the member is private.
pub fn is_private<M: Member + ?Sized>(member: &M) -> bool {
    member.modifiers().contains(Modifiers::PRIVATE)
}

/// Whether the member is both static and final.
///
/// Defined as the conjunction of [`is_static`] and [`is_final`], not as a
/// single combined mask test.
pub fn is_static_and_final<M: Member + ?Sized>(member: &M) -> bool {
    is_static(member) && is_final(member)
}

/// Whether the member's name starts with `prefix`.
pub fn has_name_prefix<M: Member + ?Sized>(prefix: &str, member: &M) -> bool {
    member.name().starts_with(prefix)
}

/// Whether the member carries the queried modifier.
///
/// Textual queries are matched against whole tokens of the rendered
/// modifier string; a fragment such as `"stat"` never matches `static`.
pub fn has_modifier<'a, M, Q>(member: &M, query: Q) -> bool
where
    M: Member + ?Sized,
    Q: Into<ModifierQuery<'a>>,
{
    match query.into() {
        ModifierQuery::Flags(flags) => member.modifiers().contains(flags),
        ModifierQuery::Name(name) => member
            .modifiers()
            .render()
            .split_whitespace()
            .any(|token| token == name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::testing::TestMember;

    fn member(modifiers: Modifiers) -> TestMember {
        TestMember {
            name: "sample",
            declaring_type: "app.widgets.Sample",
            modifiers,
        }
    }

    #[test]
    fn test_flag_predicates() {
        let m = member(Modifiers::PUBLIC.union(Modifiers::STATIC));
        assert!(is_public(&m));
        assert!(is_static(&m));
        assert!(!is_final(&m));
        assert!(!is_private(&m));
        assert!(!is_protected(&m));
    }

    #[test]
    fn test_static_and_final_is_conjunction() {
        let both = member(Modifiers::STATIC.union(Modifiers::FINAL));
        let static_only = member(Modifiers::STATIC);
        let final_only = member(Modifiers::FINAL);

        assert!(is_static_and_final(&both));
        assert!(!is_static_and_final(&static_only));
        assert!(!is_static_and_final(&final_only));

        for m in [&both, &static_only, &final_only] {
            assert_eq!(is_static_and_final(m), is_static(m) && is_final(m));
        }
    }

    #[test]
    fn test_render_canonical_order() {
        let m = Modifiers::FINAL
            .union(Modifiers::STATIC)
            .union(Modifiers::PUBLIC);
        assert_eq!(m.render(), "public static final");
        assert_eq!(Modifiers::NONE.render(), "");
    }

    #[test]
    fn test_parse_name_round_trip() {
        for name in ["public", "protected", "private", "static", "final"] {
            let flags = Modifiers::parse_name(name).unwrap();
            assert_eq!(flags.render(), name);
        }
        assert!(Modifiers::parse_name("synchronized").is_none());
    }

    #[test]
    fn test_has_modifier_by_flag() {
        let m = member(Modifiers::PROTECTED.union(Modifiers::FINAL));
        assert!(has_modifier(&m, Modifiers::PROTECTED));
        assert!(has_modifier(&m, Modifiers::FINAL));
        assert!(!has_modifier(&m, Modifiers::STATIC));
    }

    #[test]
    fn test_has_modifier_by_name() {
        let m = member(Modifiers::PUBLIC.union(Modifiers::STATIC));
        assert!(has_modifier(&m, "public"));
        assert!(has_modifier(&m, "static"));
        assert!(!has_modifier(&m, "final"));
    }

    #[test]
    fn test_has_modifier_no_substring_false_positive() {
        // A protected-only member must not be reported as private (or
        // anything else), and name fragments must not match tokens.
        let m = member(Modifiers::PROTECTED);
        assert!(has_modifier(&m, "protected"));
        assert!(!has_modifier(&m, "private"));
        assert!(!has_modifier(&m, "public"));
        assert!(!has_modifier(&m, "prot"));

        let s = member(Modifiers::STATIC);
        assert!(!has_modifier(&s, "stat"));
        assert!(!has_modifier(&s, "staticfinal"));
    }

    #[test]
    fn test_name_prefix() {
        let m = member(Modifiers::PUBLIC);
        assert!(has_name_prefix("sam", &m));
        assert!(has_name_prefix("", &m));
        assert!(!has_name_prefix("get", &m));
    }

    #[test]
    fn test_modifier_string_via_member() {
        use crate::member::Member;
        let m = member(Modifiers::PRIVATE.union(Modifiers::STATIC));
        assert_eq!(m.modifier_string(), "private static");
    }
}
