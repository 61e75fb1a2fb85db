//! Per-call access capabilities.
//!
//! A non-public member can only be constructed, invoked, read, or written
//! while an [`AccessGrant`] covering it is in scope. Grants are immutable
//! values minted for exactly one closure invocation by
//! [`with_member_access`]; nothing on the member itself is ever toggled,
//! so concurrent operations on the same member cannot observe each
//! other's grants. A member's visibility before and after a guarded call
//! is identical by construction.

use crate::member::Member;
use crate::modifiers::is_public;

/// A capability lifting the visibility restriction of one member.
///
/// The grant names the member it covers; it confers nothing for any other
/// member. Grants cannot be stored past the guarded call that minted them
/// (they are only handed out by reference).
#[derive(Debug)]
pub struct AccessGrant {
    declaring_type: String,
    member: String,
}

impl AccessGrant {
    fn for_member<M: Member + ?Sized>(member: &M) -> Self {
        Self {
            declaring_type: member.declaring_type().to_string(),
            member: member.name().to_string(),
        }
    }

    /// Whether this grant covers the given member.
    pub fn covers<M: Member + ?Sized>(&self, member: &M) -> bool {
        self.declaring_type == member.declaring_type() && self.member == member.name()
    }
}

/// Whether `member` may be accessed under the given grant.
///
/// Public members are always accessible; non-public members require a
/// covering grant.
pub fn accessible<M: Member + ?Sized>(member: &M, grant: Option<&AccessGrant>) -> bool {
    is_public(member) || grant.is_some_and(|g| g.covers(member))
}

/// Run `op` exactly once with a grant covering `member`.
///
/// The grant is scoped to the closure: it does not exist before the call
/// and cannot escape it, so the member's visibility as observed by any
/// other code path is unchanged throughout.
pub fn with_member_access<M, R>(member: &M, op: impl FnOnce(&AccessGrant) -> R) -> R
where
    M: Member + ?Sized,
{
    let grant = AccessGrant::for_member(member);
    op(&grant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::testing::TestMember;
    use crate::modifiers::Modifiers;

    fn private_member() -> TestMember {
        TestMember {
            name: "secret",
            declaring_type: "app.widgets.Vault",
            modifiers: Modifiers::PRIVATE,
        }
    }

    fn public_member() -> TestMember {
        TestMember {
            name: "open",
            declaring_type: "app.widgets.Vault",
            modifiers: Modifiers::PUBLIC,
        }
    }

    #[test]
    fn test_private_member_accessible_only_within_guard() {
        let m = private_member();

        assert!(!accessible(&m, None));

        let ran = with_member_access(&m, |grant| {
            assert!(accessible(&m, Some(grant)));
            true
        });
        assert!(ran);

        // Visibility outside the guarded call is unchanged.
        assert!(!accessible(&m, None));
    }

    #[test]
    fn test_public_member_unaffected_by_guard() {
        let m = public_member();

        assert!(accessible(&m, None));
        with_member_access(&m, |grant| {
            assert!(accessible(&m, Some(grant)));
        });
        assert!(accessible(&m, None));
    }

    #[test]
    fn test_grant_covers_only_its_member() {
        let secret = private_member();
        let other = TestMember {
            name: "other",
            declaring_type: "app.widgets.Vault",
            modifiers: Modifiers::PRIVATE,
        };

        with_member_access(&secret, |grant| {
            assert!(grant.covers(&secret));
            assert!(!grant.covers(&other));
            assert!(!accessible(&other, Some(grant)));
        });
    }

    #[test]
    fn test_guard_runs_operation_exactly_once() {
        let m = private_member();
        let mut calls = 0;
        with_member_access(&m, |_| calls += 1);
        assert_eq!(calls, 1);
    }
}
