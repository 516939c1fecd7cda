//! Request-level permission policy
//!
//! A single rule evaluated once per request, independent of the resource.

/// What a request wants to do with the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Fetch or list
    Read,
    /// Create, update or delete
    Write,
}

/// Authenticated caller as reported by the identity lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Identity {
    pub fn is_privileged(&self) -> bool {
        self.is_superuser || self.is_staff
    }
}

pub trait PermissionPolicy: Send + Sync {
    /// `identity` is `None` for anonymous callers
    fn has_permission(&self, access: Access, identity: Option<&Identity>) -> bool;
}

/// Anyone may read; only staff or superusers may write.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffOrReadOnly;

impl PermissionPolicy for StaffOrReadOnly {
    fn has_permission(&self, access: Access, identity: Option<&Identity>) -> bool {
        match access {
            Access::Read => true,
            Access::Write => identity.is_some_and(Identity::is_privileged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(is_staff: bool, is_superuser: bool) -> Identity {
        Identity {
            subject: "reader".to_string(),
            is_staff,
            is_superuser,
        }
    }

    #[test]
    fn test_reads_are_always_allowed() {
        let policy = StaffOrReadOnly;
        assert!(policy.has_permission(Access::Read, None));
        assert!(policy.has_permission(Access::Read, Some(&identity(false, false))));
    }

    #[test]
    fn test_writes_require_staff_or_superuser() {
        let policy = StaffOrReadOnly;
        assert!(!policy.has_permission(Access::Write, None));
        assert!(!policy.has_permission(Access::Write, Some(&identity(false, false))));
        assert!(policy.has_permission(Access::Write, Some(&identity(true, false))));
        assert!(policy.has_permission(Access::Write, Some(&identity(false, true))));
        assert!(policy.has_permission(Access::Write, Some(&identity(true, true))));
    }
}
