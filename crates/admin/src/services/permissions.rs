//! Role-based permission checks.

use std::collections::{HashMap, HashSet};

use bizdesk_core::{Permission, Role};

/// Decides whether a set of roles grants a permission.
pub trait PermissionCheck: Send + Sync {
    /// Whether any of `roles` grants `permission`.
    fn can(&self, roles: &[Role], permission: Permission) -> bool;
}

/// Static role → permissions table.
///
/// Role IDs match case-insensitively. Unknown roles grant nothing.
#[derive(Debug, Clone)]
pub struct RolePermissions {
    grants: HashMap<String, HashSet<Permission>>,
}

impl RolePermissions {
    /// An empty table; every check fails.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    /// Grant `permissions` to `role`, adding to any earlier grants.
    #[must_use]
    pub fn grant(mut self, role: &str, permissions: &[Permission]) -> Self {
        self.grants
            .entry(role.trim().to_lowercase())
            .or_default()
            .extend(permissions.iter().copied());
        self
    }
}

impl Default for RolePermissions {
    /// `admin` has everything, `staff` everything except permanent delete,
    /// `viewer` can only look.
    fn default() -> Self {
        Self::empty()
            .grant("admin", &Permission::ALL)
            .grant(
                "staff",
                &[
                    Permission::ViewCustomers,
                    Permission::CreateCustomers,
                    Permission::EditCustomers,
                    Permission::ArchiveCustomers,
                ],
            )
            .grant("viewer", &[Permission::ViewCustomers])
    }
}

impl PermissionCheck for RolePermissions {
    fn can(&self, roles: &[Role], permission: Permission) -> bool {
        roles.iter().any(|role| {
            self.grants
                .get(&role.as_str().to_lowercase())
                .is_some_and(|granted| granted.contains(&permission))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(ids: &[&str]) -> Vec<Role> {
        ids.iter().map(|id| Role::new(id)).collect()
    }

    #[test]
    fn test_default_table() {
        let table = RolePermissions::default();

        for permission in Permission::ALL {
            assert!(table.can(&roles(&["admin"]), permission));
        }
        assert!(table.can(&roles(&["staff"]), Permission::ArchiveCustomers));
        assert!(!table.can(&roles(&["staff"]), Permission::DeleteCustomers));
        assert!(table.can(&roles(&["viewer"]), Permission::ViewCustomers));
        assert!(!table.can(&roles(&["viewer"]), Permission::EditCustomers));
    }

    #[test]
    fn test_roles_combine_and_ignore_case() {
        let table = RolePermissions::default();
        assert!(table.can(&roles(&["viewer", "Admin"]), Permission::DeleteCustomers));
        assert!(!table.can(&roles(&["guest"]), Permission::ViewCustomers));
        assert!(!table.can(&[], Permission::ViewCustomers));
    }

    #[test]
    fn test_custom_grants() {
        let table = RolePermissions::empty().grant("clerk", &[Permission::CreateCustomers]);
        assert!(table.can(&roles(&["clerk"]), Permission::CreateCustomers));
        assert!(!table.can(&roles(&["clerk"]), Permission::ViewCustomers));
    }
}
