//! Roles and capabilities.
//!
//! Roles form a closed enumeration; authorization questions are asked
//! through [`Role::can`] rather than comparing role names. The wire
//! representation is the backend's snake_case string.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Seller,
    Admin,
    SuperAdmin,
}

/// Things a user may be allowed to do. Checked via [`Role::can`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// View the seller dashboard, sales analytics, and listing health.
    ViewSellerDashboard,
    /// View the admin dashboard and cross-tenant reports.
    ViewAdminDashboard,
    /// Trigger a force check of listed ASINs.
    RunForceCheck,
    /// Manage team members and billing for the tenant.
    ManageTenant,
    /// Platform-wide administration (tenant suspension, plan overrides).
    ManagePlatform,
}

impl Role {
    #[must_use]
    pub const fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::ViewSellerDashboard | Capability::RunForceCheck => {
                matches!(self, Self::Seller)
            }
            Capability::ViewAdminDashboard => matches!(self, Self::Admin | Self::SuperAdmin),
            Capability::ManageTenant => {
                matches!(self, Self::Seller | Self::Admin | Self::SuperAdmin)
            }
            Capability::ManagePlatform => matches!(self, Self::SuperAdmin),
        }
    }

    /// The dashboard a freshly-authenticated user of this role lands on.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Seller => "/seller/dashboard",
            Self::Admin | Self::SuperAdmin => "/admin/dashboard",
        }
    }

    /// The path namespace reserved for this role.
    ///
    /// Admin and super-admin share the `/admin` namespace.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::Seller => "/seller",
            Self::Admin | Self::SuperAdmin => "/admin",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            r#""super_admin""#
        );
        let role: Role = serde_json::from_str(r#""seller""#).unwrap();
        assert_eq!(role, Role::Seller);
    }

    #[test]
    fn admins_share_the_admin_dashboard() {
        assert_eq!(Role::Admin.dashboard_path(), Role::SuperAdmin.dashboard_path());
        assert_eq!(Role::Admin.namespace(), "/admin");
    }

    #[test]
    fn capability_matrix() {
        assert!(Role::Seller.can(Capability::RunForceCheck));
        assert!(!Role::Admin.can(Capability::RunForceCheck));

        assert!(Role::Admin.can(Capability::ViewAdminDashboard));
        assert!(Role::SuperAdmin.can(Capability::ViewAdminDashboard));
        assert!(!Role::Seller.can(Capability::ViewAdminDashboard));

        assert!(Role::SuperAdmin.can(Capability::ManagePlatform));
        assert!(!Role::Admin.can(Capability::ManagePlatform));
    }
}
