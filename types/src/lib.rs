//! Shared domain types for the Vantage client workspace.
//!
//! This crate holds the types every other crate agrees on:
//!
//! - [`Role`] / [`Capability`] - closed role enumeration with capability
//!   checks (no role string comparisons anywhere else in the workspace)
//! - [`routes`] - the route guard decision function
//! - [`JobState`] / [`JobStatus`] - long-running job lifecycle
//! - [`SalesFilter`] - query parameters for the sales analytics endpoints
//! - Newtype ids ([`JobId`], [`TicketId`])
//!
//! Everything here is plain data plus pure functions; no I/O.

mod ids;
mod job;
mod role;
pub mod routes;
mod sales;

pub use ids::{JobId, TicketId};
pub use job::{JobState, JobStatus};
pub use role::{Capability, Role};
pub use routes::GuardDecision;
pub use sales::{
    AggregateDimension, AggregateRow, DateRange, SalesFilter, SalesFreshness, SalesInsights,
};

use serde::{Deserialize, Serialize};

/// Authenticated user profile as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Response of `GET /api/v1/auth/system-status`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SystemStatus {
    pub maintenance_mode: bool,
}

/// Response of `GET /api/v1/seller/force-check/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceCheckStatus {
    pub can_check: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// Response of `POST /api/v1/seller/force-check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceCheckStarted {
    pub job_id: JobId,
    pub message: String,
}

/// Response of `GET /api/v1/support/tickets/{id}/typing`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypingStatus {
    pub is_typing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_round_trips_with_snake_case_role() {
        let json = r#"{"id":7,"name":"Asha","email":"asha@example.com","role":"super_admin"}"#;
        let user: User = serde_json::from_str(json).expect("parse user");
        assert_eq!(user.role, Role::SuperAdmin);
        let back = serde_json::to_string(&user).expect("serialize user");
        assert!(back.contains(r#""role":"super_admin""#));
    }

    #[test]
    fn typing_status_omits_absent_fields() {
        let status = TypingStatus {
            is_typing: false,
            user_name: None,
            user_role: None,
        };
        let json = serde_json::to_string(&status).expect("serialize");
        assert_eq!(json, r#"{"is_typing":false}"#);
    }
}
