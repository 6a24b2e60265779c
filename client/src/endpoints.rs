//! Typed endpoint surface of the Vantage backend.
//!
//! Thin wrappers over `ApiClient::send_authorized`: one method per
//! endpoint, request/response types from `vantage-types`. No polling logic
//! lives here - `vantage-sync` drives these on its own schedule.

use serde::Serialize;

use vantage_types::{
    AggregateDimension, AggregateRow, ForceCheckStarted, ForceCheckStatus, JobId, JobStatus,
    SalesFilter, SalesFreshness, SalesInsights, SystemStatus, TicketId, TypingStatus,
};

use crate::{ApiClient, ApiError, decode_json};

#[derive(Serialize)]
struct SetTypingRequest {
    is_typing: bool,
}

impl ApiClient {
    /// `GET /api/v1/auth/system-status`. Public: also consulted before login
    /// and by the maintenance watcher.
    pub async fn system_status(&self) -> Result<SystemStatus, ApiError> {
        let response = self
            .send_public(|http| http.get(self.url("/api/v1/auth/system-status")))
            .await?;
        decode_json(response).await
    }

    /// `GET /api/v1/seller/force-check/status`.
    pub async fn force_check_status(&self) -> Result<ForceCheckStatus, ApiError> {
        self.get_json("/api/v1/seller/force-check/status").await
    }

    /// `POST /api/v1/seller/force-check`. Starts a listing re-check job;
    /// poll the returned job id for progress.
    pub async fn start_force_check(&self) -> Result<ForceCheckStarted, ApiError> {
        let response = self
            .send_authorized(|http| http.post(self.url("/api/v1/seller/force-check")))
            .await?;
        decode_json(response).await
    }

    /// `GET /api/v1/seller/jobs/{id}/status`.
    pub async fn job_status(&self, job: &JobId) -> Result<JobStatus, ApiError> {
        self.get_json(&format!("/api/v1/seller/jobs/{job}/status"))
            .await
    }

    /// `GET /api/v1/support/tickets/{id}/typing`.
    pub async fn typing_status(&self, ticket: &TicketId) -> Result<TypingStatus, ApiError> {
        self.get_json(&format!("/api/v1/support/tickets/{ticket}/typing"))
            .await
    }

    /// `POST /api/v1/support/tickets/{id}/typing`. Fire-and-forget from the
    /// caller's perspective; the response body is ignored.
    pub async fn set_typing(&self, ticket: &TicketId, is_typing: bool) -> Result<(), ApiError> {
        self.send_authorized(|http| {
            http.post(self.url(&format!("/api/v1/support/tickets/{ticket}/typing")))
                .json(&SetTypingRequest { is_typing })
        })
        .await?;
        Ok(())
    }

    /// `GET /api/v1/seller/sales/insights`.
    pub async fn sales_insights(&self, filter: &SalesFilter) -> Result<SalesInsights, ApiError> {
        let response = self
            .send_authorized(|http| {
                http.get(self.url("/api/v1/seller/sales/insights")).query(filter)
            })
            .await?;
        decode_json(response).await
    }

    /// `GET /api/v1/seller/sales/freshness`.
    pub async fn sales_freshness(&self) -> Result<SalesFreshness, ApiError> {
        self.get_json("/api/v1/seller/sales/freshness").await
    }

    /// `GET /api/v1/seller/sales/aggregates/{dimension}`.
    pub async fn sales_aggregates(
        &self,
        dimension: AggregateDimension,
        filter: &SalesFilter,
    ) -> Result<Vec<AggregateRow>, ApiError> {
        let response = self
            .send_authorized(|http| {
                http.get(self.url(&format!(
                    "/api/v1/seller/sales/aggregates/{}",
                    dimension.as_path_segment()
                )))
                .query(filter)
            })
            .await?;
        decode_json(response).await
    }

    /// `GET /api/v1/seller/sales/distinct-skus`.
    pub async fn distinct_skus(&self, filter: &SalesFilter) -> Result<Vec<String>, ApiError> {
        let response = self
            .send_authorized(|http| {
                http.get(self.url("/api/v1/seller/sales/distinct-skus"))
                    .query(filter)
            })
            .await?;
        decode_json(response).await
    }
}

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use vantage_config::ClientConfig;
    use vantage_session::{MemorySessionStore, Session, SessionManager};
    use vantage_types::{
        AggregateDimension, DateRange, JobId, JobState, Role, SalesFilter, TicketId, User,
    };

    use crate::{ApiClient, ApiError};

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ClientConfig {
            base_url: server.uri(),
            data_dir: std::env::temp_dir(),
            connect_timeout: Duration::from_secs(5),
            maintenance_poll: Duration::from_secs(60),
            typing_poll: Duration::from_secs(8),
            job_poll: Duration::from_secs(3),
            filter_debounce: Duration::from_millis(500),
        };
        let session = Arc::new(SessionManager::load(Arc::new(MemorySessionStore::new())));
        session
            .sign_in(Session {
                access_token: "at-1".to_string(),
                refresh_token: "rt-1".to_string(),
                user: User {
                    id: 1,
                    name: "Priya".to_string(),
                    email: "priya@example.com".to_string(),
                    role: Role::Seller,
                },
            })
            .expect("sign in");
        ApiClient::new(&config, session)
    }

    #[tokio::test]
    async fn sales_filter_becomes_query_parameters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/seller/sales/insights"))
            .and(query_param("sku", "SKU-9"))
            .and(query_param("from", "2025-01-01"))
            .and(query_param("to", "2025-01-31"))
            .and(query_param("top_n", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_gmv": 1250.5,
                "total_orders": 42,
                "total_units": 77,
                "top_skus": [{"key": "SKU-9", "gmv": 1250.5, "orders": 42}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let filter = SalesFilter::default()
            .with_sku("SKU-9")
            .with_dates(DateRange {
                from: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                to: chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            })
            .with_top_n(5);

        let insights = client.sales_insights(&filter).await.expect("insights");
        assert_eq!(insights.total_orders, 42);
        assert_eq!(insights.top_skus.len(), 1);
    }

    #[tokio::test]
    async fn aggregate_dimension_selects_the_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/seller/sales/aggregates/region"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"key": "south", "gmv": 10.0, "orders": 2}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let rows = client
            .sales_aggregates(AggregateDimension::Region, &SalesFilter::default())
            .await
            .expect("aggregates");
        assert_eq!(rows[0].key, "south");
    }

    #[tokio::test]
    async fn job_status_parses_lifecycle_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/seller/jobs/fc-7/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "job_id": "fc-7", "status": "completed", "progress": 100, "total_asins": 310
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let status = client.job_status(&JobId::new("fc-7")).await.expect("status");
        assert_eq!(status.status, JobState::Completed);
        assert!(status.status.is_terminal());
    }

    #[tokio::test]
    async fn business_error_message_is_surfaced_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/seller/force-check"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(serde_json::json!({"message": "force check already queued"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.start_force_check().await.unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "force check already queued");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn set_typing_posts_the_flag() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/support/tickets/T-3/typing"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .set_typing(&TicketId::new("T-3"), true)
            .await
            .expect("set typing");
    }

    #[tokio::test]
    async fn system_status_needs_no_session() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/auth/system-status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"maintenance_mode": true})),
            )
            .mount(&server)
            .await;

        // Deliberately unauthenticated client.
        let config = ClientConfig {
            base_url: server.uri(),
            data_dir: std::env::temp_dir(),
            connect_timeout: Duration::from_secs(5),
            maintenance_poll: Duration::from_secs(60),
            typing_poll: Duration::from_secs(8),
            job_poll: Duration::from_secs(3),
            filter_debounce: Duration::from_millis(500),
        };
        let session = Arc::new(SessionManager::load(Arc::new(MemorySessionStore::new())));
        let client = ApiClient::new(&config, session);

        let status = client.system_status().await.expect("status");
        assert!(status.maintenance_mode);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/seller/sales/freshness"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.sales_freshness().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.is_transient());
    }
}
