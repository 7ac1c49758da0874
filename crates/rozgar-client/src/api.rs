//! Bearer-authenticated client for the backend REST surface.
//!
//! One cross-cutting policy lives here: HTTP 401 from any route becomes
//! [`ApiError::AuthorizationDenied`], which the console answers by purging
//! the session and returning to login. Every other failure is surfaced
//! with the backend-provided message when the body carries one and leaves
//! the caller's state untouched.

use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use rozgar_core::{Principal, SessionError};
use rozgar_protocol::{
    unwrap_data, AdminStats, AuditLogData, AuditLogPage, Job, JobList, Scheme, SchemeList,
    SendOtpRequest, StaffUser, SubadminList, SubadminUpsert, UserList, UserSummary, VerifyOtpData,
    VerifyOtpRequest,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authorization denied")]
    AuthorizationDenied,
    #[error("request failed: {message}")]
    RequestFailed { status: Option<u16>, message: String },
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Message suitable for the notice line on a screen.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::AuthorizationDenied => "Session expired. Please login again.".to_string(),
            ApiError::RequestFailed { message, .. } => message.clone(),
            ApiError::Session(SessionError::InvalidRole(_)) => {
                "Access denied. Staff account required.".to_string()
            }
            _ => "Request failed".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_http(http, base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(ACCEPT, "application/json");
        if let Some(token) = self.token.as_deref() {
            if !token.trim().is_empty() {
                req = req.bearer_auth(token.trim());
            }
        }
        req
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthorizationDenied);
        }
        let text = resp.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(ApiError::RequestFailed {
                status: Some(status.as_u16()),
                message,
            });
        }
        Ok(body)
    }

    // -------- Auth --------

    pub async fn send_otp(&self, mobile_number: &str, purpose: &str) -> Result<(), ApiError> {
        let body = SendOtpRequest {
            mobile_number: mobile_number.to_string(),
            purpose: purpose.to_string(),
        };
        self.send(self.request(Method::POST, "/auth/send-otp").json(&body))
            .await?;
        Ok(())
    }

    /// Verify the OTP and return the credential with its validated staff
    /// principal. A backend `user` outside the recognized staff roles
    /// fails here with `InvalidRole`; no session can be built from it.
    pub async fn verify_otp(
        &self,
        mobile_number: &str,
        otp: &str,
        profile: Option<Value>,
    ) -> Result<(String, Principal), ApiError> {
        let body = VerifyOtpRequest {
            mobile_number: mobile_number.to_string(),
            otp: otp.to_string(),
            profile,
        };
        let resp = self
            .send(self.request(Method::POST, "/auth/verify-otp").json(&body))
            .await?;
        let data: VerifyOtpData = serde_json::from_value(unwrap_data(resp))?;
        let principal = Principal::from_wire(&data.user)?;
        Ok((data.token, principal))
    }

    /// Best-effort backend logout; callers log failures and move on.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, "/auth/logout")).await?;
        Ok(())
    }

    // -------- Jobs --------

    pub async fn list_jobs(&self, limit: Option<u32>) -> Result<Vec<Job>, ApiError> {
        let mut req = self.request(Method::GET, "/jobs");
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        let body = self.send(req).await?;
        let list: JobList = serde_json::from_value(unwrap_data(body))?;
        Ok(list.jobs)
    }

    pub async fn get_job(&self, id: &str) -> Result<Job, ApiError> {
        let body = self.send(self.request(Method::GET, &format!("/jobs/{id}"))).await?;
        Ok(extract(unwrap_data(body), "job")?)
    }

    pub async fn create_job(&self, job: &Value) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, "/admin/jobs").json(job))
            .await?;
        Ok(())
    }

    pub async fn update_job(&self, id: &str, job: &Value) -> Result<(), ApiError> {
        self.send(self.request(Method::PUT, &format!("/admin/jobs/{id}")).json(job))
            .await?;
        Ok(())
    }

    pub async fn delete_job(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("/admin/jobs/{id}")))
            .await?;
        Ok(())
    }

    // -------- Schemes --------

    pub async fn list_schemes(&self, limit: Option<u32>) -> Result<Vec<Scheme>, ApiError> {
        let mut req = self.request(Method::GET, "/schemes");
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        let body = self.send(req).await?;
        let list: SchemeList = serde_json::from_value(unwrap_data(body))?;
        Ok(list.schemes)
    }

    pub async fn get_scheme(&self, id: &str) -> Result<Scheme, ApiError> {
        let body = self
            .send(self.request(Method::GET, &format!("/schemes/{id}")))
            .await?;
        Ok(extract(unwrap_data(body), "scheme")?)
    }

    pub async fn create_scheme(&self, scheme: &Value) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, "/admin/schemes").json(scheme))
            .await?;
        Ok(())
    }

    pub async fn update_scheme(&self, id: &str, scheme: &Value) -> Result<(), ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/admin/schemes/{id}"))
                .json(scheme),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_scheme(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("/admin/schemes/{id}")))
            .await?;
        Ok(())
    }

    // -------- Users / subadmins --------

    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<UserSummary>, ApiError> {
        let req = self
            .request(Method::GET, "/admin/users")
            .query(&filter.query());
        let body = self.send(req).await?;
        let list: UserList = serde_json::from_value(unwrap_data(body))?;
        Ok(list.users)
    }

    pub async fn list_subadmins(
        &self,
        filter: &SubadminFilter,
    ) -> Result<Vec<StaffUser>, ApiError> {
        let req = self
            .request(Method::GET, "/admin/subadmins")
            .query(&filter.query());
        let body = self.send(req).await?;
        let list: SubadminList = serde_json::from_value(unwrap_data(body))?;
        Ok(list.subadmins)
    }

    pub async fn create_subadmin(&self, body: &SubadminUpsert) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, "/admin/subadmins").json(body))
            .await?;
        Ok(())
    }

    pub async fn update_subadmin(&self, id: &str, body: &SubadminUpsert) -> Result<(), ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/admin/subadmins/{id}"))
                .json(body),
        )
        .await?;
        Ok(())
    }

    pub async fn verify_subadmin(&self, id: &str, notes: Option<&str>) -> Result<(), ApiError> {
        let body = json!({ "notes": notes });
        self.send(
            self.request(Method::POST, &format!("/admin/subadmins/{id}/verify"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    pub async fn reject_subadmin(&self, id: &str, reason: &str) -> Result<(), ApiError> {
        let body = json!({ "reason": reason });
        self.send(
            self.request(Method::POST, &format!("/admin/subadmins/{id}/reject"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    pub async fn activate_subadmin(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, &format!("/admin/subadmins/{id}/activate")))
            .await?;
        Ok(())
    }

    pub async fn deactivate_subadmin(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, &format!("/admin/subadmins/{id}/deactivate")))
            .await?;
        Ok(())
    }

    // -------- Stats / audit --------

    pub async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
        let body = self.send(self.request(Method::GET, "/admin/stats")).await?;
        Ok(serde_json::from_value(unwrap_data(body))?)
    }

    pub async fn audit_logs(&self, query: &AuditLogQuery) -> Result<AuditLogPage, ApiError> {
        let req = self
            .request(Method::GET, "/audit-logs")
            .query(&query.query());
        let body = self.send(req).await?;
        // total/pages sit beside the data envelope, not inside it.
        let total = body.get("total").and_then(Value::as_u64).unwrap_or(0);
        let pages = body.get("pages").and_then(Value::as_u64).unwrap_or(1);
        let data: AuditLogData =
            serde_json::from_value(unwrap_data(body)).unwrap_or_default();
        Ok(AuditLogPage {
            entries: data.audit_logs,
            total,
            pages,
        })
    }
}

fn extract<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, serde_json::Error> {
    match value {
        Value::Object(ref map) if map.contains_key(key) => {
            serde_json::from_value(map[key].clone())
        }
        other => serde_json::from_value(other),
    }
}

/// Filters for the users listing. Only set fields reach the wire.
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub role: Option<String>,
    pub state: Option<String>,
    pub is_active: Option<bool>,
}

impl UserFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(role) = &self.role {
            q.push(("role", role.clone()));
        }
        if let Some(state) = &self.state {
            q.push(("state", state.clone()));
        }
        if let Some(active) = self.is_active {
            q.push(("isActive", active.to_string()));
        }
        q
    }
}

#[derive(Debug, Default, Clone)]
pub struct SubadminFilter {
    pub verification_status: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

impl SubadminFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(status) = &self.verification_status {
            q.push(("verificationStatus", status.clone()));
        }
        if let Some(active) = self.is_active {
            q.push(("isActive", active.to_string()));
        }
        if let Some(search) = &self.search {
            q.push(("search", search.clone()));
        }
        q
    }
}

/// Audit trail filters: action, status, date range, pagination.
#[derive(Debug, Clone)]
pub struct AuditLogQuery {
    pub action: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: u64,
    pub limit: u64,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            action: None,
            status: None,
            start_date: None,
            end_date: None,
            page: 1,
            limit: 50,
        }
    }
}

impl AuditLogQuery {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(action) = &self.action {
            q.push(("action", action.clone()));
        }
        if let Some(status) = &self.status {
            q.push(("status", status.clone()));
        }
        if let Some(start) = &self.start_date {
            q.push(("startDate", start.clone()));
        }
        if let Some(end) = &self.end_date {
            q.push(("endDate", end.clone()));
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rozgar_core::Role;
    use serde_json::json;

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(server.base_url()).expect("build client")
    }

    #[tokio::test]
    async fn bearer_header_is_attached_when_token_present() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/jobs")
                    .header("authorization", "Bearer tok-1");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"data": {"jobs": []}}));
            })
            .await;

        let client = client_for(&server).await.with_token(Some("tok-1".into()));
        let jobs = client.list_jobs(Some(100)).await.expect("list jobs");
        assert!(jobs.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_401_maps_to_authorization_denied() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/admin/stats");
                then.status(401)
                    .header("content-type", "application/json")
                    .json_body(json!({"message": "token expired"}));
            })
            .await;

        let client = client_for(&server).await.with_token(Some("stale".into()));
        let err = client.admin_stats().await.expect_err("401");
        assert!(matches!(err, ApiError::AuthorizationDenied));
    }

    #[tokio::test]
    async fn backend_message_is_surfaced_on_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/admin/jobs");
                then.status(422)
                    .header("content-type", "application/json")
                    .json_body(json!({"message": "title is required"}));
            })
            .await;

        let client = client_for(&server).await.with_token(Some("tok".into()));
        let err = client
            .create_job(&json!({"jobType": "CENTRAL"}))
            .await
            .expect_err("validation failure");
        match err {
            ApiError::RequestFailed { status, message } => {
                assert_eq!(status, Some(422));
                assert_eq!(message, "title is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn verify_otp_returns_validated_staff_principal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/verify-otp");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "data": {
                            "token": "tok-9",
                            "user": {
                                "_id": "a7",
                                "mobileNumber": "9876543210",
                                "role": "ADMIN",
                                "adminProfile": {"name": "Asha", "permissions": [], "assignedStates": []}
                            }
                        }
                    }));
            })
            .await;

        let client = client_for(&server).await;
        let (token, principal) = client
            .verify_otp("9876543210", "123456", None)
            .await
            .expect("verify");
        assert_eq!(token, "tok-9");
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.name, "Asha");
    }

    #[tokio::test]
    async fn verify_otp_rejects_non_staff_role() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/verify-otp");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "data": {
                            "token": "tok-9",
                            "user": {"_id": "u1", "mobileNumber": "9876543210", "role": "USER"}
                        }
                    }));
            })
            .await;

        let client = client_for(&server).await;
        let err = client
            .verify_otp("9876543210", "123456", None)
            .await
            .expect_err("non-staff");
        assert!(matches!(
            err,
            ApiError::Session(SessionError::InvalidRole(ref r)) if r == "USER"
        ));
    }

    #[tokio::test]
    async fn audit_query_serializes_only_set_filters() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/audit-logs")
                    .query_param("page", "2")
                    .query_param("limit", "50")
                    .query_param("action", "SUBADMIN_VERIFIED");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "data": {"auditLogs": [{
                            "_id": "l1",
                            "action": "SUBADMIN_VERIFIED",
                            "status": "SUCCESS",
                            "createdAt": "2026-07-01T10:00:00Z"
                        }]},
                        "total": 51,
                        "pages": 2
                    }));
            })
            .await;

        let client = client_for(&server).await.with_token(Some("tok".into()));
        let page = client
            .audit_logs(&AuditLogQuery {
                action: Some("SUBADMIN_VERIFIED".into()),
                page: 2,
                ..Default::default()
            })
            .await
            .expect("audit page");
        assert_eq!(page.total, 51);
        assert_eq!(page.pages, 2);
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].action, "SUBADMIN_VERIFIED");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_users_passes_filters_on_the_wire() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/admin/users")
                    .query_param("role", "USER")
                    .query_param("isActive", "true");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"users": [
                        {"_id": "u1", "mobileNumber": "9000000001", "role": "USER", "isActive": true}
                    ]}));
            })
            .await;

        let client = client_for(&server).await.with_token(Some("tok".into()));
        let users = client
            .list_users(&UserFilter {
                role: Some("USER".into()),
                is_active: Some(true),
                ..Default::default()
            })
            .await
            .expect("users");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].mobile_number, "9000000001");
        mock.assert_async().await;
    }

    #[test]
    fn extract_handles_keyed_and_flat_shapes() {
        let keyed = json!({"job": {"_id": "j1", "title": "T"}});
        let job: Job = extract(keyed, "job").expect("keyed");
        assert_eq!(job.id, "j1");

        let flat = json!({"_id": "j2", "title": "U"});
        let job: Job = extract(flat, "job").expect("flat");
        assert_eq!(job.id, "j2");
    }
}
