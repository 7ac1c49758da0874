//! Wire types for the Rozgar listing backend.
//!
//! Everything here mirrors the backend's JSON (camelCase, Mongo-style
//! `_id`). Domain validation of staff roles and permission sets happens
//! one layer up; these structs stay faithful to what is on the wire.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unwrap the backend's `{ "data": ... }` envelope.
///
/// The backend emits both enveloped and flat bodies depending on route
/// version; callers always go through this so either shape decodes.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// -------- Auth --------

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub mobile_number: String,
    pub purpose: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub mobile_number: String,
    pub otp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
}

/// Payload under `data` in a successful verify-otp response.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct VerifyOtpData {
    pub token: String,
    pub user: StaffUser,
}

/// The `user` object returned by auth and subadmin routes. `role` stays a
/// string here; recognized staff roles are enforced at the session layer.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub mobile_number: String,
    pub role: String,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub admin_profile: Option<AdminProfile>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub assigned_states: Vec<String>,
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default)]
    pub verified_by: Option<Box<StaffUser>>,
}

// -------- Jobs --------

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub job_type: Option<String>, // CENTRAL | STATE
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub age_min: Option<u32>,
    #[serde(default)]
    pub age_max: Option<u32>,
    #[serde(default)]
    pub last_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub application_link: Option<String>,
    #[serde(default)]
    pub vacancy_count: Option<u32>,
    #[serde(default)]
    pub salary_range: Option<SalaryRange>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobList {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

// -------- Schemes --------

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub scheme_type: Option<String>, // CENTRAL | STATE
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub benefit: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub age_min: Option<u32>,
    #[serde(default)]
    pub age_max: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub application_link: Option<String>,
    #[serde(default)]
    pub eligibility_criteria: Option<String>,
    #[serde(default)]
    pub documents_required: Vec<String>,
    #[serde(default)]
    pub benefit_amount: Option<BenefitAmount>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BenefitAmount {
    pub amount: u64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>, // Fixed | Monthly | ...
}

#[derive(Debug, Default, Deserialize)]
pub struct SchemeList {
    #[serde(default)]
    pub schemes: Vec<Scheme>,
}

// -------- Users --------

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub mobile_number: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubadminList {
    #[serde(default)]
    pub subadmins: Vec<StaffUser>,
}

/// Body for subadmin create/update.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubadminUpsert {
    pub mobile_number: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub assigned_states: Vec<String>,
}

// -------- Admin stats --------

#[derive(Debug, Default, Serialize, Deserialize, Clone, JsonSchema)]
pub struct AdminStats {
    #[serde(default)]
    pub users: UserStats,
    #[serde(default)]
    pub jobs: ListingStats,
    #[serde(default)]
    pub schemes: ListingStats,
    #[serde(default)]
    pub recent: RecentStats,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, JsonSchema)]
pub struct UserStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub admins: u64,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ListingStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub featured: u64,
    #[serde(default)]
    pub central: u64,
    #[serde(default)]
    pub state: u64,
}

/// New records over the trailing seven days.
#[derive(Debug, Default, Serialize, Deserialize, Clone, JsonSchema)]
pub struct RecentStats {
    #[serde(default)]
    pub jobs: u64,
    #[serde(default)]
    pub schemes: u64,
    #[serde(default)]
    pub users: u64,
}

// -------- Audit log --------

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub action: String,
    #[serde(default)]
    pub performed_by: Option<ActorRef>,
    #[serde(default)]
    pub target_user: Option<ActorRef>,
    #[serde(default)]
    pub status: Option<String>, // SUCCESS | FAILED
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Slim reference to the acting/target account on an audit row.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub admin_profile: Option<AdminProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogData {
    #[serde(default)]
    pub audit_logs: Vec<AuditLogEntry>,
}

/// Audit rows plus the pagination counters the backend keeps at the top
/// level, outside the `data` envelope.
#[derive(Debug, Default)]
pub struct AuditLogPage {
    pub entries: Vec<AuditLogEntry>,
    pub total: u64,
    pub pages: u64,
}
