//! Job applications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    #[serde(alias = "applied")]
    Pending,
    Reviewed,
    Shortlisted,
    #[serde(alias = "interviewing")]
    Interview,
    #[serde(alias = "accepted")]
    Hired,
    Rejected,
}

impl_wire_enum_conversions!(ApplicationStatus {
    Pending => "pending" | "applied",
    Reviewed => "reviewed",
    Shortlisted => "shortlisted",
    Interview => "interview" | "interviewing",
    Hired => "hired" | "accepted",
    Rejected => "rejected",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub job_id: String,
    pub candidate_id: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationStatusUpdate {
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
