//! REST data model
//!
//! Shapes exchanged with the portal backend. Identifiers are server-issued
//! strings (`_id` on the wire, `id` accepted too).

pub mod advertisements;
pub mod applications;
pub mod auth;
pub mod candidates;
pub mod homepage;
pub mod jobs;
pub mod packages;
pub mod team;

use serde::{Deserialize, Serialize};

pub use advertisements::{AdPlacement, Advertisement, AdvertisementDraft};
pub use applications::{Application, ApplicationStatus, ApplicationStatusUpdate};
pub use auth::{AuthSession, LoginRequest, RegisterRequest, UserProfile, UserRole};
pub use candidates::{Candidate, CandidateQuery};
pub use homepage::{HomepageBanner, HomepageContent, HomepageSection};
pub use jobs::{EmploymentType, Job, JobDraft, JobQuery, JobStatus, JobStatusUpdate};
pub use packages::{BillingPeriod, Package, PackageDraft};
pub use team::{TeamLimit, TeamLimitUpdate};

/// Paginated list returned by collection endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "data", alias = "results")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub pages: Option<u32>,
}

impl<T> Page<T> {
    /// Wrap a bare array response
    pub fn from_items(items: Vec<T>) -> Self {
        let total = Some(items.len() as u64);
        Self { items, total, page: None, pages: None }
    }
}
