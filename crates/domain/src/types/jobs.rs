//! Job postings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Draft,
    #[serde(alias = "active", alias = "published")]
    Open,
    Paused,
    #[serde(alias = "expired")]
    Closed,
}

impl_wire_enum_conversions!(JobStatus {
    Draft => "draft",
    Open => "open" | "active" | "published",
    Paused => "paused",
    Closed => "closed" | "expired",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[serde(alias = "full-time")]
    FullTime,
    #[serde(alias = "part-time")]
    PartTime,
    Contract,
    Internship,
    Temporary,
}

impl_wire_enum_conversions!(EmploymentType {
    FullTime => "full_time" | "full-time" | "fulltime",
    PartTime => "part_time" | "part-time" | "parttime",
    Contract => "contract",
    Internship => "internship",
    Temporary => "temporary",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub sub_industry: Option<String>,
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub salary_min: Option<u64>,
    #[serde(default)]
    pub salary_max: Option<u64>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a job
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobStatusUpdate {
    pub status: JobStatus,
}

/// Filters for the job list screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    pub search: Option<String>,
    pub status: Option<JobStatus>,
    pub industry: Option<String>,
    pub sub_industry: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl JobQuery {
    /// Query-string pairs for the populated filters
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search".to_string(), search.trim().to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.to_string()));
        }
        if let Some(industry) = &self.industry {
            pairs.push(("industry".to_string(), industry.clone()));
        }
        if let Some(sub_industry) = &self.sub_industry {
            pairs.push(("subIndustry".to_string(), sub_industry.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_skip_empty_filters() {
        let query = JobQuery {
            search: Some("  ".into()),
            status: Some(JobStatus::Open),
            sub_industry: Some("Backend".into()),
            page: Some(2),
            ..Default::default()
        };

        assert_eq!(
            query.to_pairs(),
            vec![
                ("status".to_string(), "open".to_string()),
                ("subIndustry".to_string(), "Backend".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn draft_omits_unset_fields() {
        let draft = JobDraft {
            title: "Rust Engineer".into(),
            description: "Build things".into(),
            employment_type: Some(EmploymentType::FullTime),
            ..Default::default()
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["employmentType"], "full_time");
        assert!(json.get("salaryMin").is_none());
    }

    #[test]
    fn job_defaults_missing_status_to_draft() {
        let job: Job = serde_json::from_str(r#"{"_id":"j1","title":"QA"}"#).unwrap();
        assert_eq!(job.status, JobStatus::Draft);
        assert!(job.description.is_empty());
    }
}
