//! Advertisements shown on the public portal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdPlacement {
    #[default]
    HomepageBanner,
    Sidebar,
    JobListing,
}

impl_wire_enum_conversions!(AdPlacement {
    HomepageBanner => "homepage_banner" | "banner",
    Sidebar => "sidebar",
    JobListing => "job_listing" | "listing",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub placement: AdPlacement,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementDraft {
    pub title: String,
    pub placement: AdPlacement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    pub active: bool,
}
