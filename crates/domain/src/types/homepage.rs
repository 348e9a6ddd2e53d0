//! Editable homepage content

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageContent {
    #[serde(default)]
    pub hero_title: String,
    #[serde(default)]
    pub hero_subtitle: String,
    #[serde(default)]
    pub banners: Vec<HomepageBanner>,
    #[serde(default)]
    pub sections: Vec<HomepageSection>,
    /// Job ids pinned to the homepage
    #[serde(default)]
    pub featured_job_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageBanner {
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomepageSection {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub visible: bool,
}
