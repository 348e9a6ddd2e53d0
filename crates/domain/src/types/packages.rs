//! Subscription packages sold to employers

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl_wire_enum_conversions!(BillingPeriod {
    Monthly => "monthly" | "month",
    Quarterly => "quarterly" | "quarter",
    Yearly => "yearly" | "annual" | "year",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    /// Price in minor currency units
    pub price: u64,
    #[serde(default)]
    pub billing_period: BillingPeriod,
    #[serde(default)]
    pub job_post_limit: Option<u32>,
    #[serde(default)]
    pub team_member_limit: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDraft {
    pub name: String,
    pub price: u64,
    pub billing_period: BillingPeriod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_post_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_member_limit: Option<u32>,
    pub features: Vec<String>,
    pub active: bool,
}
