//! Per-company team size limits

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLimit {
    pub company_id: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub max_members: u32,
    #[serde(default)]
    pub current_members: u32,
}

impl TeamLimit {
    /// Seats still available before the limit is reached
    pub const fn remaining(&self) -> u32 {
        self.max_members.saturating_sub(self.current_members)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLimitUpdate {
    pub max_members: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_never_underflows() {
        let limit = TeamLimit {
            company_id: "c1".into(),
            company_name: None,
            max_members: 3,
            current_members: 5,
        };
        assert_eq!(limit.remaining(), 0);
    }
}
