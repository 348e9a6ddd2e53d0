//! Authentication and session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

/// Role of the signed-in account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Employer,
    Candidate,
}

impl_wire_enum_conversions!(UserRole {
    SuperAdmin => "super_admin" | "superadmin",
    Admin => "admin",
    Employer => "employer" | "company",
    Candidate => "candidate",
});

/// Last-known profile of the signed-in user, cached next to the token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: UserRole,
    /// Tenant the account belongs to
    #[serde(default, alias = "companyId")]
    pub company_id: Option<String>,
    #[serde(default, alias = "avatarUrl")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// Successful authentication response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_accepts_mongo_style_ids() {
        let session: AuthSession = serde_json::from_str(
            r#"{"token":"t-1","user":{"_id":"u1","email":"a@b.co","role":"employer","companyId":"c9"}}"#,
        )
        .unwrap();

        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.role, UserRole::Employer);
        assert_eq!(session.user.company_id.as_deref(), Some("c9"));
        assert!(session.expires_at.is_none());
    }

    #[test]
    fn profile_roundtrips_through_cache_format() {
        let profile = UserProfile {
            id: "u1".into(),
            email: "admin@portal.test".into(),
            name: Some("Admin".into()),
            role: UserRole::Admin,
            company_id: None,
            avatar_url: None,
        };

        let cached = serde_json::to_string(&profile).unwrap();
        let restored: UserProfile = serde_json::from_str(&cached).unwrap();
        assert_eq!(restored, profile);
    }
}
