//! Typed portal operations
//!
//! [`PortalApi`] maps each admin operation to an endpoint, method and body
//! and hands it to the [`ApiClient`]. Authentication calls additionally store
//! the issued token and the user's profile.
//!
//! Responses may arrive bare or wrapped as `{ "success": .., "data": .. }`;
//! the wrapper is removed before decoding. List endpoints may return either a
//! bare array or a paginated object.

use std::sync::Arc;

use jobportal_core::ApiError;
use jobportal_domain::{
    Advertisement, AdvertisementDraft, Application, ApplicationStatusUpdate, AuthSession,
    Candidate, CandidateQuery, HomepageContent, Job, JobDraft, JobQuery, JobStatus,
    JobStatusUpdate, LoginRequest, Package, PackageDraft, Page, RegisterRequest, TeamLimit,
    TeamLimitUpdate, UserProfile,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::client::{encode, ApiClient};
use super::credentials::CredentialStore;
use super::request::{MultipartField, RequestBody, RequestOptions};

const ENVELOPE_KEYS: [&str; 3] = ["data", "success", "message"];

/// File sent to an image-upload endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), mime: mime.map(String::from), bytes }
    }

    fn into_field(self) -> MultipartField {
        MultipartField::file("image", self.file_name, self.mime.as_deref(), self.bytes)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Bare(Vec<T>),
    Paged(Page<T>),
}

impl<T> From<ListResponse<T>> for Page<T> {
    fn from(value: ListResponse<T>) -> Self {
        match value {
            ListResponse::Bare(items) => Self::from_items(items),
            ListResponse::Paged(page) => page,
        }
    }
}

/// Strip a `{ data }` / `{ success, data, message }` wrapper.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data")
                && map.keys().all(|key| ENVELOPE_KEYS.contains(&key.as_str())) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// `GET /auth/me` answers either the profile or `{ user: profile }`.
fn unwrap_user(value: Value) -> Value {
    match unwrap_envelope(value) {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("user") => {
            map.remove("user").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Admin operations over the portal REST API
#[derive(Debug, Clone)]
pub struct PortalApi {
    client: Arc<ApiClient>,
    credentials: Arc<CredentialStore>,
}

impl PortalApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let credentials = Arc::clone(client.credentials());
        Self { client, credentials }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.client.execute_with(endpoint, options, unwrap_envelope).await
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Page<T>, ApiError> {
        self.fetch::<ListResponse<T>>(endpoint, options).await.map(Page::from)
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(endpoint, body)?;
        self.fetch(endpoint, RequestOptions::new(method).with_body(RequestBody::Json(body))).await
    }

    async fn remove(&self, endpoint: &str) -> Result<(), ApiError> {
        self.client.execute(endpoint, RequestOptions::delete()).await.map(drop)
    }

    async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        image: ImageUpload,
    ) -> Result<T, ApiError> {
        let options = RequestOptions::multipart(Method::POST, vec![image.into_field()]);
        self.fetch(endpoint, options).await
    }

    // ---- Authentication ----

    /// Sign in with email and password, persisting the returned token and
    /// caching the profile. A failure to persist is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for rejected credentials, otherwise the
    /// executor's classified error
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthSession, ApiError> {
        self.authenticate("/auth/login", credentials).await
    }

    /// Like [`login`](Self::login) against the admin sign-in endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login)
    pub async fn admin_login(&self, credentials: &LoginRequest) -> Result<AuthSession, ApiError> {
        self.authenticate("/auth/admin/login", credentials).await
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with the server's field messages when the
    /// payload is rejected
    pub async fn register(&self, payload: &RegisterRequest) -> Result<AuthSession, ApiError> {
        self.authenticate("/auth/register", payload).await
    }

    async fn authenticate<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<AuthSession, ApiError> {
        let session: AuthSession = self.send(Method::POST, endpoint, body).await?;

        // The session is usable even if it could not be persisted.
        if let Err(err) = self.credentials.set_token(session.token.clone()).await {
            warn!(error = %err, "signed in without persisting the session");
        }
        if let Err(err) = self.credentials.save_profile(&session.user).await {
            warn!(error = %err, "failed to cache user profile");
        }

        info!(user_id = %session.user.id, role = %session.user.role, "signed in");
        Ok(session)
    }

    /// Forget the local session. The server keeps no session state to revoke.
    pub async fn logout(&self) {
        self.credentials.clear_token().await;
    }

    /// Profile of the signed-in user, with or without a `{ user }` wrapper.
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` when the token is no longer accepted
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.client.execute_with("/auth/me", RequestOptions::get(), unwrap_user).await
    }

    // ---- Jobs ----

    /// One page of jobs matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn list_jobs(&self, query: &JobQuery) -> Result<Page<Job>, ApiError> {
        self.fetch_page("/jobs", RequestOptions::get().with_query(query.to_pairs())).await
    }

    /// # Errors
    ///
    /// Returns a `Client` error with status 404 for an unknown id
    pub async fn get_job(&self, id: &str) -> Result<Job, ApiError> {
        self.fetch(&format!("/jobs/{id}"), RequestOptions::get()).await
    }

    /// Create a job and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the server rejects fields of `draft`
    pub async fn create_job(&self, draft: &JobDraft) -> Result<Job, ApiError> {
        self.send(Method::POST, "/jobs", draft).await
    }

    /// Replace the editable fields of a job.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the server rejects fields of `draft`
    pub async fn update_job(&self, id: &str, draft: &JobDraft) -> Result<Job, ApiError> {
        self.send(Method::PUT, &format!("/jobs/{id}"), draft).await
    }

    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn delete_job(&self, id: &str) -> Result<(), ApiError> {
        self.remove(&format!("/jobs/{id}")).await
    }

    /// Move a job to `status`.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn update_job_status(&self, id: &str, status: JobStatus) -> Result<Job, ApiError> {
        self.send(Method::PATCH, &format!("/jobs/{id}/status"), &JobStatusUpdate { status }).await
    }

    /// Attach an image to a job as a multipart upload.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn upload_job_image(&self, id: &str, image: ImageUpload) -> Result<Job, ApiError> {
        self.upload(&format!("/jobs/{id}/image"), image).await
    }

    // ---- Applications ----

    /// Applications, optionally narrowed to one job.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn list_applications(
        &self,
        job_id: Option<&str>,
    ) -> Result<Page<Application>, ApiError> {
        let query = job_id.map(|id| ("jobId".to_string(), id.to_string()));
        self.fetch_page("/applications", RequestOptions::get().with_query(query)).await
    }

    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn update_application_status(
        &self,
        id: &str,
        update: &ApplicationStatusUpdate,
    ) -> Result<Application, ApiError> {
        self.send(Method::PATCH, &format!("/applications/{id}/status"), update).await
    }

    // ---- Candidates ----

    /// One page of candidates matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn list_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Page<Candidate>, ApiError> {
        self.fetch_page("/candidates", RequestOptions::get().with_query(query.to_pairs())).await
    }

    /// # Errors
    ///
    /// Returns a `Client` error with status 404 for an unknown id
    pub async fn get_candidate(&self, id: &str) -> Result<Candidate, ApiError> {
        self.fetch(&format!("/candidates/{id}"), RequestOptions::get()).await
    }

    // ---- Packages ----

    /// Subscription packages, from either a bare array or a paged body.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn list_packages(&self) -> Result<Vec<Package>, ApiError> {
        self.fetch_page("/packages", RequestOptions::get()).await.map(|page| page.items)
    }

    /// # Errors
    ///
    /// Returns `Validation` when the server rejects fields of `draft`
    pub async fn create_package(&self, draft: &PackageDraft) -> Result<Package, ApiError> {
        self.send(Method::POST, "/packages", draft).await
    }

    /// # Errors
    ///
    /// Returns `Validation` when the server rejects fields of `draft`
    pub async fn update_package(
        &self,
        id: &str,
        draft: &PackageDraft,
    ) -> Result<Package, ApiError> {
        self.send(Method::PUT, &format!("/packages/{id}"), draft).await
    }

    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn delete_package(&self, id: &str) -> Result<(), ApiError> {
        self.remove(&format!("/packages/{id}")).await
    }

    // ---- Advertisements ----

    /// Advertisements, from either a bare array or a paged body.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn list_advertisements(&self) -> Result<Vec<Advertisement>, ApiError> {
        self.fetch_page("/advertisements", RequestOptions::get()).await.map(|page| page.items)
    }

    /// # Errors
    ///
    /// Returns `Validation` when the server rejects fields of `draft`
    pub async fn create_advertisement(
        &self,
        draft: &AdvertisementDraft,
    ) -> Result<Advertisement, ApiError> {
        self.send(Method::POST, "/advertisements", draft).await
    }

    /// # Errors
    ///
    /// Returns `Validation` when the server rejects fields of `draft`
    pub async fn update_advertisement(
        &self,
        id: &str,
        draft: &AdvertisementDraft,
    ) -> Result<Advertisement, ApiError> {
        self.send(Method::PUT, &format!("/advertisements/{id}"), draft).await
    }

    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn delete_advertisement(&self, id: &str) -> Result<(), ApiError> {
        self.remove(&format!("/advertisements/{id}")).await
    }

    /// Attach an image to an advertisement as a multipart upload.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn upload_advertisement_image(
        &self,
        id: &str,
        image: ImageUpload,
    ) -> Result<Advertisement, ApiError> {
        self.upload(&format!("/advertisements/{id}/image"), image).await
    }

    // ---- Homepage ----

    /// Current homepage content.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn homepage_content(&self) -> Result<HomepageContent, ApiError> {
        self.fetch("/homepage", RequestOptions::get()).await
    }

    /// Replace the homepage content and return what the server stored.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn update_homepage_content(
        &self,
        content: &HomepageContent,
    ) -> Result<HomepageContent, ApiError> {
        self.send(Method::PUT, "/homepage", content).await
    }

    // ---- Team limits ----

    /// Member limits for every company.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn team_limits(&self) -> Result<Vec<TeamLimit>, ApiError> {
        self.fetch_page("/team-limits", RequestOptions::get()).await.map(|page| page.items)
    }

    /// Set the member limit for one company.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the call
    pub async fn update_team_limit(
        &self,
        company_id: &str,
        max_members: u32,
    ) -> Result<TeamLimit, ApiError> {
        let update = TeamLimitUpdate { max_members };
        self.send(Method::PUT, &format!("/team-limits/{company_id}"), &update).await
    }
}
