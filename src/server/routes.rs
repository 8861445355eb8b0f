//! HTTP routes over a [`KapowService`].

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gateway::{Caller, KapowService, PostAuthorizer, TokenAuthorizer};
use crate::types::{
    AnalysisRequest, FeedbackRequest, ImageRecord, Settings, SettingsPatch, sanitize_text,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<KapowService>,
    pub admins: Arc<TokenAuthorizer>,
}

/// `{"success": true, "data": ...}` envelope returned by the query endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// Media-library query. Only `post_mime_type == "kapow"` is answered.
#[derive(Debug, Default, Deserialize)]
pub struct AttachmentQuery {
    #[serde(default)]
    pub post_mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub paged: Option<i64>,
    #[serde(default)]
    pub posts_per_page: Option<i64>,
    #[serde(default)]
    pub s: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryAttachmentsBody {
    #[serde(default)]
    pub post_id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub query: Option<AttachmentQuery>,
}

impl QueryAttachmentsBody {
    /// The analysis this body asks for, if it is a complete Kapow query.
    pub fn to_request(&self) -> Option<AnalysisRequest> {
        let query = self.query.as_ref()?;
        if query.post_mime_type.as_deref() != Some("kapow") {
            return None;
        }
        let post_id = self.post_id?;
        let text = sanitize_text(query.text.as_deref()?);
        if text.is_empty() {
            return None;
        }

        let mut request = AnalysisRequest::new(post_id, text)
            .page(query.paged?, query.posts_per_page?)
            .author(self.user_id.unwrap_or(0));
        if let Some(term) = query.s.as_deref() {
            request = request.search(sanitize_text(term));
        }
        Some(request)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackPostData {
    #[serde(default)]
    pub postid: Option<u64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackBody {
    #[serde(default)]
    pub postdata: Option<FeedbackPostData>,
}

/// Post status change. Only the post id matters: any transition makes the
/// cached recommendations stale.
#[derive(Debug, Deserialize)]
pub struct TransitionBody {
    pub post_id: u64,
    #[serde(default)]
    pub new_status: Option<String>,
    #[serde(default)]
    pub old_status: Option<String>,
}

/// Settings as shown to clients. The key itself is never echoed.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SettingsView {
    pub api_key_set: bool,
    pub threshold: f64,
    pub min_topic_score: f64,
    pub per_page: u32,
}

impl From<&Settings> for SettingsView {
    fn from(settings: &Settings) -> Self {
        Self {
            api_key_set: !settings.uses_default_key(),
            threshold: settings.threshold,
            min_topic_score: settings.min_topic_score,
            per_page: settings.per_page,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/query-attachments", post(query_attachments))
        .route("/feedback", post(feedback))
        .route("/settings", get(get_settings).post(update_settings))
        .route("/posts/transition", post(post_transition))
        .route("/deactivate", post(deactivate))
        .with_state(state)
}

/// Identity from an `Authorization: Bearer <token>` header.
pub fn caller_from_headers(headers: &HeaderMap) -> Caller {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| Caller::bearer(token.trim()))
        .unwrap_or_default()
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::version_string(),
    }))
}

async fn query_attachments(
    State(state): State<AppState>,
    body: Option<Json<QueryAttachmentsBody>>,
) -> Json<Envelope<Vec<ImageRecord>>> {
    let Some(request) = body.and_then(|Json(body)| body.to_request()) else {
        debug!("query-attachments: not a kapow query");
        return success(Vec::new());
    };
    success(state.service.analyse(&request).await)
}

async fn feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<FeedbackBody>>,
) -> StatusCode {
    let data = body.and_then(|Json(body)| body.postdata);
    if let Some(FeedbackPostData {
        postid: Some(post_id),
        text: Some(text),
        url: Some(url),
    }) = data
    {
        let caller = caller_from_headers(&headers);
        let request = FeedbackRequest { post_id, text, url };
        state.service.register_feedback(&caller, &request).await;
    }
    StatusCode::NO_CONTENT
}

async fn get_settings(State(state): State<AppState>) -> Json<SettingsView> {
    Json(SettingsView::from(&state.service.settings().await))
}

async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<SettingsView>, StatusCode> {
    if !state.admins.can_edit(&caller_from_headers(&headers), 0) {
        return Err(StatusCode::FORBIDDEN);
    }
    let updated = state.service.update_settings(&patch).await;
    Ok(Json(SettingsView::from(&updated)))
}

async fn post_transition(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TransitionBody>,
) -> StatusCode {
    if !state
        .service
        .can_edit(&caller_from_headers(&headers), body.post_id)
    {
        return StatusCode::FORBIDDEN;
    }
    debug!(
        post_id = body.post_id,
        from = body.old_status.as_deref().unwrap_or(""),
        to = body.new_status.as_deref().unwrap_or(""),
        "post transition"
    );
    state.service.post_status_changed(body.post_id).await;
    StatusCode::NO_CONTENT
}

async fn deactivate(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if !state.admins.can_edit(&caller_from_headers(&headers), 0) {
        return StatusCode::FORBIDDEN;
    }
    state.service.deactivate().await;
    StatusCode::NO_CONTENT
}
