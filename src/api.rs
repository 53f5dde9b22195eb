// src/api.rs
//! Dashboard-facing bid alert endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::categorize::BidCategory;
use crate::notify::{self, MailTransport};
use crate::store::{BidAlert, BidStore, InsertOutcome, NewBidAlert};

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 500;
pub const TEST_TITLE_PREFIX: &str = "[TEST]";

#[derive(Clone)]
pub struct Mailer {
    pub transport: Arc<dyn MailTransport>,
    pub recipient: String,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BidStore>,
    pub mailer: Option<Mailer>,
}

impl AppState {
    pub fn new(store: Arc<dyn BidStore>) -> Self {
        Self {
            store,
            mailer: None,
        }
    }

    pub fn with_mailer(
        mut self,
        transport: Arc<dyn MailTransport>,
        recipient: impl Into<String>,
    ) -> Self {
        self.mailer = Some(Mailer {
            transport,
            recipient: recipient.into(),
        });
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/bid-alerts", get(list_alerts).put(update_alert))
        .route("/bid-alerts/test", post(create_test_alert))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn internal(e: anyhow::Error) -> Self {
        tracing::error!(error = ?e, "bid alert api error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(serde::Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<BidAlert>>, ApiError> {
    let limit = q.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let rows = state
        .store
        .list_recent(limit)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(rows))
}

#[derive(serde::Deserialize)]
struct UpdateReq {
    id: i64,
    notified: bool,
}

async fn update_alert(
    State(state): State<AppState>,
    body: Result<Json<UpdateReq>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

    let found = state
        .store
        .set_notified(req.id, req.notified)
        .await
        .map_err(ApiError::internal)?;
    if !found {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "Alert not found"));
    }
    Ok(Json(json!({ "message": "Alert updated successfully" })))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestBidReq {
    source: String,
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
    bid_category: BidCategory,
    #[serde(default)]
    services: Vec<String>,
    #[serde(default)]
    publish_date: Option<DateTime<Utc>>,
    #[serde(default)]
    closing_date: Option<DateTime<Utc>>,
}

pub fn with_test_prefix(title: &str) -> String {
    if title.starts_with(TEST_TITLE_PREFIX) {
        title.to_string()
    } else {
        format!("{TEST_TITLE_PREFIX} {title}")
    }
}

async fn create_test_alert(
    State(state): State<AppState>,
    body: Result<Json<TestBidReq>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;
    let now = Utc::now();

    let alert = NewBidAlert {
        source: req.source,
        title: with_test_prefix(&req.title),
        url: req.url,
        description: req.description,
        bid_category: req.bid_category,
        services: req.services,
        publish_date: req.publish_date.unwrap_or(now),
        closing_date: req.closing_date,
        notified: false,
        created_at: now,
    };

    let saved = match state
        .store
        .insert_if_unique(&alert)
        .await
        .map_err(ApiError::internal)?
    {
        InsertOutcome::Inserted(saved) => saved,
        InsertOutcome::AlreadyExists => {
            return Err(ApiError::new(
                StatusCode::CONFLICT,
                "A bid alert with this url and title already exists",
            ))
        }
    };

    let message = match &state.mailer {
        Some(m) => {
            let one = std::slice::from_ref(&saved);
            notify::notify_new_bids(m.transport.as_ref(), &m.recipient, one)
                .await
                .map_err(ApiError::internal)?;
            "Test bid alert created and email sent successfully"
        }
        None => {
            tracing::warn!(id = saved.id, "test bid alert stored; mail not configured");
            "Test bid alert created; email not configured"
        }
    };

    Ok(Json(json!({ "message": message, "id": saved.id })))
}
