pub mod session_cookie;

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::context::AppContext;
use crate::domain::field::RemoteField;
use crate::domain::update::UpdateRequest;
use crate::domain::validation::{Banner, RowReview, RowState, review_row};
use crate::error::{AppError, AppResult};
use crate::workflow::auth::{self, LoginRequest};
use crate::workflow::tickets::{DashboardRow, dashboard_row, list_tickets, required_fields};
use crate::workflow::update::{UpdateAck, apply_update};

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/jira-fields", get(jira_fields))
        .route("/api/tickets", get(tickets))
        .route("/api/tickets/{key}", patch(update_ticket))
        .route("/api/rows/validate", post(validate_rows))
        .with_state(ctx)
}

pub async fn serve(ctx: AppContext, listen_addr: &str) -> AppResult<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!(address = %listener.local_addr()?, "dashboard backend listening");
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

#[derive(Serialize)]
struct Message {
    message: String,
}

fn message(text: impl Into<String>) -> Json<Message> {
    Json(Message {
        message: text.into(),
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let mut body = json!({ "message": self.to_string() });
        if let Some(details) = self.details() {
            body["details"] = details;
        }
        (status, Json(body)).into_response()
    }
}

/// Malformed or mistyped bodies are client errors in the usual `{message}` shape.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    #[serde(default)]
    jira_site: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    api_token: String,
    #[serde(default)]
    jira_project_key: String,
}

async fn login(
    State(ctx): State<AppContext>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let body = json_body(body)?;
    let request = LoginRequest {
        site: body.jira_site,
        identity: body.email,
        secret: body.api_token,
        project_key: body.jira_project_key,
    };
    let session_id = auth::login(&ctx, &request).await?;
    let cookie = session_cookie::issue(&session_id, ctx.config.session_ttl);
    Ok(([(SET_COOKIE, cookie)], message("Login successful")))
}

async fn logout(State(ctx): State<AppContext>, headers: HeaderMap) -> impl IntoResponse {
    auth::logout(&ctx, session_cookie::session_id(&headers).as_deref()).await;
    ([(SET_COOKIE, session_cookie::expire())], message("Logged out"))
}

async fn jira_fields(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<RemoteField>>> {
    let session =
        auth::require_session(&ctx, session_cookie::session_id(&headers).as_deref()).await?;
    Ok(Json(required_fields(&ctx, &session).await?))
}

async fn tickets(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<DashboardRow>>> {
    let session =
        auth::require_session(&ctx, session_cookie::session_id(&headers).as_deref()).await?;
    let listing = list_tickets(&ctx, &session, &ctx.config.issue_type).await?;
    let today = Local::now().date_naive();
    let rows = listing
        .tickets
        .iter()
        .map(|ticket| dashboard_row(&listing.catalog, ticket, today))
        .collect();
    Ok(Json(rows))
}

#[derive(Deserialize)]
struct UpdateBody {
    #[serde(default, alias = "changes")]
    updates: Option<BTreeMap<String, Value>>,
}

async fn update_ticket(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(key): Path<String>,
    body: Result<Json<UpdateBody>, JsonRejection>,
) -> AppResult<Json<UpdateAck>> {
    let session =
        auth::require_session(&ctx, session_cookie::session_id(&headers).as_deref()).await?;
    let changes = json_body(body)?
        .updates
        .ok_or_else(|| AppError::BadRequest("Update data is missing.".to_string()))?;
    let request = UpdateRequest {
        ticket_key: key,
        changes,
    };
    Ok(Json(apply_update(&ctx, &session, &request).await?))
}

#[derive(Deserialize)]
struct ValidateBody {
    #[serde(default)]
    today: Option<NaiveDate>,
    rows: Vec<ValidateRow>,
}

#[derive(Deserialize)]
struct ValidateRow {
    #[serde(default)]
    key: Option<String>,
    cells: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ReviewedRow {
    key: Option<String>,
    review: RowReview,
}

#[derive(Serialize)]
struct ValidateResponse {
    rows: Vec<ReviewedRow>,
    banner: Banner,
}

/// Runs the date checks and derived statuses on rows the client is editing.
async fn validate_rows(
    body: Result<Json<ValidateBody>, JsonRejection>,
) -> AppResult<Json<ValidateResponse>> {
    let body = json_body(body)?;
    let today = body.today.unwrap_or_else(|| Local::now().date_naive());
    let rows: Vec<ReviewedRow> = body
        .rows
        .into_iter()
        .map(|row| ReviewedRow {
            review: review_row(&RowState::from_cells(&row.cells), today),
            key: row.key,
        })
        .collect();
    let banner = Banner::from_reviews(rows.iter().map(|row| &row.review));
    Ok(Json(ValidateResponse { rows, banner }))
}
