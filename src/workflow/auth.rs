use tracing::info;
use uuid::Uuid;

use crate::context::AppContext;
use crate::domain::session::Session;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub site: String,
    pub identity: String,
    pub secret: String,
    pub project_key: String,
}

impl LoginRequest {
    fn validate(&self) -> AppResult<()> {
        let blank = [
            &self.site,
            &self.identity,
            &self.secret,
            &self.project_key,
        ]
        .iter()
        .any(|value| value.trim().is_empty());
        if blank {
            return Err(AppError::BadRequest(
                "Jira Site, Email, API Token, and Project Key are required.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds credentials from the login form and checks them against Jira.
pub async fn authenticate(ctx: &AppContext, request: &LoginRequest) -> AppResult<Session> {
    request.validate()?;
    let session = Session::new(
        &request.site,
        request.identity.trim(),
        &request.secret,
        &request.project_key,
    );
    ctx.issue_tracker.verify_identity(&session).await?;
    Ok(session)
}

/// Authenticates and stores the session under a fresh id, which is returned.
pub async fn login(ctx: &AppContext, request: &LoginRequest) -> AppResult<String> {
    let session = authenticate(ctx, request).await?;
    let session_id = Uuid::new_v4().to_string();
    info!(
        session = %session.fingerprint(),
        project = %session.project_key,
        site = %session.base_url,
        "login successful"
    );
    ctx.sessions
        .create(&session_id, session, ctx.config.session_ttl)
        .await;
    Ok(session_id)
}

pub async fn logout(ctx: &AppContext, session_id: Option<&str>) {
    if let Some(session_id) = session_id {
        ctx.sessions.remove(session_id).await;
    }
}

pub async fn require_session(ctx: &AppContext, session_id: Option<&str>) -> AppResult<Session> {
    let session_id = session_id.ok_or(AppError::Unauthorized)?;
    ctx.sessions
        .get(session_id)
        .await
        .ok_or(AppError::Unauthorized)
}
