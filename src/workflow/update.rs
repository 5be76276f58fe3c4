use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::field::FieldCatalog;
use crate::domain::session::Session;
use crate::domain::update::{UpdateRequest, classify, find_transition, is_status_field};
use crate::error::{AppError, AppResult, UpdateStage};
use crate::workflow::tickets::load_catalog;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub ticket_key: String,
    pub fields_written: usize,
    pub transitioned_to: Option<String>,
}

/// Applies a dashboard edit: direct field writes first, then at most one
/// workflow transition. A status with no matching transition fails before
/// anything is written. Completed steps are not rolled back.
pub async fn apply_update(
    ctx: &AppContext,
    session: &Session,
    request: &UpdateRequest,
) -> AppResult<UpdateAck> {
    let key = request.ticket_key.trim();
    if key.is_empty() {
        return Err(AppError::BadRequest("ticket key is required".to_string()));
    }

    let needs_catalog = request.changes.keys().any(|name| !is_status_field(name));
    let catalog = if needs_catalog {
        load_catalog(ctx, session).await?
    } else {
        FieldCatalog::default()
    };
    let classified = classify(&request.changes, &catalog)?;

    let transition = match &classified.transition {
        Some(requested) => {
            let candidates = ctx.issue_tracker.transitions(session, key).await?;
            let candidate = find_transition(&candidates, requested).ok_or_else(|| {
                warn!(ticket = %key, requested = %requested, "no matching workflow transition");
                AppError::InvalidTransition {
                    requested_value: requested.clone(),
                }
            })?;
            Some(candidate.clone())
        }
        None => None,
    };

    if !classified.field_writes.is_empty() {
        ctx.issue_tracker
            .update_fields(session, key, &classified.field_writes)
            .await
            .map_err(|err| stage_failure(UpdateStage::FieldWrite, err))?;
    }

    if let Some(transition) = &transition {
        ctx.issue_tracker
            .apply_transition(session, key, &transition.id)
            .await
            .map_err(|err| stage_failure(UpdateStage::Transition, err))?;
    }

    info!(
        session = %session.fingerprint(),
        ticket = %key,
        fields = classified.field_writes.len(),
        transition = transition.as_ref().map(|t| t.name.as_str()).unwrap_or("-"),
        "ticket updated"
    );

    Ok(UpdateAck {
        ticket_key: key.to_string(),
        fields_written: classified.field_writes.len(),
        transitioned_to: transition.map(|t| t.name),
    })
}

/// Keeps Jira's `errors`/`errorMessages` payload when there is one.
fn stage_failure(stage: UpdateStage, err: AppError) -> AppError {
    let details = match err.details() {
        Some(Value::Object(mut body)) => {
            let errors = body
                .remove("errors")
                .filter(|errors| errors.as_object().is_some_and(|map| !map.is_empty()));
            let messages = body.remove("errorMessages");
            errors.or(messages).unwrap_or(Value::Object(body))
        }
        Some(other) => other,
        None => Value::String(err.to_string()),
    };
    warn!(%stage, %details, "Jira update failed");
    AppError::UpdateFailed { stage, details }
}
