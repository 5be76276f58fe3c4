use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::field::RemoteField;
use crate::domain::session::Session;
use crate::domain::ticket::Ticket;
use crate::domain::update::TransitionCandidate;
use crate::error::AppResult;

/// The slice of Jira's REST API the dashboard relies on.
#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Succeeds only when the remote accepts the session's credentials.
    async fn verify_identity(&self, session: &Session) -> AppResult<()>;
    async fn field_directory(&self, session: &Session) -> AppResult<Vec<RemoteField>>;
    async fn search(
        &self,
        session: &Session,
        jql: &str,
        fields: &[String],
    ) -> AppResult<Vec<Ticket>>;
    async fn transitions(
        &self,
        session: &Session,
        key: &str,
    ) -> AppResult<Vec<TransitionCandidate>>;
    async fn update_fields(
        &self,
        session: &Session,
        key: &str,
        fields: &Map<String, Value>,
    ) -> AppResult<()>;
    async fn apply_transition(
        &self,
        session: &Session,
        key: &str,
        transition_id: &str,
    ) -> AppResult<()>;
}
