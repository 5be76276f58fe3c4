use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::field::RemoteField;
use crate::domain::session::Session;
use crate::domain::ticket::Ticket;
use crate::domain::update::TransitionCandidate;
use crate::error::{AppError, AppResult, AuthFailure};
use crate::infra::sessions::MemorySessionStore;
use crate::infra::sessions::test_support::ManualClock;
use crate::services::IssueTrackerService;

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerCall {
    VerifyIdentity { base_url: String },
    FieldDirectory,
    Search { jql: String, fields: Vec<String> },
    Transitions { key: String },
    UpdateFields { key: String, fields: Map<String, Value> },
    ApplyTransition { key: String, id: String },
}

/// In-memory tracker that records every call in order.
#[derive(Default)]
pub struct FakeTracker {
    pub calls: Mutex<Vec<TrackerCall>>,
    pub accepted_auth: Mutex<Option<String>>,
    pub directory: Mutex<Vec<RemoteField>>,
    pub tickets: Mutex<Vec<Ticket>>,
    pub transitions: Mutex<Vec<TransitionCandidate>>,
    pub field_write_error: Mutex<Option<(u16, String)>>,
    pub transition_error: Mutex<Option<(u16, String)>>,
}

impl FakeTracker {
    pub fn new() -> Self {
        let tracker = Self::default();
        *tracker.accepted_auth.lock().expect("auth lock") =
            Some(crate::domain::session::basic_credential("dev@acme.io", "token"));
        *tracker.directory.lock().expect("directory lock") = vec![
            remote_field("summary", "Summary"),
            remote_field("status", "Status"),
            remote_field("duedate", "Due date"),
            remote_field("customfield_10041", "UAT Planned Start Date"),
            remote_field("customfield_10042", "UAT Planned Completion"),
            remote_field("customfield_10050", "UAT Status"),
            remote_field("customfield_10060", "Planned Release Date"),
            remote_field("customfield_10061", "Release Status"),
        ];
        *tracker.transitions.lock().expect("transitions lock") = vec![
            TransitionCandidate {
                id: "11".into(),
                name: "To Do".into(),
            },
            TransitionCandidate {
                id: "31".into(),
                name: "Done".into(),
            },
        ];
        tracker
    }

    pub fn calls(&self) -> Vec<TrackerCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn set_tickets(&self, tickets: Vec<Ticket>) {
        *self.tickets.lock().expect("tickets lock") = tickets;
    }

    fn record(&self, call: TrackerCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

pub fn remote_field(id: &str, name: &str) -> RemoteField {
    RemoteField {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn ticket(json: Value) -> Ticket {
    serde_json::from_value(json).expect("ticket json")
}

pub fn session() -> Session {
    Session::new("acme.atlassian.net", "dev@acme.io", "token", "ABC")
}

pub fn context(tracker: Arc<FakeTracker>) -> AppContext {
    let config = AppConfig {
        session_ttl: Duration::from_secs(60),
        ..AppConfig::default()
    };
    let sessions = Arc::new(MemorySessionStore::new(Arc::new(ManualClock::new())));
    AppContext::new(config, tracker, sessions)
}

#[async_trait]
impl IssueTrackerService for FakeTracker {
    async fn verify_identity(&self, session: &Session) -> AppResult<()> {
        self.record(TrackerCall::VerifyIdentity {
            base_url: session.base_url.clone(),
        });
        let accepted = self.accepted_auth.lock().expect("auth lock").clone();
        if accepted.as_deref() == Some(session.auth_header.as_str()) {
            Ok(())
        } else {
            Err(AppError::Auth {
                reason: AuthFailure::InvalidCredentials,
            })
        }
    }

    async fn field_directory(&self, _session: &Session) -> AppResult<Vec<RemoteField>> {
        self.record(TrackerCall::FieldDirectory);
        Ok(self.directory.lock().expect("directory lock").clone())
    }

    async fn search(
        &self,
        _session: &Session,
        jql: &str,
        fields: &[String],
    ) -> AppResult<Vec<Ticket>> {
        self.record(TrackerCall::Search {
            jql: jql.to_string(),
            fields: fields.to_vec(),
        });
        Ok(self.tickets.lock().expect("tickets lock").clone())
    }

    async fn transitions(
        &self,
        _session: &Session,
        key: &str,
    ) -> AppResult<Vec<TransitionCandidate>> {
        self.record(TrackerCall::Transitions {
            key: key.to_string(),
        });
        Ok(self.transitions.lock().expect("transitions lock").clone())
    }

    async fn update_fields(
        &self,
        _session: &Session,
        key: &str,
        fields: &Map<String, Value>,
    ) -> AppResult<()> {
        self.record(TrackerCall::UpdateFields {
            key: key.to_string(),
            fields: fields.clone(),
        });
        match self.field_write_error.lock().expect("error lock").clone() {
            Some((status, body)) => Err(AppError::Upstream { status, body }),
            None => Ok(()),
        }
    }

    async fn apply_transition(
        &self,
        _session: &Session,
        key: &str,
        transition_id: &str,
    ) -> AppResult<()> {
        self.record(TrackerCall::ApplyTransition {
            key: key.to_string(),
            id: transition_id.to_string(),
        });
        match self.transition_error.lock().expect("error lock").clone() {
            Some((status, body)) => Err(AppError::Upstream { status, body }),
            None => Ok(()),
        }
    }
}
