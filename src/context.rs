use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{IssueTrackerService, SessionStore};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        issue_tracker: Arc<dyn IssueTrackerService>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            issue_tracker,
            sessions,
        }
    }
}
