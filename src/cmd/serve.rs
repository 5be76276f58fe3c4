use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::http;
use crate::infra::jira::JiraClient;
use crate::infra::sessions::MemorySessionStore;
use crate::services::SystemClock;

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Override the configured listen address.
    #[arg(short, long)]
    pub listen: Option<String>,
}

pub async fn run(config: AppConfig, args: ServeArgs) -> AppResult<()> {
    let listen_addr = args.listen.unwrap_or_else(|| config.listen_addr.clone());
    info!(
        issue_type = %config.issue_type,
        session_ttl_secs = config.session_ttl.as_secs(),
        request_timeout_secs = config.request_timeout.as_secs(),
        "starting dashboard backend"
    );

    let issue_tracker = Arc::new(JiraClient::new(config.request_timeout)?);
    let sessions = Arc::new(MemorySessionStore::new(Arc::new(SystemClock)));
    let context = AppContext::new(config, issue_tracker, sessions);

    http::serve(context, &listen_addr).await
}
