use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::domain::field::{
    DASHBOARD_COLUMNS, FieldCatalog, FieldKind, RemoteField, filter_directory,
    required_remote_names, resolve_catalog,
};
use crate::domain::session::Session;
use crate::domain::ticket::{FieldValue, Ticket};
use crate::domain::validation::{RowReview, RowState, review_row};
use crate::error::AppResult;

/// Fetches Jira's field directory and resolves the dashboard columns against it.
pub async fn load_catalog(ctx: &AppContext, session: &Session) -> AppResult<FieldCatalog> {
    let directory = ctx.issue_tracker.field_directory(session).await?;
    let catalog = resolve_catalog(&directory, DASHBOARD_COLUMNS);
    for entry in catalog.entries().iter().filter(|entry| !entry.resolved) {
        debug!(column = %entry.logical_name, "no Jira field matched, using the name verbatim");
    }
    Ok(catalog)
}

/// The directory entries the dashboard needs.
pub async fn required_fields(ctx: &AppContext, session: &Session) -> AppResult<Vec<RemoteField>> {
    let directory = ctx.issue_tracker.field_directory(session).await?;
    Ok(filter_directory(directory, &required_remote_names()))
}

pub fn build_jql(project_key: &str, issue_type: &str) -> String {
    format!(
        "project = \"{}\" AND issuetype = \"{}\" ORDER BY created DESC",
        escape_jql(project_key),
        escape_jql(issue_type)
    )
}

fn escape_jql(value: &str) -> String {
    value.trim().replace('\\', "\\\\").replace('"', "\\\"")
}

pub struct TicketListing {
    pub catalog: FieldCatalog,
    pub tickets: Vec<Ticket>,
}

/// Newest-first tickets of the session's project, restricted to the catalog's fields.
pub async fn list_tickets(
    ctx: &AppContext,
    session: &Session,
    issue_type: &str,
) -> AppResult<TicketListing> {
    let catalog = load_catalog(ctx, session).await?;
    let jql = build_jql(&session.project_key, issue_type);
    let fields = catalog.search_fields();
    debug!(%jql, fields = %fields.join(","), "searching Jira");

    let tickets = ctx.issue_tracker.search(session, &jql, &fields).await?;
    info!(
        session = %session.fingerprint(),
        project = %session.project_key,
        count = tickets.len(),
        "tickets fetched"
    );
    Ok(TicketListing { catalog, tickets })
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardRow {
    pub key: String,
    pub fields: BTreeMap<String, FieldValue>,
    /// Column name → display text for the editable columns.
    pub cells: BTreeMap<String, String>,
    pub review: RowReview,
}

pub fn dashboard_row(catalog: &FieldCatalog, ticket: &Ticket, today: NaiveDate) -> DashboardRow {
    let cells = row_cells(catalog, ticket);
    let review = review_row(&RowState::from_cells(&cells), today);
    DashboardRow {
        key: ticket.key.clone(),
        fields: ticket.fields.clone(),
        cells,
        review,
    }
}

fn row_cells(catalog: &FieldCatalog, ticket: &Ticket) -> BTreeMap<String, String> {
    catalog
        .entries()
        .iter()
        .filter(|entry| entry.editable || entry.kind == FieldKind::Date)
        .filter_map(|entry| {
            ticket
                .text(&entry.remote_id)
                .map(|text| (entry.logical_name.clone(), text))
        })
        .collect()
}
