use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use crate::cmd::validate::render_review;
use crate::domain::field::{ColumnSpec, DASHBOARD_COLUMNS, FieldKind, names_match};
use crate::domain::validation::{RowState, parse_date, review_row};
use crate::drafts::DraftStore;
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub command: DraftCommand,
    /// Reference date for derived statuses; defaults to the local date.
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DraftCommand {
    /// Edit one column of a ticket's draft and re-check the row.
    Set {
        key: String,
        column: String,
        value: String,
    },
    /// Show a ticket's draft and its review.
    Show { key: String },
    /// Discard a ticket's draft.
    Clear { key: String },
}

pub fn run(args: DraftArgs, limit: usize) -> AppResult<()> {
    let mut store = DraftStore::load(limit)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    match args.command {
        DraftCommand::Set { key, column, value } => {
            let column = editable_column(&column)?;
            check_value(column, &value)?;
            let values = store.set(&key, column.logical_name, &value);
            store.save()?;
            let review = review_row(&RowState::from_cells(&values), today);
            print!("{}", render_review(Some(&key), &review));
        }
        DraftCommand::Show { key } => {
            let values = store.get(&key);
            if values.is_empty() {
                println!("No draft stored for {key}.");
                return Ok(());
            }
            for (column, value) in &values {
                println!("  {column} = {value}");
            }
            let review = review_row(&RowState::from_cells(&values), today);
            print!("{}", render_review(Some(&key), &review));
        }
        DraftCommand::Clear { key } => {
            if store.clear(&key) {
                store.save()?;
                println!("Draft for {key} discarded.");
            } else {
                println!("No draft stored for {key}.");
            }
        }
    }
    Ok(())
}

fn editable_column(name: &str) -> AppResult<&'static ColumnSpec> {
    DASHBOARD_COLUMNS
        .iter()
        .find(|column| column.editable && names_match(column.logical_name, name.trim()))
        .ok_or_else(|| AppError::BadRequest(format!("'{name}' is not an editable column")))
}

fn check_value(column: &ColumnSpec, value: &str) -> AppResult<()> {
    match column.kind {
        FieldKind::Date if !value.trim().is_empty() && parse_date(value).is_none() => Err(
            AppError::BadRequest(format!("{} expects a YYYY-MM-DD date", column.logical_name)),
        ),
        FieldKind::StatusEnum
            if !column.allowed_values.is_empty()
                && !column
                    .allowed_values
                    .iter()
                    .any(|allowed| names_match(allowed, value.trim())) =>
        {
            Err(AppError::BadRequest(format!(
                "{} must be one of: {}",
                column.logical_name,
                column.allowed_values.join(", ")
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::{HANDOVER_DATE, RELEASE_STATUS};

    #[test]
    fn resolves_editable_columns_ignoring_case() {
        assert_eq!(
            editable_column("uat handover date")
                .expect("column")
                .logical_name,
            HANDOVER_DATE
        );
        assert!(editable_column("Item#").is_err());
        assert!(editable_column("Created").is_err());
    }

    #[test]
    fn checks_dates_and_status_options() {
        let handover = editable_column(HANDOVER_DATE).expect("column");
        assert!(check_value(handover, "2024-01-10").is_ok());
        assert!(check_value(handover, "").is_ok());
        assert!(check_value(handover, "10/01/2024").is_err());

        let release = editable_column(RELEASE_STATUS).expect("column");
        assert!(check_value(release, "released").is_ok());
        assert!(check_value(release, "Signed-off").is_err());

        let workflow = editable_column("Status").expect("column");
        assert!(check_value(workflow, "Ready for QA").is_ok());
    }
}
