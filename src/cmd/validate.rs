use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use clap::Args;

use crate::domain::field::{
    HANDOVER_DATE, PLANNED_COMPLETION, PLANNED_RELEASE, PLANNED_START, RELEASE_STATUS, UAT_STATUS,
};
use crate::domain::validation::{Banner, Indicator, RowReview, RowState, review_row};
use crate::error::AppResult;

#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// UAT handover date (YYYY-MM-DD).
    #[arg(long)]
    pub handover: Option<String>,
    #[arg(long)]
    pub planned_start: Option<String>,
    #[arg(long)]
    pub planned_completion: Option<String>,
    #[arg(long)]
    pub planned_release: Option<String>,
    /// Not Started, In Progress, Signed-off or Delayed.
    #[arg(long)]
    pub uat_status: Option<String>,
    /// Not Started, In Progress, Released or Delayed.
    #[arg(long)]
    pub release_status: Option<String>,
    /// Reference date; defaults to the local date.
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

impl ValidateArgs {
    pub fn cells(&self) -> BTreeMap<String, String> {
        [
            (HANDOVER_DATE, &self.handover),
            (PLANNED_START, &self.planned_start),
            (PLANNED_COMPLETION, &self.planned_completion),
            (PLANNED_RELEASE, &self.planned_release),
            (UAT_STATUS, &self.uat_status),
            (RELEASE_STATUS, &self.release_status),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.clone().map(|value| (column.to_string(), value)))
        .collect()
    }
}

pub fn run(args: ValidateArgs) -> AppResult<bool> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let review = review_row(&RowState::from_cells(&args.cells()), today);
    print!("{}", render_review(None, &review));
    Ok(!review.has_errors())
}

/// Plain-text report for one row.
pub fn render_review(key: Option<&str>, review: &RowReview) -> String {
    let mut out = String::new();
    if let Some(key) = key {
        out.push_str(&format!("{key}\n"));
    }
    for status in &review.statuses {
        let label = status.label.unwrap_or("<unset>");
        let marker = match status.indicator {
            Indicator::Alert => " [alert]",
            Indicator::Active => "",
        };
        let note = if status.changed { " (derived)" } else { "" };
        out.push_str(&format!(
            "  {}: {label}{marker}{note}\n",
            status.track.column()
        ));
    }

    let banner = Banner::from_reviews([review]);
    if banner.visible {
        out.push_str(&format!("  error: {}\n", banner.text()));
    } else {
        out.push_str("  dates are in order\n");
    }
    out
}
