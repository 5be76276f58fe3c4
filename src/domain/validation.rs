//! Date-ordering checks and derived UAT/release statuses for one dashboard row.
//!
//! Everything here is pure: callers pass in the row and the reference date and get
//! back a [`RowReview`]. Rows never influence each other.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::field::{
    HANDOVER_DATE, PLANNED_COMPLETION, PLANNED_RELEASE, PLANNED_START, RELEASE_STATUS, UAT_STATUS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateField {
    Handover,
    PlannedStart,
    PlannedCompletion,
    PlannedRelease,
}

impl DateField {
    pub fn column(self) -> &'static str {
        match self {
            DateField::Handover => HANDOVER_DATE,
            DateField::PlannedStart => PLANNED_START,
            DateField::PlannedCompletion => PLANNED_COMPLETION,
            DateField::PlannedRelease => PLANNED_RELEASE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Track {
    Uat,
    Release,
}

impl Track {
    pub fn column(self) -> &'static str {
        match self {
            Track::Uat => UAT_STATUS,
            Track::Release => RELEASE_STATUS,
        }
    }

    /// The planned date that drives this track's derived status.
    fn driving_date(self) -> DateField {
        match self {
            Track::Uat => DateField::PlannedStart,
            Track::Release => DateField::PlannedRelease,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    /// "Signed-off" for UAT, "Released" for releases.
    Completed,
    Delayed,
}

impl ProgressStatus {
    pub fn label(self, track: Track) -> &'static str {
        match (self, track) {
            (ProgressStatus::NotStarted, _) => "Not Started",
            (ProgressStatus::InProgress, _) => "In Progress",
            (ProgressStatus::Completed, Track::Uat) => "Signed-off",
            (ProgressStatus::Completed, Track::Release) => "Released",
            (ProgressStatus::Delayed, _) => "Delayed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "not started" => Some(ProgressStatus::NotStarted),
            "in progress" => Some(ProgressStatus::InProgress),
            "signed-off" | "signed off" | "released" => Some(ProgressStatus::Completed),
            "delayed" => Some(ProgressStatus::Delayed),
            _ => None,
        }
    }

    pub fn indicator(self) -> Indicator {
        match self {
            ProgressStatus::Delayed => Indicator::Alert,
            _ => Indicator::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Indicator {
    Active,
    Alert,
}

/// The date and status cells of one row. Unparseable dates count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowState {
    #[serde(default)]
    pub handover: Option<NaiveDate>,
    #[serde(default)]
    pub planned_start: Option<NaiveDate>,
    #[serde(default)]
    pub planned_completion: Option<NaiveDate>,
    #[serde(default)]
    pub planned_release: Option<NaiveDate>,
    #[serde(default)]
    pub uat_status: Option<ProgressStatus>,
    #[serde(default)]
    pub release_status: Option<ProgressStatus>,
}

impl RowState {
    /// Builds a row from column-name → text cells, as the dashboard and drafts hold them.
    pub fn from_cells(cells: &BTreeMap<String, String>) -> Self {
        let date = |field: DateField| cells.get(field.column()).and_then(|text| parse_date(text));
        let status =
            |track: Track| cells.get(track.column()).and_then(|text| ProgressStatus::parse(text));
        Self {
            handover: date(DateField::Handover),
            planned_start: date(DateField::PlannedStart),
            planned_completion: date(DateField::PlannedCompletion),
            planned_release: date(DateField::PlannedRelease),
            uat_status: status(Track::Uat),
            release_status: status(Track::Release),
        }
    }

    pub fn date(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::Handover => self.handover,
            DateField::PlannedStart => self.planned_start,
            DateField::PlannedCompletion => self.planned_completion,
            DateField::PlannedRelease => self.planned_release,
        }
    }

    pub fn status(&self, track: Track) -> Option<ProgressStatus> {
        match track {
            Track::Uat => self.uat_status,
            Track::Release => self.release_status,
        }
    }

    fn set_status(&mut self, track: Track, status: ProgressStatus) {
        match track {
            Track::Uat => self.uat_status = Some(status),
            Track::Release => self.release_status = Some(status),
        }
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a `T...` time part.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date = text.split_once('T').map_or(text, |(date, _)| date);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

struct OrderingRule {
    earlier: DateField,
    later: DateField,
    message: &'static str,
}

const ORDERING_RULES: &[OrderingRule] = &[
    OrderingRule {
        earlier: DateField::Handover,
        later: DateField::PlannedStart,
        message: "UAT Planned Start Date must be on or after the UAT Handover Date.",
    },
    OrderingRule {
        earlier: DateField::PlannedStart,
        later: DateField::PlannedCompletion,
        message: "UAT Planned Completion must be on or after the UAT Planned Start Date.",
    },
    OrderingRule {
        earlier: DateField::PlannedCompletion,
        later: DateField::PlannedRelease,
        message: "Planned Release Date must be on or after the UAT Planned Completion.",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// The later-dated input, which carries the error marker.
    pub field: DateField,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutcome {
    pub track: Track,
    pub status: Option<ProgressStatus>,
    pub label: Option<&'static str>,
    pub indicator: Indicator,
    /// True when the derived status differs from the stored one.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowReview {
    pub violations: Vec<Violation>,
    pub statuses: Vec<StatusOutcome>,
    /// The row after derived statuses were applied.
    pub row: RowState,
}

impl RowReview {
    pub fn has_errors(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// Every ordering rule whose operands are both present and out of order.
pub fn validate_dates(row: &RowState) -> Vec<Violation> {
    ORDERING_RULES
        .iter()
        .filter_map(|rule| {
            let earlier = row.date(rule.earlier)?;
            let later = row.date(rule.later)?;
            (later < earlier).then(|| Violation {
                field: rule.later,
                message: rule.message.to_string(),
            })
        })
        .collect()
}

/// Planned date in the past while not started → Delayed; planned date in the
/// future → Not Started, whatever was chosen before. Today leaves it alone.
pub fn derive_status(
    current: Option<ProgressStatus>,
    planned: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<ProgressStatus> {
    match planned {
        Some(date) if date < today && current == Some(ProgressStatus::NotStarted) => {
            Some(ProgressStatus::Delayed)
        }
        Some(date) if date > today => Some(ProgressStatus::NotStarted),
        _ => current,
    }
}

pub fn review_row(row: &RowState, today: NaiveDate) -> RowReview {
    let violations = validate_dates(row);
    let mut updated = row.clone();

    let statuses = [Track::Uat, Track::Release]
        .into_iter()
        .map(|track| {
            let current = row.status(track);
            let derived = derive_status(current, row.date(track.driving_date()), today);
            if let Some(status) = derived {
                updated.set_status(track, status);
            }
            StatusOutcome {
                track,
                status: derived,
                label: derived.map(|status| status.label(track)),
                indicator: derived.map_or(Indicator::Active, ProgressStatus::indicator),
                changed: derived != current,
            }
        })
        .collect();

    RowReview {
        violations,
        statuses,
        row: updated,
    }
}

/// Page-level error summary across all rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub visible: bool,
    pub messages: Vec<String>,
}

impl Banner {
    pub fn from_reviews<'a>(reviews: impl IntoIterator<Item = &'a RowReview>) -> Self {
        let messages: Vec<String> = reviews
            .into_iter()
            .flat_map(|review| review.violations.iter().map(|v| v.message.clone()))
            .collect();
        Self {
            visible: !messages.is_empty(),
            messages,
        }
    }

    pub fn text(&self) -> String {
        self.messages.join(" ")
    }
}
