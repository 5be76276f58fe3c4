use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::field::{FieldCatalog, STATUS_FIELD, names_match};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub ticket_key: String,
    pub changes: BTreeMap<String, Value>,
}

/// One workflow transition Jira currently offers for an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCandidate {
    pub id: String,
    pub name: String,
}

/// A change set split into direct field writes and at most one workflow move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedChanges {
    /// Keyed by remote field id.
    pub field_writes: Map<String, Value>,
    pub transition: Option<String>,
}

pub fn is_status_field(name: &str) -> bool {
    names_match(name.trim(), STATUS_FIELD)
}

pub fn classify(
    changes: &BTreeMap<String, Value>,
    catalog: &FieldCatalog,
) -> AppResult<ClassifiedChanges> {
    let mut classified = ClassifiedChanges::default();

    for (name, value) in changes {
        if is_status_field(name) {
            if classified.transition.is_some() {
                return Err(AppError::BadRequest(
                    "only one status change is allowed per update".to_string(),
                ));
            }
            let target = value.as_str().map(str::trim).ok_or_else(|| {
                AppError::BadRequest(format!("status must be a string, got {value}"))
            })?;
            classified.transition = Some(target.to_string());
        } else {
            if let Some(entry) = catalog
                .by_logical_name(name.trim())
                .filter(|entry| !entry.editable)
            {
                return Err(AppError::BadRequest(format!(
                    "'{}' is read-only",
                    entry.logical_name
                )));
            }
            classified
                .field_writes
                .insert(catalog.remote_id_for(name), value.clone());
        }
    }

    Ok(classified)
}

/// Case-insensitive lookup of the requested status among live transitions.
pub fn find_transition<'a>(
    candidates: &'a [TransitionCandidate],
    requested: &str,
) -> Option<&'a TransitionCandidate> {
    let requested = requested.trim();
    candidates
        .iter()
        .find(|candidate| names_match(candidate.name.trim(), requested))
}
