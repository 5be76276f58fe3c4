use serde::{Deserialize, Serialize};

/// Logical name of the workflow status column.
pub const STATUS_FIELD: &str = "status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Date,
    StatusEnum,
}

/// Static description of one dashboard column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub logical_name: &'static str,
    pub remote_name: &'static str,
    pub editable: bool,
    pub kind: FieldKind,
    pub allowed_values: &'static [&'static str],
}

const fn column(
    logical_name: &'static str,
    remote_name: &'static str,
    editable: bool,
    kind: FieldKind,
) -> ColumnSpec {
    ColumnSpec {
        logical_name,
        remote_name,
        editable,
        kind,
        allowed_values: &[],
    }
}

pub const UAT_STATUS_OPTIONS: &[&str] = &["Not Started", "In Progress", "Signed-off", "Delayed"];
pub const RELEASE_STATUS_OPTIONS: &[&str] = &["Not Started", "In Progress", "Released", "Delayed"];

pub const ITEM_KEY: &str = "Item#";
pub const HANDOVER_DATE: &str = "UAT Handover Date";
pub const PLANNED_START: &str = "UAT Planned Start Date";
pub const PLANNED_COMPLETION: &str = "UAT Planned Completion";
pub const PLANNED_RELEASE: &str = "Planned Release Date";
pub const UAT_STATUS: &str = "UAT Status";
pub const RELEASE_STATUS: &str = "Release Status";

pub const DASHBOARD_COLUMNS: &[ColumnSpec] = &[
    column(ITEM_KEY, "key", false, FieldKind::Text),
    column("Title", "summary", true, FieldKind::Text),
    column("Status", STATUS_FIELD, true, FieldKind::StatusEnum),
    // Jira's due date doubles as the UAT handover date.
    column(HANDOVER_DATE, "duedate", true, FieldKind::Date),
    column(PLANNED_START, PLANNED_START, true, FieldKind::Date),
    column(PLANNED_COMPLETION, PLANNED_COMPLETION, true, FieldKind::Date),
    ColumnSpec {
        allowed_values: UAT_STATUS_OPTIONS,
        ..column(UAT_STATUS, UAT_STATUS, true, FieldKind::StatusEnum)
    },
    column(PLANNED_RELEASE, PLANNED_RELEASE, true, FieldKind::Date),
    ColumnSpec {
        allowed_values: RELEASE_STATUS_OPTIONS,
        ..column(RELEASE_STATUS, RELEASE_STATUS, true, FieldKind::StatusEnum)
    },
    column("Created", "created", false, FieldKind::Date),
    column("Labels", "labels", false, FieldKind::Text),
    column("Reporter", "reporter", false, FieldKind::Text),
];

/// Directory entries exposed to the dashboard besides its own columns.
const SUPPORTING_FIELDS: &[&str] = &["issuetype", "project", "assignee"];

/// Every remote name the dashboard needs. The issue key is implicit in search results.
pub fn required_remote_names() -> Vec<&'static str> {
    DASHBOARD_COLUMNS
        .iter()
        .map(|column| column.remote_name)
        .filter(|name| *name != "key")
        .chain(SUPPORTING_FIELDS.iter().copied())
        .collect()
}

/// Case-insensitive name comparison that folds every letter, not only ASCII.
pub fn names_match(left: &str, right: &str) -> bool {
    left == right || left.to_lowercase() == right.to_lowercase()
}

/// One `{id, name}` descriptor from Jira's field directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteField {
    pub id: String,
    pub name: String,
}

impl RemoteField {
    fn matches(&self, remote_name: &str) -> bool {
        names_match(&self.name, remote_name) || self.id == remote_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCatalogEntry {
    pub logical_name: String,
    pub remote_id: String,
    pub editable: bool,
    pub kind: FieldKind,
    pub allowed_values: Vec<String>,
    /// False when no directory entry matched and the remote name is used verbatim.
    pub resolved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldCatalog {
    entries: Vec<FieldCatalogEntry>,
}

impl FieldCatalog {
    pub fn entries(&self) -> &[FieldCatalogEntry] {
        &self.entries
    }

    pub fn by_logical_name(&self, logical_name: &str) -> Option<&FieldCatalogEntry> {
        self.entries
            .iter()
            .find(|entry| names_match(&entry.logical_name, logical_name))
    }

    /// Maps a dashboard-facing name to the id Jira expects. Names that are already
    /// remote ids, or unknown to the catalog, pass through unchanged.
    pub fn remote_id_for(&self, name: &str) -> String {
        self.by_logical_name(name)
            .map(|entry| entry.remote_id.clone())
            .unwrap_or_else(|| name.to_string())
    }

    /// Remote ids to request from search, in column order, without duplicates.
    pub fn search_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if entry.remote_id != "key" && !fields.contains(&entry.remote_id) {
                fields.push(entry.remote_id.clone());
            }
        }
        fields
    }
}

/// Resolves each column's remote name against the fetched directory.
pub fn resolve_catalog(directory: &[RemoteField], columns: &[ColumnSpec]) -> FieldCatalog {
    let entries = columns
        .iter()
        .map(|column| {
            let matched = directory.iter().find(|field| field.matches(column.remote_name));
            FieldCatalogEntry {
                logical_name: column.logical_name.to_string(),
                remote_id: matched
                    .map(|field| field.id.clone())
                    .unwrap_or_else(|| column.remote_name.to_string()),
                editable: column.editable,
                kind: column.kind,
                allowed_values: column
                    .allowed_values
                    .iter()
                    .map(|value| value.to_string())
                    .collect(),
                resolved: matched.is_some(),
            }
        })
        .collect();

    FieldCatalog { entries }
}

/// Directory entries the dashboard cares about, in directory order.
pub fn filter_directory(directory: Vec<RemoteField>, remote_names: &[&str]) -> Vec<RemoteField> {
    directory
        .into_iter()
        .filter(|field| remote_names.iter().any(|name| field.matches(name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: &str, name: &str) -> RemoteField {
        RemoteField {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn directory() -> Vec<RemoteField> {
        vec![
            field("summary", "Summary"),
            field("status", "Status"),
            field("duedate", "Due date"),
            field("customfield_10041", "uat planned start date"),
            field("customfield_10042", "UAT Planned Completion"),
            field("customfield_10050", "UAT Status"),
            field("customfield_10099", "Story Points"),
        ]
    }

    #[test]
    fn resolves_custom_fields_case_insensitively() {
        let catalog = resolve_catalog(&directory(), DASHBOARD_COLUMNS);
        let start = catalog.by_logical_name(PLANNED_START).expect("start column");
        assert_eq!(start.remote_id, "customfield_10041");
        assert!(start.resolved);
        assert_eq!(catalog.remote_id_for("uat status"), "customfield_10050");
    }

    #[test]
    fn folds_non_ascii_letters_when_matching_names() {
        let catalog = resolve_catalog(
            &[field("customfield_10070", "FREIGABEDATUM ÄNDERUNG")],
            &[column("Freigabedatum Änderung", "freigabedatum änderung", true, FieldKind::Date)],
        );
        assert_eq!(
            catalog.remote_id_for("freigabedatum ÄNDERUNG"),
            "customfield_10070"
        );
        assert!(names_match("Überprüfung", "überprüfung"));
        assert!(!names_match("Überprüfung", "Uberprufung"));
    }

    #[test]
    fn matches_standard_fields_by_id() {
        let catalog = resolve_catalog(&directory(), DASHBOARD_COLUMNS);
        let handover = catalog.by_logical_name(HANDOVER_DATE).expect("handover");
        assert_eq!(handover.remote_id, "duedate");
        assert_eq!(handover.kind, FieldKind::Date);
    }

    #[test]
    fn unresolved_fields_fall_back_to_remote_name() {
        let catalog = resolve_catalog(&directory(), DASHBOARD_COLUMNS);
        let release = catalog.by_logical_name(PLANNED_RELEASE).expect("release");
        assert_eq!(release.remote_id, "Planned Release Date");
        assert!(!release.resolved);
        assert_eq!(catalog.remote_id_for("Unknown Column"), "Unknown Column");
    }

    #[test]
    fn status_enum_columns_carry_allowed_values() {
        let catalog = resolve_catalog(&[], DASHBOARD_COLUMNS);
        let release = catalog.by_logical_name(RELEASE_STATUS).expect("release status");
        assert_eq!(
            release.allowed_values,
            vec!["Not Started", "In Progress", "Released", "Delayed"]
        );
    }

    #[test]
    fn search_fields_skip_key_and_duplicates() {
        let catalog = resolve_catalog(&directory(), DASHBOARD_COLUMNS);
        let fields = catalog.search_fields();
        assert!(!fields.contains(&"key".to_string()));
        assert_eq!(fields[0], "summary");
        assert!(fields.contains(&"customfield_10042".to_string()));
        let unique: std::collections::BTreeSet<_> = fields.iter().collect();
        assert_eq!(unique.len(), fields.len());
    }

    #[test]
    fn filters_directory_to_required_names() {
        let filtered = filter_directory(directory(), &required_remote_names());
        let ids: Vec<_> = filtered.iter().map(|field| field.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "summary",
                "status",
                "duedate",
                "customfield_10041",
                "customfield_10042",
                "customfield_10050"
            ]
        );
    }
}
