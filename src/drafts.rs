use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::config_directory;
use crate::error::{AppError, AppResult};

const DRAFTS_FILE_NAME: &str = "drafts.json";

#[derive(Default, Serialize, Deserialize)]
struct DraftFile {
    entries: Vec<DraftEntry>,
}

#[derive(Serialize, Deserialize, Clone)]
struct DraftEntry {
    key: String,
    values: BTreeMap<String, String>,
}

/// Unsaved dashboard edits per ticket, most recently touched last.
pub struct DraftStore {
    file_path: PathBuf,
    file: DraftFile,
    limit: usize,
}

impl DraftStore {
    pub fn load(limit: usize) -> AppResult<Self> {
        Self::load_from(config_directory()?.join(DRAFTS_FILE_NAME), limit)
    }

    pub fn load_from(path: PathBuf, limit: usize) -> AppResult<Self> {
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<DraftFile>(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid drafts file: {err}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => DraftFile::default(),
            Err(err) => return Err(AppError::Io(err)),
        };

        Ok(Self {
            file_path: path,
            file,
            limit: limit.max(1),
        })
    }

    pub fn get(&self, key: &str) -> BTreeMap<String, String> {
        self.file
            .entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.values.clone())
            .unwrap_or_default()
    }

    /// Sets one column of a ticket's draft; the last write wins.
    pub fn set(&mut self, key: &str, column: &str, value: &str) -> BTreeMap<String, String> {
        let mut values = self.get(key);
        values.insert(column.to_string(), value.to_string());
        self.file.entries.retain(|entry| entry.key != key);
        self.file.entries.push(DraftEntry {
            key: key.to_string(),
            values: values.clone(),
        });

        if self.file.entries.len() > self.limit {
            let overflow = self.file.entries.len() - self.limit;
            self.file.entries.drain(0..overflow);
        }
        values
    }

    pub fn clear(&mut self, key: &str) -> bool {
        let before = self.file.entries.len();
        self.file.entries.retain(|entry| entry.key != key);
        before != self.file.entries.len()
    }

    pub fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.file)
            .map_err(|err| AppError::Configuration(format!("failed to write drafts: {err}")))?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }
}
