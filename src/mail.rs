use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
	pub subject: String,
	pub body: String,
}

/// Company name -> draft. Ordered only so the backup file diffs cleanly.
pub type DraftStore = BTreeMap<String, Draft>;

/// A missing backup is an empty store; anything else that goes wrong is an error.
pub fn load_backup(path: &Path) -> Result<DraftStore> {
	let raw = match std::fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DraftStore::new()),
		Err(e) => return Err(e).with_context(|| format!("Failed to read backup file {}", path.display())),
	};
	serde_json::from_str(&raw).with_context(|| format!("Backup file {} is not a company -> draft JSON object", path.display()))
}

/// Overwrites `path` with the whole store, pretty-printed with 2-space indentation.
pub fn save_backup(path: &Path, store: &DraftStore) -> Result<()> {
	let mut json = serde_json::to_string_pretty(store)?;
	json.push('\n');
	std::fs::write(path, json).with_context(|| format!("Failed to write backup file {}", path.display()))
}

/// Companies still lacking a draft, in input order, without blanks or repeats.
pub fn pending_companies<S: AsRef<str>>(companies: &[S], store: &DraftStore) -> Vec<String> {
	let mut seen = HashSet::new();
	companies
		.iter()
		.map(|c| c.as_ref().trim())
		.filter(|c| !c.is_empty() && !store.contains_key(*c) && seen.insert(*c))
		.map(str::to_string)
		.collect()
}
