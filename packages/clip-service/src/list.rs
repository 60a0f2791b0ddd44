use clip_domain::Note;

use crate::{NoteStore, Result};

impl NoteStore {
	/// Up to `limit` notes, newest first per the backend's enumeration
	/// semantics. Malformed records are skipped with a warning.
	pub async fn list_recent(&self, limit: usize) -> Result<Vec<Note>> {
		let keys = self.backend.list_note_keys_newest_first(&self.tenant).await?;
		let mut items = Vec::new();

		for key in keys {
			if items.len() >= limit {
				break;
			}
			if let Some(note) = self.read_note(&key).await? {
				items.push(note);
			}
		}

		Ok(items)
	}

	/// Reads and parses one persisted record. Malformed or vanished records
	/// yield `None` so scans can continue.
	pub(crate) async fn read_note(&self, key: &str) -> Result<Option<Note>> {
		let Some(bytes) = self.backend.get(key).await? else {
			tracing::warn!(key, "Note artifact vanished during scan.");

			return Ok(None);
		};

		match serde_json::from_slice(&bytes) {
			Ok(note) => Ok(Some(note)),
			Err(err) => {
				tracing::warn!(key, error = %err, "Skipping malformed note record.");

				Ok(None)
			},
		}
	}
}
