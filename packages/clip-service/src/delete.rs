use clip_domain::sanitize;
use clip_storage::JSON_EXT;

use crate::{NoteStore, Result};

impl NoteStore {
	/// Removes every JSON/Markdown artifact pair whose basename matches the
	/// sanitized `id`. Scans the whole tenant tree rather than computing a
	/// path, since an id can legitimately exist under more than one date
	/// bucket. Returns whether anything was removed.
	pub async fn delete(&self, id: &str) -> Result<bool> {
		let id = sanitize::sanitize_identifier(id, sanitize::IDENTIFIER_MAX_CHARS);
		let keys = self.backend.list_note_keys(&self.tenant).await?;
		let mut found = false;

		for key in keys {
			let stem = key
				.rsplit('/')
				.next()
				.and_then(|name| name.strip_suffix(JSON_EXT))
				.and_then(|name| name.strip_suffix('.'));

			if stem != Some(id.as_str()) {
				continue;
			}

			// Removing half of an already-partially-deleted pair is fine; the
			// backend treats missing objects as deleted.
			self.backend.delete(&key).await?;

			let markdown_key = format!("{}md", &key[..key.len() - JSON_EXT.len()]);

			self.backend.delete(&markdown_key).await?;

			found = true;
		}

		if found {
			tracing::info!(tenant = %self.tenant, %id, "Note deleted.");
		} else {
			tracing::warn!(tenant = %self.tenant, %id, "Delete found no matching note.");
		}

		Ok(found)
	}
}
