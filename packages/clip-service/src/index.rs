use std::collections::BTreeMap;

use crate::{JSON_CONTENT_TYPE, NoteStore, Result};

/// Per-tenant mapping from dedup fingerprint to note id. Used only to
/// short-circuit duplicate saves; listing and search never consult it.
pub(crate) type DedupIndex = BTreeMap<String, String>;

fn index_key(tenant: &str) -> String {
	format!("{tenant}/index/dedup_index.json")
}

impl NoteStore {
	/// A missing or malformed index degrades to an empty one; dedup history is
	/// dropped but the save itself proceeds. Transient storage errors still
	/// propagate.
	pub(crate) async fn load_dedup_index(&self) -> Result<DedupIndex> {
		let Some(bytes) = self.backend.get(&index_key(&self.tenant)).await? else {
			return Ok(DedupIndex::new());
		};

		match serde_json::from_slice(&bytes) {
			Ok(index) => Ok(index),
			Err(err) => {
				tracing::warn!(
					tenant = %self.tenant,
					error = %err,
					"Dedup index is malformed; treating it as empty.",
				);

				Ok(DedupIndex::new())
			},
		}
	}

	pub(crate) async fn store_dedup_index(&self, index: &DedupIndex) -> Result<()> {
		let bytes = serde_json::to_vec_pretty(index)?;

		self.backend.put(&index_key(&self.tenant), &bytes, JSON_CONTENT_TYPE).await?;

		Ok(())
	}
}
