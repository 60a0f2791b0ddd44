pub mod local;
pub mod oss;

mod error;

pub use error::{Error, Result};
pub use local::LocalFsStore;
pub use oss::AliyunOssStore;

use async_trait::async_trait;

pub const JSON_EXT: &str = "json";
pub const MARKDOWN_EXT: &str = "md";

/// Raw artifact backend shared by the filesystem and the object store.
///
/// Keys are relative: `<tenant>/<YYYY>/<MM>/<DD>/<id>.json` (or `.md`) for
/// note artifacts and `<tenant>/index/dedup_index.json` for the per-tenant
/// dedup index. Backends only move bytes; every business decision (dedup,
/// titles, tags, rendering) lives above this trait so both backends apply the
/// exact same policy.
#[async_trait]
pub trait ArtifactStore
where
	Self: Send + Sync,
{
	fn provider(&self) -> &'static str;

	async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

	async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

	/// Deleting a missing object is not an error.
	async fn delete(&self, key: &str) -> Result<()>;

	/// All `.json` note keys under the tenant's date tree, in backend
	/// enumeration order. The dedup index is never included.
	async fn list_note_keys(&self, tenant: &str) -> Result<Vec<String>>;

	/// Note keys newest-first. The filesystem backend walks calendar
	/// directories descending and orders by modification time within a day;
	/// the object store reverses its full listing. The two orderings are not
	/// guaranteed identical when several notes share a date bucket.
	async fn list_note_keys_newest_first(&self, tenant: &str) -> Result<Vec<String>>;
}

/// Whether a relative key names a note JSON artifact of `tenant`, i.e. sits in
/// the `<tenant>/<YYYY>/<MM>/<DD>/` tree with a `.json` extension.
pub fn is_note_json_key(key: &str, tenant: &str) -> bool {
	let Some(rest) = key.strip_prefix(tenant).and_then(|rest| rest.strip_prefix('/')) else {
		return false;
	};
	let segments = rest.split('/').collect::<Vec<_>>();

	if segments.len() != 4 {
		return false;
	}
	if !segments[..3]
		.iter()
		.all(|segment| !segment.is_empty() && segment.bytes().all(|byte| byte.is_ascii_digit()))
	{
		return false;
	}

	segments[3].strip_suffix(".json").is_some_and(|stem| !stem.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn note_json_keys_are_recognized() {
		assert!(is_note_json_key("alice/2024/01/01/abc-202401011000.json", "alice"));
		assert!(!is_note_json_key("alice/2024/01/01/abc.md", "alice"));
		assert!(!is_note_json_key("alice/index/dedup_index.json", "alice"));
		assert!(!is_note_json_key("bob/2024/01/01/abc.json", "alice"));
		assert!(!is_note_json_key("alice/2024/01/abc.json", "alice"));
		assert!(!is_note_json_key("alice/2024/01/01/.json", "alice"));
	}
}
