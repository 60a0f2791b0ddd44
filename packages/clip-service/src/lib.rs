pub mod delete;
pub mod list;
pub mod markdown;
pub mod save;
pub mod search;

mod error;
mod index;

pub use error::{Error, Result};

use time::OffsetDateTime;

use clip_config::{Config, PROVIDER_ALIYUN_OSS, PROVIDER_LOCAL};
use clip_domain::sanitize::{self, TENANT_MAX_CHARS};
use clip_storage::{AliyunOssStore, ArtifactStore, LocalFsStore};

pub const MAX_CONTENT_CHARS: usize = 100_000;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_CHARS: usize = 50;
pub const MAX_TOPIC_CHARS: usize = 200;
pub const MAX_CONTEXT_MESSAGES: usize = 10;
/// How many keywords to auto-extract when the caller supplies no tags.
pub const KEYWORD_TAG_COUNT: usize = 5;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// Tenant-scoped note store over one of the artifact backends.
///
/// Constructed per request; the backend choice affects only the durability
/// medium and enumeration mechanics, never the dedup/title/tag policy.
pub struct NoteStore {
	tenant: String,
	backend: Box<dyn ArtifactStore>,
}
impl NoteStore {
	/// Selects the backend named by `cfg.storage.provider` and scopes it to
	/// the sanitized `tenant`.
	pub fn open(cfg: &Config, client: &reqwest::Client, tenant: &str) -> Result<Self> {
		let tenant = sanitize::sanitize_tenant(tenant, TENANT_MAX_CHARS);
		let backend: Box<dyn ArtifactStore> = match cfg.storage.provider.as_str() {
			PROVIDER_LOCAL => {
				let local = cfg.storage.local.as_ref().ok_or_else(|| Error::Storage {
					message: "storage.local is not configured.".to_string(),
				})?;

				Box::new(LocalFsStore::new(&local.data_dir))
			},
			PROVIDER_ALIYUN_OSS => {
				let oss = cfg.storage.oss.as_ref().ok_or_else(|| Error::Storage {
					message: "storage.oss is not configured.".to_string(),
				})?;

				Box::new(AliyunOssStore::new(oss, client.clone()))
			},
			other => return Err(Error::UnknownProvider { provider: other.to_string() }),
		};

		Ok(Self { tenant, backend })
	}

	pub fn tenant(&self) -> &str {
		&self.tenant
	}

	pub fn provider(&self) -> &'static str {
		self.backend.provider()
	}
}

/// Relative artifact key for a note saved at `at` (UTC calendar date).
fn note_key(tenant: &str, at: OffsetDateTime, id: &str, ext: &str) -> String {
	format!(
		"{tenant}/{:04}/{:02}/{:02}/{id}.{ext}",
		at.year(),
		u8::from(at.month()),
		at.day(),
	)
}
