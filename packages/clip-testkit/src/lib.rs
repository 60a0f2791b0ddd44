mod error;

pub use error::{Error, Result};

use std::path::Path;

use tempfile::TempDir;

use clip_config::{Config, LocalFs, PROVIDER_LOCAL, Security, Service, Storage};
use clip_service::NoteStore;

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_DEFAULT_TENANT: &str = "localdev";

/// A local-backend store rooted in a fresh temp directory. The directory is
/// removed when the value is dropped.
pub struct TestStore {
	dir: TempDir,
	cfg: Config,
	client: reqwest::Client,
}
impl TestStore {
	pub fn new() -> Result<Self> {
		let dir = tempfile::tempdir()?;
		let cfg = Config {
			service: Service {
				http_bind: "127.0.0.1:0".to_string(),
				log_level: "info".to_string(),
			},
			security: Security {
				api_tokens: vec![TEST_TOKEN.to_string()],
				default_tenant: TEST_DEFAULT_TENANT.to_string(),
			},
			storage: Storage {
				provider: PROVIDER_LOCAL.to_string(),
				local: Some(LocalFs { data_dir: dir.path().to_path_buf() }),
				oss: None,
			},
			mcp: None,
		};

		Ok(Self { dir, cfg, client: reqwest::Client::new() })
	}

	pub fn config(&self) -> &Config {
		&self.cfg
	}

	pub fn client(&self) -> &reqwest::Client {
		&self.client
	}

	pub fn data_dir(&self) -> &Path {
		self.dir.path()
	}

	pub fn open(&self, tenant: &str) -> clip_service::Result<NoteStore> {
		NoteStore::open(&self.cfg, &self.client, tenant)
	}
}
