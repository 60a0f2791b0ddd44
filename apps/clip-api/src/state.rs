use std::sync::Arc;

use clip_config::Config;
use clip_service::NoteStore;

#[derive(Clone)]
pub struct AppState {
	pub cfg: Arc<Config>,
	pub http: reqwest::Client,
}
impl AppState {
	pub fn new(cfg: Config) -> Self {
		Self { cfg: Arc::new(cfg), http: reqwest::Client::new() }
	}

	/// Stores are cheap to open; one is built per request so tenants never
	/// share a handle.
	pub fn store_for(&self, tenant: &str) -> clip_service::Result<NoteStore> {
		NoteStore::open(&self.cfg, &self.http, tenant)
	}
}
