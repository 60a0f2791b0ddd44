use std::{
	io::ErrorKind,
	path::{Path, PathBuf},
	time::SystemTime,
};

use async_trait::async_trait;
use tokio::fs;

use crate::{ArtifactStore, Result};

/// Artifact backend over a local directory tree rooted at `data_dir`.
pub struct LocalFsStore {
	base_dir: PathBuf,
}
impl LocalFsStore {
	pub fn new(base_dir: impl Into<PathBuf>) -> Self {
		Self { base_dir: base_dir.into() }
	}

	fn path_for(&self, key: &str) -> PathBuf {
		// Keys are built from sanitized segments upstream and never contain
		// `..` or separators inside a segment.
		self.base_dir.join(key)
	}
}

#[async_trait]
impl ArtifactStore for LocalFsStore {
	fn provider(&self) -> &'static str {
		clip_config::PROVIDER_LOCAL
	}

	async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
		match fs::read(self.path_for(key)).await {
			Ok(bytes) => Ok(Some(bytes)),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err.into()),
		}
	}

	async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
		let path = self.path_for(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).await?;
		}

		fs::write(path, bytes).await?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<()> {
		match fs::remove_file(self.path_for(key)).await {
			Ok(()) => Ok(()),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
			Err(err) => Err(err.into()),
		}
	}

	async fn list_note_keys(&self, tenant: &str) -> Result<Vec<String>> {
		let mut keys = Vec::new();

		for (year, year_path) in numeric_dirs(&self.base_dir.join(tenant), false).await? {
			for (month, month_path) in numeric_dirs(&year_path, false).await? {
				for (day, day_path) in numeric_dirs(&month_path, false).await? {
					let mut files = json_files(&day_path).await?;

					files.sort_by(|a, b| a.0.cmp(&b.0));

					for (name, _) in files {
						keys.push(format!("{tenant}/{year}/{month}/{day}/{name}"));
					}
				}
			}
		}

		Ok(keys)
	}

	async fn list_note_keys_newest_first(&self, tenant: &str) -> Result<Vec<String>> {
		let mut keys = Vec::new();

		for (year, year_path) in numeric_dirs(&self.base_dir.join(tenant), true).await? {
			for (month, month_path) in numeric_dirs(&year_path, true).await? {
				for (day, day_path) in numeric_dirs(&month_path, true).await? {
					let mut files = json_files(&day_path).await?;

					// Within a date bucket, newest by modification time first.
					files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

					for (name, _) in files {
						keys.push(format!("{tenant}/{year}/{month}/{day}/{name}"));
					}
				}
			}
		}

		Ok(keys)
	}
}

/// Digit-named subdirectories of `path`, sorted by name. A missing directory
/// yields an empty listing.
async fn numeric_dirs(path: &Path, descending: bool) -> Result<Vec<(String, PathBuf)>> {
	let mut entries = match fs::read_dir(path).await {
		Ok(entries) => entries,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
		Err(err) => return Err(err.into()),
	};
	let mut dirs = Vec::new();

	while let Some(entry) = entries.next_entry().await? {
		let Ok(name) = entry.file_name().into_string() else { continue };

		if name.is_empty() || !name.bytes().all(|byte| byte.is_ascii_digit()) {
			continue;
		}
		if entry.file_type().await?.is_dir() {
			dirs.push((name, entry.path()));
		}
	}

	dirs.sort_by(|a, b| if descending { b.0.cmp(&a.0) } else { a.0.cmp(&b.0) });

	Ok(dirs)
}

/// `.json` files directly inside `path`, with their modification times.
async fn json_files(path: &Path) -> Result<Vec<(String, SystemTime)>> {
	let mut entries = match fs::read_dir(path).await {
		Ok(entries) => entries,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
		Err(err) => return Err(err.into()),
	};
	let mut files = Vec::new();

	while let Some(entry) = entries.next_entry().await? {
		let Ok(name) = entry.file_name().into_string() else { continue };

		if !name.ends_with(".json") {
			continue;
		}

		let metadata = entry.metadata().await?;

		if !metadata.is_file() {
			continue;
		}

		let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

		files.push((name, modified));
	}

	Ok(files)
}
