mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AliyunOss, Config, LocalFs, McpContext, PROVIDER_ALIYUN_OSS, PROVIDER_LOCAL, Security, Service,
	Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn normalize(cfg: &mut Config) {
	if let Some(oss) = cfg.storage.oss.as_mut() {
		let trimmed = oss.prefix.trim().trim_matches('/');

		oss.prefix = if trimmed.is_empty() { String::new() } else { format!("{trimmed}/") };
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.security.api_tokens.is_empty()
		|| cfg.security.api_tokens.iter().any(|token| token.trim().is_empty())
	{
		return Err(Error::Validation {
			message: "security.api_tokens must contain at least one non-empty token.".to_string(),
		});
	}
	if cfg.security.default_tenant.trim().is_empty() {
		return Err(Error::Validation {
			message: "security.default_tenant must be non-empty.".to_string(),
		});
	}

	match cfg.storage.provider.as_str() {
		PROVIDER_LOCAL => {
			let Some(local) = cfg.storage.local.as_ref() else {
				return Err(Error::Validation {
					message: "storage.local is required when storage.provider is local."
						.to_string(),
				});
			};

			if local.data_dir.as_os_str().is_empty() {
				return Err(Error::Validation {
					message: "storage.local.data_dir must be non-empty.".to_string(),
				});
			}
		},
		PROVIDER_ALIYUN_OSS => {
			let Some(oss) = cfg.storage.oss.as_ref() else {
				return Err(Error::Validation {
					message: "storage.oss is required when storage.provider is aliyun_oss."
						.to_string(),
				});
			};

			for (label, value) in [
				("endpoint", &oss.endpoint),
				("access_key_id", &oss.access_key_id),
				("access_key_secret", &oss.access_key_secret),
				("bucket", &oss.bucket),
			] {
				if value.trim().is_empty() {
					return Err(Error::Validation {
						message: format!("storage.oss.{label} must be non-empty."),
					});
				}
			}
		},
		other => {
			return Err(Error::Validation {
				message: format!(
					"storage.provider must be one of local or aliyun_oss, got {other}."
				),
			});
		},
	}

	if let Some(mcp) = cfg.mcp.as_ref() {
		for (label, value) in [
			("bind", &mcp.bind),
			("api_base", &mcp.api_base),
			("api_token", &mcp.api_token),
			("tenant", &mcp.tenant),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation {
					message: format!("mcp.{label} must be non-empty."),
				});
			}
		}
	}

	Ok(())
}
