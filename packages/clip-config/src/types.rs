use std::path::PathBuf;

use serde::Deserialize;

pub const PROVIDER_LOCAL: &str = "local";
pub const PROVIDER_ALIYUN_OSS: &str = "aliyun_oss";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub security: Security,
	pub storage: Storage,
	pub mcp: Option<McpContext>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Security {
	pub api_tokens: Vec<String>,
	#[serde(default = "default_tenant")]
	pub default_tenant: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub provider: String,
	pub local: Option<LocalFs>,
	pub oss: Option<AliyunOss>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LocalFs {
	pub data_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AliyunOss {
	pub endpoint: String,
	pub access_key_id: String,
	pub access_key_secret: String,
	pub bucket: String,
	#[serde(default = "default_oss_prefix")]
	pub prefix: String,
}

/// Context for the MCP adapter. It forwards tool calls to the HTTP API on
/// behalf of a single configured tenant.
#[derive(Clone, Debug, Deserialize)]
pub struct McpContext {
	pub bind: String,
	pub api_base: String,
	pub api_token: String,
	pub tenant: String,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_tenant() -> String {
	"localdev".to_string()
}

fn default_oss_prefix() -> String {
	"clipnotes/".to_string()
}
