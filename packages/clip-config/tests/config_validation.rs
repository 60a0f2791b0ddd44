use clip_config::{Config, Error};

const SAMPLE_LOCAL: &str = r#"
[service]
http_bind = "127.0.0.1:8000"
log_level = "info"

[security]
api_tokens = ["dev-token-please-change"]
default_tenant = "localdev"

[storage]
provider = "local"

[storage.local]
data_dir = "./data"
"#;

const SAMPLE_OSS: &str = r#"
[service]
http_bind = "127.0.0.1:8000"

[security]
api_tokens = ["dev-token-please-change"]

[storage]
provider = "aliyun_oss"

[storage.oss]
endpoint = "oss-cn-hangzhou.aliyuncs.com"
access_key_id = "ak"
access_key_secret = "sk"
bucket = "notes"
prefix = "clipnotes"
"#;

fn parse(raw: &str) -> Config {
	let mut cfg: Config = toml::from_str(raw).expect("Failed to parse sample config.");

	clip_config::normalize(&mut cfg);

	cfg
}

#[test]
fn local_sample_validates() {
	let cfg = parse(SAMPLE_LOCAL);

	assert!(clip_config::validate(&cfg).is_ok());
	assert_eq!(cfg.security.default_tenant, "localdev");
}

#[test]
fn oss_sample_validates_and_prefix_is_normalized() {
	let cfg = parse(SAMPLE_OSS);

	assert!(clip_config::validate(&cfg).is_ok());
	assert_eq!(cfg.storage.oss.as_ref().unwrap().prefix, "clipnotes/");
}

#[test]
fn defaults_are_applied() {
	let cfg = parse(SAMPLE_OSS);

	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.security.default_tenant, "localdev");
}

#[test]
fn unknown_provider_is_rejected() {
	let cfg = parse(&SAMPLE_LOCAL.replace("provider = \"local\"", "provider = \"s3\""));

	assert!(matches!(clip_config::validate(&cfg), Err(Error::Validation { .. })));
}

#[test]
fn empty_api_tokens_are_rejected() {
	let cfg = parse(&SAMPLE_LOCAL.replace(
		"api_tokens = [\"dev-token-please-change\"]",
		"api_tokens = []",
	));

	assert!(matches!(clip_config::validate(&cfg), Err(Error::Validation { .. })));
}

#[test]
fn oss_provider_requires_credentials() {
	let cfg = parse(&SAMPLE_OSS.replace("access_key_id = \"ak\"", "access_key_id = \"\""));

	assert!(matches!(clip_config::validate(&cfg), Err(Error::Validation { .. })));
}

#[test]
fn local_provider_requires_data_dir_section() {
	let raw = SAMPLE_LOCAL.replace("[storage.local]\ndata_dir = \"./data\"", "");
	let cfg = parse(&raw);

	assert!(matches!(clip_config::validate(&cfg), Err(Error::Validation { .. })));
}
