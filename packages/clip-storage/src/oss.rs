use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use quick_xml::{Reader, events::Event};
use reqwest::{Client, Method, StatusCode, header};
use sha1::Sha1;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::{ArtifactStore, Error, Result, is_note_json_key};

type HmacSha1 = Hmac<Sha1>;

const LIST_MAX_KEYS: &str = "1000";
// HTTP-date in the fixed GMT form the OSS signature scheme expects.
const HTTP_DATE: &[FormatItem<'_>] = format_description!(
	"[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Artifact backend over the Aliyun OSS REST API.
///
/// Requests carry the v1 header signature:
/// `Authorization: OSS <access_key_id>:<base64(hmac_sha1(secret, string_to_sign))>`.
pub struct AliyunOssStore {
	client: Client,
	endpoint: String,
	bucket: String,
	prefix: String,
	access_key_id: String,
	access_key_secret: String,
}
impl AliyunOssStore {
	pub fn new(cfg: &clip_config::AliyunOss, client: Client) -> Self {
		Self {
			client,
			endpoint: cfg.endpoint.clone(),
			bucket: cfg.bucket.clone(),
			prefix: cfg.prefix.clone(),
			access_key_id: cfg.access_key_id.clone(),
			access_key_secret: cfg.access_key_secret.clone(),
		}
	}

	fn base_url(&self) -> String {
		match self.endpoint.split_once("://") {
			Some((scheme, host)) => format!("{scheme}://{}.{host}", self.bucket),
			None => format!("https://{}.{}", self.bucket, self.endpoint),
		}
	}

	fn object_url(&self, key: &str) -> String {
		format!("{}/{}{key}", self.base_url(), self.prefix)
	}

	fn sign(&self, string_to_sign: &str) -> Result<String> {
		let mut mac = HmacSha1::new_from_slice(self.access_key_secret.as_bytes())
			.map_err(|err| Error::Sign { message: err.to_string() })?;

		mac.update(string_to_sign.as_bytes());

		Ok(STANDARD.encode(mac.finalize().into_bytes()))
	}

	fn authorization(
		&self,
		method: &Method,
		content_type: &str,
		date: &str,
		resource: &str,
	) -> Result<String> {
		let string_to_sign = string_to_sign(method, content_type, date, resource);
		let signature = self.sign(&string_to_sign)?;

		Ok(format!("OSS {}:{signature}", self.access_key_id))
	}

	async fn send(
		&self,
		method: Method,
		url: &str,
		resource: &str,
		content_type: &str,
		query: &[(&str, &str)],
		body: Option<Vec<u8>>,
	) -> Result<reqwest::Response> {
		let date = OffsetDateTime::now_utc()
			.format(HTTP_DATE)
			.map_err(|err| Error::Sign { message: err.to_string() })?;
		let authorization = self.authorization(&method, content_type, &date, resource)?;
		let mut request = self
			.client
			.request(method, url)
			.query(query)
			.header(header::DATE, date)
			.header(header::AUTHORIZATION, authorization);

		if !content_type.is_empty() {
			request = request.header(header::CONTENT_TYPE, content_type);
		}
		if let Some(body) = body {
			request = request.body(body);
		}

		Ok(request.send().await?)
	}

	async fn list_page(&self, prefix: &str, marker: Option<&str>) -> Result<ListPage> {
		let url = self.base_url();
		let resource = format!("/{}/", self.bucket);
		let mut query = vec![("prefix", prefix), ("max-keys", LIST_MAX_KEYS)];

		if let Some(marker) = marker {
			query.push(("marker", marker));
		}

		let response = self.send(Method::GET, &url, &resource, "", &query, None).await?;

		if !response.status().is_success() {
			return Err(unexpected_status(response).await);
		}

		parse_list_objects(&response.text().await?)
	}

	/// Full listing under the configured prefix + `tenant/`, paginated, with
	/// the prefix stripped so callers see relative keys.
	async fn list_tenant_keys(&self, tenant: &str) -> Result<Vec<String>> {
		let full_prefix = format!("{}{tenant}/", self.prefix);
		let mut keys = Vec::new();
		let mut marker: Option<String> = None;

		loop {
			let page = self.list_page(&full_prefix, marker.as_deref()).await?;
			let truncated = page.truncated;
			let next_marker = page.next_marker.or_else(|| page.keys.last().cloned());

			keys.extend(
				page.keys
					.into_iter()
					.filter_map(|key| key.strip_prefix(&self.prefix).map(str::to_string)),
			);

			if !truncated {
				break;
			}

			match next_marker {
				Some(next) => marker = Some(next),
				None => break,
			}
		}

		Ok(keys)
	}
}

#[async_trait]
impl ArtifactStore for AliyunOssStore {
	fn provider(&self) -> &'static str {
		clip_config::PROVIDER_ALIYUN_OSS
	}

	async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
		let url = self.object_url(key);
		let resource = format!("/{}/{}{key}", self.bucket, self.prefix);
		let response = self.send(Method::GET, &url, &resource, "", &[], None).await?;

		match response.status() {
			StatusCode::NOT_FOUND => Ok(None),
			status if status.is_success() => Ok(Some(response.bytes().await?.to_vec())),
			_ => Err(unexpected_status(response).await),
		}
	}

	async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
		let url = self.object_url(key);
		let resource = format!("/{}/{}{key}", self.bucket, self.prefix);
		let response = self
			.send(Method::PUT, &url, &resource, content_type, &[], Some(bytes.to_vec()))
			.await?;

		if !response.status().is_success() {
			return Err(unexpected_status(response).await);
		}

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<()> {
		let url = self.object_url(key);
		let resource = format!("/{}/{}{key}", self.bucket, self.prefix);
		let response = self.send(Method::DELETE, &url, &resource, "", &[], None).await?;

		match response.status() {
			StatusCode::NOT_FOUND => Ok(()),
			status if status.is_success() => Ok(()),
			_ => Err(unexpected_status(response).await),
		}
	}

	async fn list_note_keys(&self, tenant: &str) -> Result<Vec<String>> {
		let keys = self.list_tenant_keys(tenant).await?;

		Ok(keys.into_iter().filter(|key| is_note_json_key(key, tenant)).collect())
	}

	async fn list_note_keys_newest_first(&self, tenant: &str) -> Result<Vec<String>> {
		let mut keys = self.list_note_keys(tenant).await?;

		// Listing order is lexicographic by key; reversed this puts later
		// calendar dates first.
		keys.reverse();

		Ok(keys)
	}
}

fn string_to_sign(method: &Method, content_type: &str, date: &str, resource: &str) -> String {
	// VERB \n Content-MD5 \n Content-Type \n Date \n CanonicalizedResource.
	// No Content-MD5 and no x-oss-* headers are used.
	format!("{method}\n\n{content_type}\n{date}\n{resource}")
}

async fn unexpected_status(response: reqwest::Response) -> Error {
	let status = response.status().as_u16();
	let message = match response.text().await {
		Ok(text) => text.chars().take(500).collect(),
		Err(err) => err.to_string(),
	};

	Error::UnexpectedStatus { status, message }
}

struct ListPage {
	keys: Vec<String>,
	next_marker: Option<String>,
	truncated: bool,
}

fn parse_list_objects(xml: &str) -> Result<ListPage> {
	#[derive(Clone, Copy, PartialEq, Eq)]
	enum Field {
		Key,
		NextMarker,
		IsTruncated,
	}

	let mut reader = Reader::from_str(xml);
	let mut page = ListPage { keys: Vec::new(), next_marker: None, truncated: false };
	let mut current = None;

	loop {
		match reader.read_event() {
			Err(err) => return Err(Error::Listing { message: err.to_string() }),
			Ok(Event::Eof) => break,
			Ok(Event::Start(tag)) => {
				current = match tag.name().as_ref() {
					b"Key" => Some(Field::Key),
					b"NextMarker" => Some(Field::NextMarker),
					b"IsTruncated" => Some(Field::IsTruncated),
					_ => None,
				};
			},
			Ok(Event::Text(text)) => {
				let value = text
					.unescape()
					.map_err(|err| Error::Listing { message: err.to_string() })?
					.trim()
					.to_string();

				match current {
					Some(Field::Key) => page.keys.push(value),
					Some(Field::NextMarker) if !value.is_empty() =>
						page.next_marker = Some(value),
					Some(Field::IsTruncated) => page.truncated = value == "true",
					_ => {},
				}
			},
			Ok(Event::End(_)) => current = None,
			Ok(_) => {},
		}
	}

	Ok(page)
}
