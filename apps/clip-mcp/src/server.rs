use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use color_eyre::Result;
use reqwest::{Client, RequestBuilder, StatusCode};
use rmcp::{
	ErrorData, ServerHandler,
	handler::server::router::tool::ToolRouter,
	model::{CallToolResult, Content, JsonObject, ServerCapabilities, ServerInfo},
	transport::streamable_http_server::{
		StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
	},
};
use serde_json::Value;
use tokio::net::TcpListener;

use clip_config::McpContext;

const HEADER_AUTHORIZATION: &str = "Authorization";
const HEADER_USER_ID: &str = "X-User-Id";

/// Titles are cut down to this many characters in save receipts.
const RECEIPT_TITLE_CHARS: usize = 60;

#[derive(Clone)]
struct ClipMcp {
	api_base: String,
	api_token: String,
	tenant: String,
	client: Client,
	tool_router: ToolRouter<Self>,
}
impl ClipMcp {
	fn new(api_base: String, api_token: String, tenant: String) -> Self {
		Self { api_base, api_token, tenant, client: Client::new(), tool_router: Self::tool_router() }
	}

	fn apply_context_headers(&self, builder: RequestBuilder) -> RequestBuilder {
		builder
			.header(HEADER_AUTHORIZATION, format!("Bearer {}", self.api_token))
			.header(HEADER_USER_ID, self.tenant.as_str())
	}

	async fn forward_post(&self, path: &str, body: Value) -> Result<(StatusCode, Value), ErrorData> {
		let url = format!("{}{}", self.api_base, path);
		let response = self
			.apply_context_headers(self.client.post(url).json(&body))
			.send()
			.await
			.map_err(|err| {
				ErrorData::internal_error(format!("Notes API request failed: {err}"), None)
			})?;

		read_response(response).await
	}

	async fn forward_get(
		&self,
		path: &str,
		params: JsonObject,
	) -> Result<(StatusCode, Value), ErrorData> {
		let url = format!("{}{}", self.api_base, path);
		let query = params_to_query(params);
		let response = self
			.apply_context_headers(self.client.get(url).query(&query))
			.send()
			.await
			.map_err(|err| {
				ErrorData::internal_error(format!("Notes API request failed: {err}"), None)
			})?;

		read_response(response).await
	}

	async fn forward_delete(&self, path: &str) -> Result<(StatusCode, Value), ErrorData> {
		let url = format!("{}{}", self.api_base, path);
		let response =
			self.apply_context_headers(self.client.delete(url)).send().await.map_err(|err| {
				ErrorData::internal_error(format!("Notes API request failed: {err}"), None)
			})?;

		read_response(response).await
	}
}

#[rmcp::tool_router]
impl ClipMcp {
	#[rmcp::tool(
		name = "add_note",
		description = "Save a snippet as a note. Derives a title, auto-tags when no tags are given, and deduplicates identical content saved within the same minute.",
		input_schema = add_note_schema()
	)]
	async fn add_note(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let style = params
			.get("receipt_style")
			.and_then(Value::as_str)
			.unwrap_or("check")
			.to_string();
		let (status, body) = self.forward_post("/notes", Value::Object(params)).await?;

		if !status.is_success() {
			return Ok(api_error_result(&body));
		}

		let title = body["title"].as_str().unwrap_or("(untitled)");

		Ok(CallToolResult::success(vec![Content::text(receipt(&style, title))]))
	}

	#[rmcp::tool(
		name = "list_notes",
		description = "List the most recently saved notes, newest first.",
		input_schema = list_notes_schema()
	)]
	async fn list_notes(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let (status, body) = self.forward_get("/notes", params).await?;

		if !status.is_success() {
			return Ok(api_error_result(&body));
		}

		Ok(CallToolResult::success(vec![Content::text(render_listing(&body, "(no notes)"))]))
	}

	#[rmcp::tool(
		name = "search_notes",
		description = "Search saved notes by a case-insensitive substring over title, content, and context.",
		input_schema = search_notes_schema()
	)]
	async fn search_notes(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let (status, body) = self.forward_get("/notes/search", params).await?;

		if !status.is_success() {
			return Ok(api_error_result(&body));
		}

		Ok(CallToolResult::success(vec![Content::text(render_listing(&body, "(no matches)"))]))
	}

	#[rmcp::tool(
		name = "delete_note",
		description = "Delete a note by id. Removes both the JSON record and its Markdown rendering.",
		input_schema = delete_note_schema()
	)]
	async fn delete_note(&self, mut params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let id = take_required_string(&mut params, "id")?;
		let path = format!("/notes/{id}");
		let (status, body) = self.forward_delete(&path).await?;

		if !status.is_success() {
			return Ok(api_error_result(&body));
		}

		Ok(CallToolResult::success(vec![Content::text(format!("Deleted {id}."))]))
	}
}

#[rmcp::tool_handler]
impl ServerHandler for ClipMcp {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			instructions: Some(
				"Note capture adapter that forwards tool calls to the notes HTTP API.".to_string(),
			),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}

pub async fn serve_mcp(mcp: &McpContext) -> Result<()> {
	let bind_addr: SocketAddr = mcp.bind.parse()?;
	let api_base = normalize_api_base(&mcp.api_base);
	let api_token = mcp.api_token.clone();
	let tenant = mcp.tenant.clone();
	let session_manager: Arc<LocalSessionManager> = Default::default();
	let service = StreamableHttpService::new(
		move || Ok(ClipMcp::new(api_base.clone(), api_token.clone(), tenant.clone())),
		session_manager,
		StreamableHttpServerConfig::default(),
	);
	let router = Router::new().fallback_service(service);
	let listener = TcpListener::bind(bind_addr).await?;

	axum::serve(listener, router).await?;

	Ok(())
}

fn normalize_api_base(raw: &str) -> String {
	let trimmed = raw.trim().trim_end_matches('/');
	let (scheme, rest) = if let Some(value) = trimmed.strip_prefix("http://") {
		("http://", value)
	} else if let Some(value) = trimmed.strip_prefix("https://") {
		("https://", value)
	} else {
		("http://", trimmed)
	};
	// The adapter runs next to the API. If the API binds a wildcard address,
	// forward over loopback.
	let rest = if let Some(value) = rest.strip_prefix("0.0.0.0:") {
		format!("127.0.0.1:{value}")
	} else if let Some(value) = rest.strip_prefix("[::]:") {
		format!("127.0.0.1:{value}")
	} else {
		rest.to_string()
	};

	format!("{scheme}{rest}")
}

fn receipt(style: &str, title: &str) -> String {
	match style {
		"simple" => format!("Saved: {title}"),
		_ => format!("✅ Saved: {}", title.chars().take(RECEIPT_TITLE_CHARS).collect::<String>()),
	}
}

/// One line per note: `- [YYYY-MM-DD HH:MM:SS] Title`.
fn render_listing(body: &Value, empty: &str) -> String {
	let Some(items) = body["items"].as_array() else { return empty.to_string() };

	if items.is_empty() {
		return empty.to_string();
	}

	items.iter().map(note_line).collect::<Vec<_>>().join("\n")
}

fn note_line(note: &Value) -> String {
	let stamp: String = note["saved_at"]
		.as_str()
		.unwrap_or_default()
		.chars()
		.take(19)
		.map(|c| if c == 'T' { ' ' } else { c })
		.collect();
	let title = note["title"].as_str().unwrap_or("(untitled)");

	format!("- [{stamp}] {title}")
}

fn api_error_result(body: &Value) -> CallToolResult {
	let message = body["message"].as_str().unwrap_or("Notes API returned an error.");

	CallToolResult::error(vec![Content::text(message.to_string())])
}

fn params_to_query(params: JsonObject) -> Vec<(String, String)> {
	params
		.into_iter()
		.filter_map(|(key, value)| match value {
			Value::Null => None,
			Value::String(text) => Some((key, text)),
			other => Some((key, other.to_string())),
		})
		.collect()
}

fn take_required_string(params: &mut JsonObject, key: &str) -> Result<String, ErrorData> {
	let value = params
		.remove(key)
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} is required."), None))?;
	let text = value
		.as_str()
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} must be a string."), None))?
		.trim();

	if text.is_empty() {
		return Err(ErrorData::invalid_params(format!("{key} must be non-empty."), None));
	}

	Ok(text.to_string())
}

async fn read_response(response: reqwest::Response) -> Result<(StatusCode, Value), ErrorData> {
	let status = response.status();
	let bytes = response.bytes().await.map_err(|err| {
		ErrorData::internal_error(format!("Notes API response error: {err}"), None)
	})?;
	let parsed = serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|_| {
		let raw = String::from_utf8_lossy(&bytes).to_string();

		serde_json::json!({ "raw": raw })
	});

	Ok((status, parsed))
}

fn add_note_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": true,
		"required": ["content"],
		"properties": {
			"content": { "type": "string" },
			"tags": { "type": "array", "items": { "type": "string" } },
			"topic": { "type": ["string", "null"] },
			"source": {
				"type": ["object", "null"],
				"additionalProperties": true,
				"properties": {
					"thread_title": { "type": ["string", "null"] },
					"msg_id": { "type": ["string", "null"] },
					"url": { "type": ["string", "null"] }
				}
			},
			"context_before": {
				"type": "array",
				"items": {
					"type": "object",
					"required": ["role", "text"],
					"properties": {
						"role": { "type": "string", "enum": ["user", "assistant", "system"] },
						"text": { "type": "string" }
					}
				}
			},
			"receipt_style": { "type": "string", "enum": ["check", "simple"] }
		}
	}))
}

fn list_notes_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {
			"limit": { "type": ["integer", "null"], "minimum": 1, "maximum": 50 }
		}
	}))
}

fn search_notes_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["q"],
		"properties": {
			"q": { "type": "string" },
			"limit": { "type": ["integer", "null"], "minimum": 1, "maximum": 100 }
		}
	}))
}

fn delete_note_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["id"],
		"properties": {
			"id": { "type": "string" }
		}
	}))
}
