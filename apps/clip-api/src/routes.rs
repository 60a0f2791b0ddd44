use axum::{
	Json, Router,
	extract::{Path, Query, Request, State},
	http::{HeaderMap, StatusCode, header},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use clip_domain::{Note, NoteInput};

use crate::state::AppState;

/// Tenant selector header. Absent or unreadable values fall back to the
/// configured default tenant; the value is sanitized downstream.
pub const TENANT_HEADER: &str = "x-user-id";

pub const DEFAULT_LIST_LIMIT: usize = 5;
pub const MAX_LIST_LIMIT: usize = 50;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const MAX_SEARCH_LIMIT: usize = 100;
pub const MAX_QUERY_CHARS: usize = 200;

pub fn router(state: AppState) -> Router {
	let protected = Router::new()
		.route("/notes", post(save_note).get(list_notes))
		.route("/notes/search", get(search_notes))
		.route("/notes/{id}", delete(delete_note))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

	Router::new().route("/healthz", get(healthz)).merge(protected).with_state(state)
}

async fn require_bearer(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Result<Response, ApiError> {
	let token = request
		.headers()
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "));
	let authorized =
		token.is_some_and(|token| state.cfg.security.api_tokens.iter().any(|t| t == token));

	if !authorized {
		return Err(json_error(
			StatusCode::UNAUTHORIZED,
			"unauthorized",
			"Missing or invalid bearer token.",
		));
	}

	Ok(next.run(request).await)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub ok: bool,
	pub provider: String,
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse { ok: true, provider: state.cfg.storage.provider.clone() })
}

async fn save_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<NoteInput>,
) -> Result<Json<Note>, ApiError> {
	let store = state.store_for(&tenant_of(&headers, &state))?;
	let note = store.save(&payload, OffsetDateTime::now_utc(), None).await?;

	Ok(Json(note))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
	pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NotesResponse {
	pub items: Vec<Note>,
	pub count: usize,
}

async fn list_notes(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<ListQuery>,
) -> Result<Json<NotesResponse>, ApiError> {
	let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);

	if !(1..=MAX_LIST_LIMIT).contains(&limit) {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			format!("limit must be between 1 and {MAX_LIST_LIMIT}."),
		));
	}

	let store = state.store_for(&tenant_of(&headers, &state))?;
	let items = store.list_recent(limit).await?;
	let count = items.len();

	Ok(Json(NotesResponse { items, count }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
	pub q: String,
	pub limit: Option<usize>,
}

async fn search_notes(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<SearchQuery>,
) -> Result<Json<NotesResponse>, ApiError> {
	let q_chars = query.q.chars().count();

	if q_chars == 0 || q_chars > MAX_QUERY_CHARS {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			format!("q must be between 1 and {MAX_QUERY_CHARS} characters."),
		));
	}

	let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

	if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			format!("limit must be between 1 and {MAX_SEARCH_LIMIT}."),
		));
	}

	let store = state.store_for(&tenant_of(&headers, &state))?;
	let items = store.search(&query.q, limit).await?;
	let count = items.len();

	Ok(Json(NotesResponse { items, count }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
	pub deleted: bool,
	pub id: String,
}

async fn delete_note(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
	let store = state.store_for(&tenant_of(&headers, &state))?;

	if !store.delete(&id).await? {
		return Err(json_error(
			StatusCode::NOT_FOUND,
			"not_found",
			format!("No note with id {id}."),
		));
	}

	Ok(Json(DeleteResponse { deleted: true, id }))
}

fn tenant_of(headers: &HeaderMap, state: &AppState) -> String {
	headers
		.get(TENANT_HEADER)
		.and_then(|value| value.to_str().ok())
		.filter(|value| !value.trim().is_empty())
		.unwrap_or(&state.cfg.security.default_tenant)
		.to_string()
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

pub fn json_error(
	status: StatusCode,
	error_code: impl Into<String>,
	message: impl Into<String>,
) -> ApiError {
	ApiError { status, error_code: error_code.into(), message: message.into() }
}

impl From<clip_service::Error> for ApiError {
	fn from(err: clip_service::Error) -> Self {
		match err {
			clip_service::Error::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message),
			clip_service::Error::UnknownProvider { provider } => json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				"storage_error",
				format!("Unknown storage provider {provider}."),
			),
			clip_service::Error::Storage { message } => {
				tracing::error!(%message, "Storage operation failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"storage_error",
					"Storage operation failed.",
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
