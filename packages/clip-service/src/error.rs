pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Unknown storage provider: {provider}.")]
	UnknownProvider { provider: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}

impl From<clip_storage::Error> for Error {
	fn from(err: clip_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<time::error::Format> for Error {
	fn from(err: time::error::Format) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
