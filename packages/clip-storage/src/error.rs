pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error("Object store request failed with status {status}: {message}")]
	UnexpectedStatus { status: u16, message: String },
	#[error("Failed to sign object store request: {message}")]
	Sign { message: String },
	#[error("Failed to parse object listing: {message}")]
	Listing { message: String },
}
