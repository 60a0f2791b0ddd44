use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Assistant,
	System,
}
impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::User => "user",
			Self::Assistant => "assistant",
			Self::System => "system",
		}
	}
}

/// One turn of conversational context preceding the captured snippet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
	pub role: Role,
	pub text: String,
}

/// Opaque reference to where a snippet came from. Passed through unmodified.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
	pub thread_title: Option<String>,
	pub msg_id: Option<String>,
	pub url: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStyle {
	#[default]
	Check,
	Simple,
}

/// Inbound note submission before the store derives title, tags, and identity.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NoteInput {
	pub content: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub topic: Option<String>,
	#[serde(default)]
	pub source: Option<SourceRef>,
	#[serde(default)]
	pub context_before: Vec<ContextMessage>,
	#[serde(default)]
	pub receipt_style: ReceiptStyle,
}

/// The persisted unit. Written exactly once, never mutated in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Note {
	pub id: String,
	pub title: String,
	pub content: String,
	pub tags: Vec<String>,
	pub topic: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub saved_at: OffsetDateTime,
	pub source: Option<SourceRef>,
	pub dedup_key: String,
	#[serde(default)]
	pub context_before: Vec<ContextMessage>,
	pub tenant: String,
}
