use time::{OffsetDateTime, UtcOffset};

use clip_domain::{Note, NoteInput, process, sanitize};
use clip_storage::{JSON_EXT, MARKDOWN_EXT};

use crate::{
	Error, JSON_CONTENT_TYPE, KEYWORD_TAG_COUNT, MARKDOWN_CONTENT_TYPE, MAX_CONTENT_CHARS,
	MAX_CONTEXT_MESSAGES, MAX_TAG_CHARS, MAX_TAGS, MAX_TOPIC_CHARS, NoteStore, Result, markdown,
	note_key,
};

impl NoteStore {
	/// Persists one note, or resolves to a pre-existing one when the content
	/// fingerprint is already in the tenant's dedup index.
	///
	/// On a dedup hit the returned note carries the existing id stitched onto
	/// this request's freshly derived metadata; nothing is written and the
	/// index is not touched, so the returned title/tags may differ from what
	/// was originally persisted under that id.
	///
	/// The JSON record, the Markdown rendering, and the index update are three
	/// separate writes with no transaction around them. A crash in between
	/// leaves at most an artifact pair without an index entry; listing and
	/// search scan artifacts directly and never depend on the index.
	pub async fn save(
		&self,
		input: &NoteInput,
		now: OffsetDateTime,
		suggested_id: Option<&str>,
	) -> Result<Note> {
		validate_input(input)?;

		let now = now.to_offset(UtcOffset::UTC);
		let title = process::title_of(&input.content);
		let tags = if input.tags.is_empty() {
			process::keywords_of(&input.content, KEYWORD_TAG_COUNT)
		} else {
			dedup_tags(&input.tags)
		};
		let dedup_key = process::fingerprint(&input.content, now);
		let candidate =
			suggested_id.map(str::to_string).unwrap_or_else(|| dedup_key.replace('@', "-"));
		let id = sanitize::sanitize_identifier(&candidate, sanitize::IDENTIFIER_MAX_CHARS);

		let mut index = self.load_dedup_index().await?;

		if let Some(existing_id) = index.get(&dedup_key) {
			tracing::info!(
				tenant = %self.tenant,
				id = %existing_id,
				"Duplicate content within the fingerprint minute; returning the existing note id.",
			);

			return Ok(self.build_note(existing_id.clone(), title, input, tags, now, dedup_key));
		}

		let note = self.build_note(id, title, input, tags, now, dedup_key.clone());
		let json_key = note_key(&self.tenant, now, &note.id, JSON_EXT);
		let markdown_key = note_key(&self.tenant, now, &note.id, MARKDOWN_EXT);

		self.backend.put(&json_key, &serde_json::to_vec_pretty(&note)?, JSON_CONTENT_TYPE).await?;
		self.backend
			.put(&markdown_key, markdown::render(&note)?.as_bytes(), MARKDOWN_CONTENT_TYPE)
			.await?;

		index.insert(dedup_key, note.id.clone());

		self.store_dedup_index(&index).await?;

		tracing::info!(tenant = %self.tenant, id = %note.id, "Note saved.");

		Ok(note)
	}

	fn build_note(
		&self,
		id: String,
		title: String,
		input: &NoteInput,
		tags: Vec<String>,
		now: OffsetDateTime,
		dedup_key: String,
	) -> Note {
		Note {
			id,
			title,
			content: input.content.clone(),
			tags,
			topic: input.topic.clone(),
			saved_at: now,
			source: input.source.clone(),
			dedup_key,
			context_before: input.context_before.clone(),
			tenant: self.tenant.clone(),
		}
	}
}

/// Caller tags with duplicates removed, first occurrence winning.
fn dedup_tags(tags: &[String]) -> Vec<String> {
	let mut seen = Vec::with_capacity(tags.len());

	for tag in tags {
		if !seen.contains(tag) {
			seen.push(tag.clone());
		}
	}

	seen
}

fn validate_input(input: &NoteInput) -> Result<()> {
	let content_chars = input.content.chars().count();

	if content_chars == 0 {
		return Err(invalid("content must be non-empty."));
	}
	if content_chars > MAX_CONTENT_CHARS {
		return Err(invalid(format!("content must be at most {MAX_CONTENT_CHARS} characters.")));
	}
	if input.tags.len() > MAX_TAGS {
		return Err(invalid(format!("at most {MAX_TAGS} tags are allowed.")));
	}
	if input.tags.iter().any(|tag| tag.chars().count() > MAX_TAG_CHARS) {
		return Err(invalid(format!("each tag must be at most {MAX_TAG_CHARS} characters.")));
	}
	if let Some(topic) = input.topic.as_ref()
		&& topic.chars().count() > MAX_TOPIC_CHARS
	{
		return Err(invalid(format!("topic must be at most {MAX_TOPIC_CHARS} characters.")));
	}
	if input.context_before.len() > MAX_CONTEXT_MESSAGES {
		return Err(invalid(format!(
			"at most {MAX_CONTEXT_MESSAGES} context messages are allowed."
		)));
	}

	Ok(())
}

fn invalid(message: impl Into<String>) -> Error {
	Error::InvalidRequest { message: message.into() }
}
