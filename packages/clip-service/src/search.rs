use clip_domain::Note;

use crate::{NoteStore, Result};

impl NoteStore {
	/// Case-insensitive substring match over title, content, and context
	/// texts. Linear scan in backend enumeration order; the first `limit`
	/// matches are returned, unranked.
	pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Note>> {
		let needle = query.to_lowercase();
		let keys = self.backend.list_note_keys(&self.tenant).await?;
		let mut items = Vec::new();

		for key in keys {
			if items.len() >= limit {
				break;
			}

			let Some(note) = self.read_note(&key).await? else { continue };

			if matches(&note, &needle) {
				items.push(note);
			}
		}

		Ok(items)
	}
}

fn matches(note: &Note, needle: &str) -> bool {
	let mut haystack = format!("{} {}", note.title, note.content);

	for message in &note.context_before {
		haystack.push(' ');
		haystack.push_str(&message.text);
	}

	haystack.to_lowercase().contains(needle)
}
