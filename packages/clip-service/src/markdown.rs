use time::format_description::well_known::Rfc3339;

use clip_domain::Note;

/// Human-readable rendering stored next to every JSON record. Both backends
/// write the exact same bytes for the same note.
pub fn render(note: &Note) -> Result<String, time::error::Format> {
	let time = note.saved_at.format(&Rfc3339)?;
	let tags = if note.tags.is_empty() { "-".to_string() } else { note.tags.join(", ") };
	let topic = note.topic.as_deref().filter(|topic| !topic.is_empty()).unwrap_or("-");
	let source = note
		.source
		.as_ref()
		.and_then(|source| source.thread_title.as_deref())
		.filter(|title| !title.is_empty())
		.unwrap_or("-");
	let mut rendered = format!(
		"# {}\n- Time: {time}\n- Tags: {tags}\n- Topic: {topic}\n- Source: {source}\n\n## Content\n{}",
		note.title, note.content,
	);

	if !note.context_before.is_empty() {
		rendered.push_str("\n\n### Context\n");
		rendered.push_str(
			&note
				.context_before
				.iter()
				.map(|message| format!("- **{}**: {}", message.role.as_str(), message.text))
				.collect::<Vec<_>>()
				.join("\n"),
		);
	}

	rendered.push('\n');

	Ok(rendered)
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use clip_domain::{ContextMessage, Role, SourceRef};

	use super::*;

	fn sample() -> Note {
		Note {
			id: "abc-202401011000".to_string(),
			title: "Ownership in Rust".to_string(),
			content: "Ownership moves values.".to_string(),
			tags: vec!["rust".to_string(), "ownership".to_string()],
			topic: Some("learning".to_string()),
			saved_at: datetime!(2024-01-01 10:00:30 UTC),
			source: Some(SourceRef {
				thread_title: Some("rust study".to_string()),
				..Default::default()
			}),
			dedup_key: "abc@202401011000".to_string(),
			context_before: vec![ContextMessage {
				role: Role::User,
				text: "what is ownership?".to_string(),
			}],
			tenant: "localdev".to_string(),
		}
	}

	#[test]
	fn renders_all_sections() {
		let rendered = render(&sample()).unwrap();

		assert_eq!(
			rendered,
			"# Ownership in Rust\n\
			 - Time: 2024-01-01T10:00:30Z\n\
			 - Tags: rust, ownership\n\
			 - Topic: learning\n\
			 - Source: rust study\n\
			 \n\
			 ## Content\n\
			 Ownership moves values.\n\
			 \n\
			 ### Context\n\
			 - **user**: what is ownership?\n"
		);
	}

	#[test]
	fn missing_fields_render_as_dashes() {
		let mut note = sample();

		note.tags.clear();
		note.topic = None;
		note.source = None;
		note.context_before.clear();

		let rendered = render(&note).unwrap();

		assert!(rendered.contains("- Tags: -\n"));
		assert!(rendered.contains("- Topic: -\n"));
		assert!(rendered.contains("- Source: -\n"));
		assert!(!rendered.contains("### Context"));
		assert!(rendered.ends_with("Ownership moves values.\n"));
	}
}
