use std::sync::LazyLock;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jieba_rs::{Jieba, KeywordExtract, TfIdf};
use regex::Regex;
use sha2::{Digest, Sha256};
use time::{OffsetDateTime, UtcOffset};

/// Hard cap on derived titles, in characters.
pub const TITLE_MAX_CHARS: usize = 120;

const TITLE_FALLBACK: &str = "untitled";
/// A first sentence shorter than this is not worth using as a title on its own.
const FIRST_SENTENCE_MIN_CHARS: usize = 10;

/// Optional external title generator. When it yields `None` the built-in
/// first-sentence strategy of [`title_of`] applies.
pub trait TitleGenerator
where
	Self: Send + Sync,
{
	fn generate(&self, content: &str) -> Option<String>;
}

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s*").expect("Invalid regex."));
static BOLD: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("Invalid regex."));
static LINK: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("Invalid regex."));
static INLINE_CODE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("Invalid regex."));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex."));
// CJK ideographs, ASCII alphanumerics, and a fixed punctuation set survive;
// everything else is stripped from titles.
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[^\u{4e00}-\u{9fff}A-Za-z0-9 _\-.,，。！？!?：:；;（）()\[\]]+")
		.expect("Invalid regex.")
});

static SEGMENTER: LazyLock<Jieba> = LazyLock::new(Jieba::new);
static EXTRACTOR: LazyLock<TfIdf> = LazyLock::new(TfIdf::default);

/// Derives a short display title from raw note content.
///
/// Markdown markers are stripped first, then the first sentence is used when it
/// is long enough to stand alone; otherwise the content is truncated, breaking
/// at the last word boundary past 70% of the cap when one exists.
pub fn title_of(content: &str) -> String {
	title_of_capped(content, TITLE_MAX_CHARS)
}

fn title_of_capped(content: &str, max_chars: usize) -> String {
	let text = HEADING.replace(content, "");
	let text = BOLD.replace_all(&text, "$1");
	let text = LINK.replace_all(&text, "$1");
	let text = INLINE_CODE.replace_all(&text, "$1");
	let text = WHITESPACE.replace_all(text.trim(), " ").into_owned();

	if let Some(first) = text.split(['。', '！', '？', '\n']).next() {
		let first = first.trim();
		let len = first.chars().count();

		if len >= FIRST_SENTENCE_MIN_CHARS && len <= max_chars {
			return slugify(first, max_chars);
		}
	}
	if text.chars().count() <= max_chars {
		return slugify(&text, max_chars);
	}

	let head = text.chars().take(max_chars).collect::<Vec<_>>();
	let last_break = head
		.iter()
		.enumerate()
		.filter(|(_, ch)| matches!(ch, ' ' | '，' | '、' | '；' | '：'))
		.map(|(idx, _)| idx)
		.next_back();
	// Break on the boundary only when it falls past 70% of the cap, so the
	// title does not collapse to a short fragment.
	let cut = match last_break {
		Some(idx) if idx * 10 > max_chars * 7 => idx,
		_ => head.len(),
	};
	let truncated = head[..cut].iter().collect::<String>();

	slugify(&truncated, max_chars)
}

/// Collapses whitespace, drops disallowed characters, and caps the length.
/// Total: an empty result yields the literal `untitled`.
pub fn slugify(text: &str, max_chars: usize) -> String {
	let collapsed = WHITESPACE.replace_all(text.trim(), " ");
	let cleaned = DISALLOWED.replace_all(&collapsed, "");
	let capped = cleaned.chars().take(max_chars).collect::<String>();
	let trimmed = capped.trim_end();

	if trimmed.is_empty() { TITLE_FALLBACK.to_string() } else { trimmed.to_string() }
}

/// Content fingerprint used as the dedup identity:
/// `base64url(sha256(content))[..22] + "@" + YYYYMMDDHHMM` at UTC minute
/// granularity. Two submissions of identical content collapse only within the
/// same UTC minute.
pub fn fingerprint(content: &str, at: OffsetDateTime) -> String {
	let digest = Sha256::digest(content.as_bytes());
	let encoded = URL_SAFE_NO_PAD.encode(digest);
	let at = at.to_offset(UtcOffset::UTC);
	let minute = format!(
		"{:04}{:02}{:02}{:02}{:02}",
		at.year(),
		u8::from(at.month()),
		at.day(),
		at.hour(),
		at.minute(),
	);

	format!("{}@{minute}", &encoded[..22])
}

/// Extracts up to `top_k` keyword tags from content via TF-IDF over jieba
/// segmentation. Best-effort: single-character tokens are dropped and there is
/// no failure mode, only an empty result.
pub fn keywords_of(content: &str, top_k: usize) -> Vec<String> {
	EXTRACTOR
		.extract_keywords(&SEGMENTER, content, top_k, Vec::new())
		.into_iter()
		.map(|keyword| keyword.keyword)
		.filter(|keyword| keyword.trim().chars().count() > 1)
		.collect()
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn fingerprint_is_deterministic_within_a_minute() {
		let a = fingerprint("hello", datetime!(2024-01-01 10:00:30 UTC));
		let b = fingerprint("hello", datetime!(2024-01-01 10:00:45 UTC));

		assert_eq!(a, b);
		assert!(a.ends_with("@202401011000"));
	}

	#[test]
	fn fingerprint_splits_on_minute_boundary() {
		let a = fingerprint("hello", datetime!(2024-01-01 10:00:59 UTC));
		let b = fingerprint("hello", datetime!(2024-01-01 10:01:00 UTC));

		assert_ne!(a, b);
		assert_eq!(a.split('@').next(), b.split('@').next());
	}

	#[test]
	fn fingerprint_depends_on_content_bytes() {
		let at = datetime!(2024-01-01 10:00:00 UTC);

		assert_ne!(fingerprint("hello", at), fingerprint("hello!", at));
	}

	#[test]
	fn fingerprint_hash_part_is_22_chars() {
		let fp = fingerprint("hello", datetime!(2024-01-01 10:00:00 UTC));

		assert_eq!(fp.split('@').next().map(str::len), Some(22));
	}

	#[test]
	fn fingerprint_normalizes_to_utc() {
		let offset = datetime!(2024-01-01 18:00:30 +8);
		let utc = datetime!(2024-01-01 10:00:30 UTC);

		assert_eq!(fingerprint("hello", offset), fingerprint("hello", utc));
	}

	#[test]
	fn title_takes_first_sentence() {
		let title = title_of("记：今天学习了 Rust 的所有权模型。后面还有别的内容。");

		assert!(title.starts_with("记：今天学习了 Rust 的所有权模型"), "got {title}");
	}

	#[test]
	fn title_strips_markdown_markers() {
		let title = title_of("# A **bold** [link](https://example.com) and `code` in a heading");

		assert_eq!(title, "A bold link and code in a heading");
	}

	#[test]
	fn title_truncates_long_content_at_word_boundary() {
		let content = "word ".repeat(100);
		let title = title_of(&content);

		assert!(title.chars().count() <= TITLE_MAX_CHARS);
		assert!(!title.ends_with(' '));
	}

	#[test]
	fn title_of_empty_content_is_untitled() {
		assert_eq!(title_of(""), "untitled");
		assert_eq!(title_of("###"), "untitled");
	}

	#[test]
	fn short_first_sentence_falls_through_to_full_text() {
		// First sentence is under 10 chars, whole text fits the cap.
		assert_eq!(title_of("Hi there。And more."), "Hi there。And more.");
	}

	#[test]
	fn keywords_drop_single_character_tokens() {
		let keywords = keywords_of("今天学习了 Rust 的所有权模型，所有权是 Rust 的核心概念", 5);

		assert!(keywords.iter().all(|keyword| keyword.chars().count() > 1));
		assert!(keywords.len() <= 5);
	}

	#[test]
	fn keywords_of_empty_content_is_empty() {
		assert!(keywords_of("", 5).is_empty());
	}
}
