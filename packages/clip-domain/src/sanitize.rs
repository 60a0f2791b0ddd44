/// Default cap for note identifiers used as file/object basenames.
pub const IDENTIFIER_MAX_CHARS: usize = 120;
/// Default cap for tenant identifiers.
pub const TENANT_MAX_CHARS: usize = 50;

const IDENTIFIER_FALLBACK: &str = "untitled";
const TENANT_FALLBACK: &str = "default";

/// Normalizes an identifier into a safe path/key segment. Total: never fails,
/// only strips toward [`IDENTIFIER_FALLBACK`].
///
/// Control characters and `<>:"/\|?*` are removed, every `..` occurrence is
/// dropped, surrounding whitespace and dots are trimmed, and the result is
/// capped at `max_chars`.
pub fn sanitize_identifier(raw: &str, max_chars: usize) -> String {
	let mut cleaned = raw
		.chars()
		.filter(|ch| {
			!ch.is_control() && !matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
		})
		.collect::<String>();

	while cleaned.contains("..") {
		cleaned = cleaned.replace("..", "");
	}

	let capped = cleaned
		.trim_matches(|ch: char| ch.is_whitespace() || ch == '.')
		.chars()
		.take(max_chars)
		.collect::<String>();
	let trimmed = capped.trim_matches(|ch: char| ch.is_whitespace() || ch == '.');

	if trimmed.is_empty() { IDENTIFIER_FALLBACK.to_string() } else { trimmed.to_string() }
}

/// Normalizes a tenant into `[A-Za-z0-9_-]`, capped at `max_chars`. Total: an
/// empty result yields [`TENANT_FALLBACK`].
pub fn sanitize_tenant(raw: &str, max_chars: usize) -> String {
	let cleaned = raw
		.chars()
		.filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'))
		.take(max_chars)
		.collect::<String>();

	if cleaned.is_empty() { TENANT_FALLBACK.to_string() } else { cleaned }
}
