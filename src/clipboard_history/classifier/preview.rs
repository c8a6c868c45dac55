/// Default preview length in characters
pub const DEFAULT_PREVIEW_LENGTH: usize = 200;

const ELLIPSIS: &str = "...";

/// Shorten `text` to a preview of at most `max_length` characters plus `"..."`.
///
/// Prefers to cut at the last space or newline when that break sits past the
/// halfway mark; otherwise cuts hard at `max_length`.
pub fn truncate_preview(text: &str, max_length: usize) -> String {
    let Some((end, _)) = text.char_indices().nth(max_length) else {
        return text.to_string();
    };
    let head = &text[..end];

    let word_break = head
        .char_indices()
        .filter(|(_, c)| *c == ' ' || *c == '\n')
        .map(|(idx, _)| idx)
        .last();

    match word_break {
        Some(idx) if head[..idx].chars().count() > max_length / 2 => {
            format!("{}{}", &head[..idx], ELLIPSIS)
        }
        _ => format!("{}{}", head, ELLIPSIS),
    }
}
