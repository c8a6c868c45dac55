//! Content classification
//!
//! Pure functions deciding whether clipboard text is worth recording, what
//! kind of content it is, and how to preview it. Nothing here touches
//! storage or the clipboard.

mod content_type;
mod password;
mod preview;

pub use content_type::{detect_content_type, is_image_format, IMAGE_EXTENSIONS};
pub use password::{
    decide as decide_password, looks_like_password, PasswordDecision, PasswordRule, Verdict,
    PASSWORD_RULES,
};
pub use preview::{truncate_preview, DEFAULT_PREVIEW_LENGTH};

use super::types::ContentType;

/// Largest content accepted, in bytes (1 MiB)
pub const MAX_CONTENT_BYTES: usize = 1024 * 1024;

/// Why content was rejected before recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    TooLarge,
    PasswordLike,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Empty => "empty",
            SkipReason::TooLarge => "too_large",
            SkipReason::PasswordLike => "password_like",
        }
    }
}

/// Return the reason `content` should not be recorded, if any.
pub fn skip_reason(content: &str, allow_password_like: bool) -> Option<SkipReason> {
    if content.trim().is_empty() {
        return Some(SkipReason::Empty);
    }

    if content.len() > MAX_CONTENT_BYTES {
        return Some(SkipReason::TooLarge);
    }

    if !allow_password_like && looks_like_password(content) {
        return Some(SkipReason::PasswordLike);
    }

    None
}

pub fn should_skip(content: &str, allow_password_like: bool) -> bool {
    skip_reason(content, allow_password_like).is_some()
}

/// Result of classifying one clipboard snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Skip(SkipReason),
    Record(ContentType),
}

/// Run the skip checks and content-type detection in one pass.
pub fn classify(content: &str, allow_password_like: bool) -> Classification {
    match skip_reason(content, allow_password_like) {
        Some(reason) => Classification::Skip(reason),
        None => Classification::Record(detect_content_type(content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content_is_skipped() {
        assert_eq!(skip_reason("", false), Some(SkipReason::Empty));
        assert_eq!(skip_reason("   \n\t", true), Some(SkipReason::Empty));
    }

    #[test]
    fn test_oversized_content_is_skipped() {
        let big = "a".repeat(MAX_CONTENT_BYTES + 1);
        assert_eq!(skip_reason(&big, true), Some(SkipReason::TooLarge));

        let at_limit = "a".repeat(MAX_CONTENT_BYTES);
        assert_eq!(skip_reason(&at_limit, true), None);
    }

    #[test]
    fn test_password_like_respects_allow_flag() {
        assert!(should_skip("Password123!", false));
        assert!(!should_skip("Password123!", true));
    }

    #[test]
    fn test_ordinary_text_is_kept() {
        assert!(!should_skip("hello world", false));
        assert!(!should_skip("https://x.io", false));
    }

    #[test]
    fn test_classify_reports_content_type() {
        assert_eq!(
            classify("/home/u/pic.png", false),
            Classification::Record(ContentType::Image)
        );
        assert_eq!(
            classify("Password123!", false),
            Classification::Skip(SkipReason::PasswordLike)
        );
        assert_eq!(classify("hello", false), Classification::Record(ContentType::Text));
    }
}
