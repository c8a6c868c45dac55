//! Password-like content detection
//!
//! A cheap, local heuristic tuned to avoid false positives on code, URLs and
//! paths while catching generated-looking secrets. The heuristic is an ordered
//! table of rules; the first rule that matches decides the verdict. Content
//! that survives every rule is treated as password-like.

use regex::Regex;
use std::sync::LazyLock;

/// Shortest content considered (bytes)
pub const MIN_PASSWORD_LEN: usize = 8;
/// Longest content considered (bytes)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Characters counted as the "special" character class
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/~`";

/// Common non-password tokens that can pass the complexity checks
pub const COMMON_NON_PASSWORDS: &[&str] = &[
    "undefined",
    "function",
    "console.log",
    "document",
    "window",
    "localStorage",
    "sessionStorage",
    "className",
    "getElementById",
    "querySelector",
    "addEventListener",
    "preventDefault",
    "stopPropagation",
    "Promise.resolve",
    "JSON.stringify",
    "JSON.parse",
    "parseInt",
    "parseFloat",
    "toString",
    "valueOf",
    "hasOwnProperty",
    "iOS",
    "Android",
];

/// Substrings that mark content as code rather than a secret (case-insensitive)
pub const PROGRAMMING_PATTERNS: &[&str] = &[
    // JavaScript/TypeScript
    ".then(",
    ".catch(",
    ".finally(",
    "async/await",
    "Promise",
    // Method chaining
    ".map(",
    ".filter(",
    ".reduce(",
    ".forEach(",
    // Object properties
    ".length",
    ".prototype",
    ".constructor",
    // CSS units and colors
    "px",
    "em",
    "rem",
    "rgb(",
    "rgba(",
    // DOM globals
    "window",
    "document",
];

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://|^ftp://|^www\.").expect("Invalid regex"));
static FILE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]:[\\/]|^/[^/]|^\./|^\.\./|^~/").expect("Invalid regex")
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid regex")
});
static FUNCTION_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*\.[a-zA-Z_][a-zA-Z0-9_]*\(.*\)$").expect("Invalid regex")
});
static METHOD_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*\(\)$").expect("Invalid regex"));
static PROPERTY_ACCESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*\.[a-zA-Z_][a-zA-Z0-9_]*$").expect("Invalid regex")
});
static FILE_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[a-zA-Z0-9]{2,4}$").expect("Invalid regex"));
static BASE64_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("Invalid regex"));
static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{32,}$").expect("Invalid regex"));

/// Outcome of a single rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    PasswordLike,
    NotPassword,
}

/// A named predicate and the verdict it yields when it matches.
///
/// Rules receive content that has already been trimmed.
#[derive(Debug, Clone, Copy)]
pub struct PasswordRule {
    pub name: &'static str,
    pub verdict: Verdict,
    pub matches: fn(&str) -> bool,
}

impl PasswordRule {
    const fn not_password(name: &'static str, matches: fn(&str) -> bool) -> Self {
        PasswordRule {
            name,
            verdict: Verdict::NotPassword,
            matches,
        }
    }

    const fn password_like(name: &'static str, matches: fn(&str) -> bool) -> Self {
        PasswordRule {
            name,
            verdict: Verdict::PasswordLike,
            matches,
        }
    }
}

/// Evaluation order. Earlier rules win.
pub static PASSWORD_RULES: &[PasswordRule] = &[
    PasswordRule::not_password("length_out_of_range", is_length_out_of_range),
    PasswordRule::not_password("contains_whitespace", contains_whitespace),
    PasswordRule::not_password("url_shape", |s| URL_RE.is_match(s)),
    PasswordRule::not_password("file_path_shape", |s| FILE_PATH_RE.is_match(s)),
    PasswordRule::not_password("email_shape", |s| EMAIL_RE.is_match(s)),
    PasswordRule::not_password("method_call_shape", |s| {
        FUNCTION_CALL_RE.is_match(s) || METHOD_CALL_RE.is_match(s)
    }),
    PasswordRule::not_password("property_access_shape", |s| {
        PROPERTY_ACCESS_RE.is_match(s)
    }),
    PasswordRule::not_password("file_extension_suffix", |s| FILE_EXT_RE.is_match(s)),
    PasswordRule::password_like("base64_blob", is_base64_blob),
    PasswordRule::password_like("api_token", is_api_token),
    PasswordRule::not_password("common_identifier", is_common_non_password),
    PasswordRule::not_password("programming_pattern", contains_programming_pattern),
    PasswordRule::not_password("hex_color", is_hex_color),
    PasswordRule::not_password("low_complexity", |s| character_class_count(s) < 3),
    PasswordRule::not_password("repeated_single_char", is_repeated_char),
    PasswordRule::not_password("camel_case_identifier", looks_like_camel_case),
    PasswordRule::not_password("repeated_run", |s| has_repeated_run(s, 3)),
];

/// Which rule decided, if any, and the resulting verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordDecision {
    pub verdict: Verdict,
    /// `None` when no rule matched and the content fell through as password-like
    pub rule: Option<&'static str>,
}

impl PasswordDecision {
    pub fn is_password_like(&self) -> bool {
        self.verdict == Verdict::PasswordLike
    }
}

/// Run the rule table against `content` and report the deciding rule.
pub fn decide(content: &str) -> PasswordDecision {
    let content = content.trim();

    PASSWORD_RULES
        .iter()
        .find(|rule| (rule.matches)(content))
        .map(|rule| PasswordDecision {
            verdict: rule.verdict,
            rule: Some(rule.name),
        })
        .unwrap_or(PasswordDecision {
            verdict: Verdict::PasswordLike,
            rule: None,
        })
}

/// Heuristic check for credential/secret-looking content.
pub fn looks_like_password(content: &str) -> bool {
    decide(content).is_password_like()
}

fn is_length_out_of_range(s: &str) -> bool {
    !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&s.len())
}

fn contains_whitespace(s: &str) -> bool {
    s.contains([' ', '\t', '\n', '\r'])
}

fn is_base64_blob(s: &str) -> bool {
    s.len() > 20 && s.len() % 4 == 0 && BASE64_RE.is_match(s)
}

fn is_api_token(s: &str) -> bool {
    s.len() > 32 && API_KEY_RE.is_match(s)
}

fn is_common_non_password(s: &str) -> bool {
    COMMON_NON_PASSWORDS
        .iter()
        .any(|token| token.eq_ignore_ascii_case(s))
}

fn contains_programming_pattern(s: &str) -> bool {
    let lower = s.to_lowercase();
    PROGRAMMING_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Exactly six hex digits, e.g. `ff00aa`
fn is_hex_color(s: &str) -> bool {
    s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Number of classes present among {upper, lower, digit, special}
pub fn character_class_count(s: &str) -> usize {
    let has_upper = s.chars().any(char::is_uppercase);
    let has_lower = s.chars().any(char::is_lowercase);
    let has_digit = s.chars().any(|c| c.is_ascii_digit());
    let has_special = s.chars().any(|c| SPECIAL_CHARS.contains(c));

    [has_upper, has_lower, has_digit, has_special]
        .into_iter()
        .filter(|present| *present)
        .count()
}

pub fn is_repeated_char(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

/// Identifier-looking text: starts with a letter, letters and digits only,
/// has an uppercase letter and is mostly letters.
pub fn looks_like_camel_case(s: &str) -> bool {
    if !s.chars().next().is_some_and(char::is_alphabetic) {
        return false;
    }

    if s.contains(['/', '.', '@', '-', '+']) {
        return false;
    }

    let mut has_upper = false;
    let mut letter_count = 0usize;
    let mut total = 0usize;

    for c in s.chars() {
        total += 1;
        if c.is_alphabetic() {
            letter_count += 1;
            has_upper |= c.is_uppercase();
        } else if !c.is_ascii_digit() {
            return false;
        }
    }

    has_upper && letter_count * 2 > total
}

/// True when some character repeats at least `run_len` times in a row.
pub fn has_repeated_run(s: &str, run_len: usize) -> bool {
    let mut count = 0usize;
    let mut prev: Option<char> = None;

    for c in s.chars() {
        if prev == Some(c) {
            count += 1;
        } else {
            count = 1;
            prev = Some(c);
        }
        if count >= run_len {
            return true;
        }
    }
    false
}
