//! User-mention token handling.

use std::sync::OnceLock;

use regex::Regex;

static MENTION_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Pattern of a user-mention token, e.g. `<@U12345>`.
fn mention_pattern() -> &'static Regex {
    MENTION_PATTERN.get_or_init(|| Regex::new(r"<@[A-Z0-9]+>").expect("mention pattern is a valid regex"))
}

/// Remove every user-mention token and trim the result.
///
/// Removal repeats until nothing matches, so a token spliced together by an
/// earlier removal (`<@<@U1>U2>`) is removed as well.
pub fn strip_mentions(text: &str) -> String {
    let mut stripped = text.to_string();

    while mention_pattern().is_match(&stripped) {
        stripped = mention_pattern().replace_all(&stripped, "").into_owned();
    }

    stripped.trim().to_string()
}

/// Whether `text` mentions the user `user_id`.
pub fn mentions_user(text: &str, user_id: &str) -> bool {
    !user_id.is_empty() && text.contains(&format!("<@{user_id}>"))
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_mentions() {
        assert_eq!(strip_mentions("<@U12345> hello"), "hello");
        assert_eq!(strip_mentions("hey <@U1> and <@W2ABC>, look"), "hey  and , look");
        assert_eq!(strip_mentions("<@U1><@U2>"), "");
        assert_eq!(strip_mentions("   "), "");
        assert_eq!(strip_mentions("no mentions here"), "no mentions here");
    }

    #[test]
    fn test_strip_mentions_leaves_other_tokens_alone() {
        assert_eq!(strip_mentions("<@u123> lowercase"), "<@u123> lowercase");
        assert_eq!(strip_mentions("<#C123|general> <!here>"), "<#C123|general> <!here>");
        assert_eq!(strip_mentions("<@U1>x<@U2>"), "x");
        assert_eq!(strip_mentions("a <@U1> b"), "a  b");
        assert_eq!(strip_mentions("<@<@U1>U2> spliced"), "spliced");
    }

    #[test]
    fn test_stripped_text_never_contains_tokens() {
        let inputs = ["<@U1>", "<@<@U1>U2>", "x<@A1>y<@B2>z", "<@U1 > <@U2>"];

        for input in inputs {
            let stripped = strip_mentions(input);
            assert!(!mention_pattern().is_match(&stripped), "{input} -> {stripped}");
        }
    }

    #[test]
    fn test_mentions_user() {
        assert!(mentions_user("hi <@UBOT> there", "UBOT"));
        assert!(!mentions_user("hi <@UOTHER>", "UBOT"));
        assert!(!mentions_user("hi UBOT", "UBOT"));
        assert!(!mentions_user("hi <@>", ""));
    }
}
