//! Inbound chat request validation
//!
//! Rules are independent predicate/reason pairs. Every rule runs on every
//! request so the caller gets all violations at once.

use crate::llm::PromptTurn;
use serde::Deserialize;
use serde_json::Value;

pub const MAX_MESSAGE_CHARS: usize = 2000;

pub const REASON_NOT_STRING: &str = "Message must be a string";
pub const REASON_LENGTH: &str = "Message must be between 1 and 2000 characters";
pub const REASON_BLANK: &str = "Message cannot be empty or whitespace only";
pub const REASON_HISTORY: &str = "History must be a list of {role, content} turns";

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatInput {
    /// Message with surrounding whitespace removed
    pub message: String,
    /// Prior turns supplied by the client, oldest first
    pub history: Vec<PromptTurn>,
}

/// Raw fields the rules look at
struct Candidate<'a> {
    message: Option<&'a Value>,
    history: Option<&'a Value>,
}

impl Candidate<'_> {
    fn message_str(&self) -> Option<&str> {
        self.message.and_then(Value::as_str)
    }

    fn trimmed(&self) -> &str {
        self.message_str().map_or("", str::trim)
    }
}

struct Rule {
    violated: fn(&Candidate<'_>) -> bool,
    reason: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        violated: message_not_string,
        reason: REASON_NOT_STRING,
    },
    Rule {
        violated: message_length_out_of_range,
        reason: REASON_LENGTH,
    },
    Rule {
        violated: message_blank,
        reason: REASON_BLANK,
    },
    Rule {
        violated: history_malformed,
        reason: REASON_HISTORY,
    },
];

fn message_not_string(c: &Candidate<'_>) -> bool {
    c.message_str().is_none()
}

/// Only strings have a length to check
fn message_length_out_of_range(c: &Candidate<'_>) -> bool {
    c.message_str().is_some_and(|s| {
        let len = s.trim().chars().count();
        len == 0 || len > MAX_MESSAGE_CHARS
    })
}

fn message_blank(c: &Candidate<'_>) -> bool {
    c.message_str().is_some_and(|s| s.trim().is_empty())
}

fn history_malformed(c: &Candidate<'_>) -> bool {
    c.history.is_some_and(|h| parse_history(h).is_none())
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum HistoryRole {
    User,
    Assistant,
}

#[derive(Deserialize)]
struct HistoryTurn {
    role: HistoryRole,
    content: String,
}

/// `null` is treated like an absent field
fn parse_history(value: &Value) -> Option<Vec<PromptTurn>> {
    if value.is_null() {
        return Some(Vec::new());
    }
    let turns = Vec::<HistoryTurn>::deserialize(value).ok()?;
    Some(
        turns
            .into_iter()
            .map(|t| match t.role {
                HistoryRole::User => PromptTurn::user(t.content),
                HistoryRole::Assistant => PromptTurn::assistant(t.content),
            })
            .collect(),
    )
}

/// Validate a decoded request body.
///
/// Anything that is not a JSON object is treated as a body with no fields.
pub fn validate(body: &Value) -> Result<ChatInput, Vec<String>> {
    let candidate = Candidate {
        message: body.get("message"),
        history: body.get("history"),
    };

    let reasons: Vec<String> = RULES
        .iter()
        .filter(|rule| (rule.violated)(&candidate))
        .map(|rule| rule.reason.to_string())
        .collect();

    if !reasons.is_empty() {
        return Err(reasons);
    }

    Ok(ChatInput {
        message: candidate.trimmed().to_string(),
        history: candidate.history.and_then(parse_history).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn reasons(body: &Value) -> Vec<String> {
        validate(body).unwrap_err()
    }

    #[test]
    fn accepts_and_trims() {
        let input = validate(&json!({ "message": "  Hello \n" })).unwrap();
        assert_eq!(input.message, "Hello");
        assert!(input.history.is_empty());
    }

    #[test]
    fn accepts_exactly_max_length() {
        let msg = "A".repeat(MAX_MESSAGE_CHARS);
        assert_eq!(validate(&json!({ "message": msg })).unwrap().message.len(), 2000);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let msg = "é".repeat(MAX_MESSAGE_CHARS);
        assert!(validate(&json!({ "message": msg })).is_ok());
    }

    #[test]
    fn rejects_over_max_length() {
        let msg = "A".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(reasons(&json!({ "message": msg })), vec![REASON_LENGTH]);
    }

    #[test]
    fn empty_message_reports_length() {
        assert_eq!(reasons(&json!({ "message": "" })), vec![REASON_LENGTH, REASON_BLANK]);
    }

    #[test]
    fn whitespace_only_collects_every_violation() {
        let r = reasons(&json!({ "message": "   \n\t   " }));
        assert!(r.contains(&REASON_LENGTH.to_string()));
        assert!(r.contains(&REASON_BLANK.to_string()));
    }

    #[test]
    fn rejects_non_string_messages() {
        for message in [json!(123), json!(true), json!(null), json!({}), json!([])] {
            let r = reasons(&json!({ "message": message }));
            assert_eq!(r[0], REASON_NOT_STRING, "for {message}");
        }
        assert_eq!(reasons(&json!({}))[0], REASON_NOT_STRING);
        assert_eq!(reasons(&json!("just a string"))[0], REASON_NOT_STRING);
    }

    #[test]
    fn non_string_message_gets_only_the_type_reason() {
        assert_eq!(reasons(&json!({ "message": 123 })), vec![REASON_NOT_STRING]);
        assert_eq!(reasons(&json!({})), vec![REASON_NOT_STRING]);
    }

    #[test]
    fn history_is_parsed_in_order() {
        let input = validate(&json!({
            "message": "and now?",
            "history": [
                { "role": "user", "content": "hi" },
                { "role": "assistant", "content": "hello" }
            ]
        }))
        .unwrap();
        assert_eq!(
            input.history,
            vec![PromptTurn::user("hi"), PromptTurn::assistant("hello")]
        );
    }

    #[test]
    fn null_history_is_absent() {
        let input = validate(&json!({ "message": "x", "history": null })).unwrap();
        assert!(input.history.is_empty());
    }

    #[test]
    fn malformed_history_is_rejected_alongside_message_errors() {
        let r = reasons(&json!({
            "message": 5,
            "history": [{ "role": "system", "content": "x" }]
        }));
        assert!(r.contains(&REASON_NOT_STRING.to_string()));
        assert!(r.contains(&REASON_HISTORY.to_string()));

        let r = reasons(&json!({ "message": "ok", "history": "nope" }));
        assert_eq!(r, vec![REASON_HISTORY]);
    }

    proptest! {
        #[test]
        fn prop_accepts_nonblank_within_limit(s in "[a-zA-Z0-9 ]{0,1990}[a-zA-Z0-9]") {
            let input = validate(&json!({ "message": format!("  {s}  ") })).unwrap();
            prop_assert_eq!(input.message, s.trim());
        }

        #[test]
        fn prop_rejects_whitespace_only(s in "[ \t\n\r]{0,50}") {
            let r = reasons(&json!({ "message": s }));
            prop_assert!(!r.is_empty());
        }

        #[test]
        fn prop_rejects_too_long(extra in 1usize..200) {
            let msg = "x".repeat(MAX_MESSAGE_CHARS + extra);
            prop_assert_eq!(reasons(&json!({ "message": msg })), vec![REASON_LENGTH.to_string()]);
        }

        #[test]
        fn prop_rejects_numbers(n in any::<i64>()) {
            let r = reasons(&json!({ "message": n }));
            prop_assert_eq!(r, vec![REASON_NOT_STRING.to_string()]);
        }
    }
}
