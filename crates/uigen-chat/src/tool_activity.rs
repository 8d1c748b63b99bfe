//! Tool call activity lines
//!
//! Maps a tool call from the generation model to the one-line summary shown in
//! the chat transcript. Pure lookup; no state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a tool call does to the virtual file system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Modifies an existing file
    Edit,
    /// Writes a new file
    Create,
    /// Reads a file
    Read,
    /// Anything else
    Other,
}

/// Lifecycle state of a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCallState {
    /// Arguments still streaming or call still running
    PartialCall,
    /// Call returned
    Result,
}

/// User-facing summary of a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolActivity {
    /// Icon family
    pub kind: ActivityKind,
    /// Headline, e.g. `Editing file: Card.tsx`
    pub message: String,
    /// Secondary line shown while the call runs
    pub description: String,
}

/// Summarize a tool call from its name and JSON arguments
#[must_use]
pub fn describe(tool_name: &str, args: Option<&Value>) -> ToolActivity {
    let file = args.and_then(file_name);
    let (kind, verb, noun, description) = match tool_name {
        "str_replace_editor" | "str_replace_based_edit_tool" | "edit_file" => {
            (ActivityKind::Edit, "Editing", "file", "Making changes to the code")
        }
        "create_file" | "write_file" => {
            (ActivityKind::Create, "Creating", "file", "Writing new code")
        }
        "read_file" | "view_file" => (ActivityKind::Read, "Reading", "file", "Examining the code"),
        other => {
            return ToolActivity {
                kind: ActivityKind::Other,
                message: title_case(&other.replace('_', " ")),
                description: "Processing...".to_string(),
            }
        }
    };

    let message = match file {
        Some(name) => format!("{verb} {noun}: {name}"),
        None => format!("{verb} {noun}"),
    };
    ToolActivity {
        kind,
        message,
        description: description.to_string(),
    }
}

/// Whether the call finished with a usable result
#[must_use]
pub fn is_complete(state: ToolCallState, result: Option<&Value>) -> bool {
    state == ToolCallState::Result && result.is_some_and(is_truthy)
}

/// Last path segment of `args.path`, falling back to `args.file_path`
fn file_name(args: &Value) -> Option<String> {
    let path = ["path", "file_path"]
        .iter()
        .filter_map(|key| args.get(*key).and_then(Value::as_str))
        .find(|p| !p.is_empty())?;
    path.rsplit('/').next().map(str::to_string)
}

/// Uppercase the first word character after every word boundary
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_word = false;
    for c in text.chars() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edit_tools_name_the_file() {
        for tool in ["str_replace_editor", "str_replace_based_edit_tool", "edit_file"] {
            let activity = describe(tool, Some(&json!({"path": "/src/components/Card.tsx"})));
            assert_eq!(activity.kind, ActivityKind::Edit);
            assert_eq!(activity.message, "Editing file: Card.tsx");
            assert_eq!(activity.description, "Making changes to the code");
        }
    }

    #[test]
    fn file_path_is_a_fallback() {
        let activity = describe("write_file", Some(&json!({"file_path": "/src/utils/helpers.ts"})));
        assert_eq!(activity.message, "Creating file: helpers.ts");
        assert_eq!(activity.description, "Writing new code");

        let activity = describe("view_file", Some(&json!({"path": "", "file_path": "README.md"})));
        assert_eq!(activity.message, "Reading file: README.md");
        assert_eq!(activity.description, "Examining the code");
    }

    #[test]
    fn missing_path_drops_file_name() {
        let activity = describe("str_replace_editor", Some(&json!({})));
        assert_eq!(activity.message, "Editing file");

        let activity = describe("create_file", None);
        assert_eq!(activity.message, "Creating file");
    }

    #[test]
    fn unknown_tools_are_title_cased() {
        let activity = describe("unknown_tool_name", None);
        assert_eq!(activity.kind, ActivityKind::Other);
        assert_eq!(activity.message, "Unknown Tool Name");
        assert_eq!(activity.description, "Processing...");
    }

    #[test]
    fn completion_needs_result_state_and_value() {
        let ok = json!({"success": true});
        assert!(is_complete(ToolCallState::Result, Some(&ok)));
        assert!(!is_complete(ToolCallState::PartialCall, Some(&ok)));
        assert!(!is_complete(ToolCallState::Result, None));
        assert!(!is_complete(ToolCallState::Result, Some(&Value::Null)));
        assert!(!is_complete(ToolCallState::Result, Some(&json!(""))));
        assert!(is_complete(ToolCallState::Result, Some(&json!("done"))));
    }

    proptest::proptest! {
        #[test]
        fn prop_unknown_names_lose_underscores(name in "[a-z][a-z_]{0,20}") {
            let activity = describe(&name, None);
            proptest::prop_assume!(activity.kind == ActivityKind::Other);
            proptest::prop_assert!(!activity.message.contains('_'));
            proptest::prop_assert_eq!(activity.message.len(), name.len());
            proptest::prop_assert!(activity.message.starts_with(|c: char| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn state_uses_wire_names() {
        let state: ToolCallState = serde_json::from_str("\"partial-call\"").unwrap();
        assert_eq!(state, ToolCallState::PartialCall);
    }
}
