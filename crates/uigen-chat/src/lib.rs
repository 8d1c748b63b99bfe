//! UIGen Chat - presentation helpers for the chat transcript
//!
//! Currently one concern: turning a tool call into the activity line the
//! transcript shows while the model edits the virtual file system.
//!
//! ```rust
//! use uigen_chat::{describe, ActivityKind};
//!
//! let args = serde_json::json!({"path": "/src/App.tsx"});
//! let activity = describe("create_file", Some(&args));
//! assert_eq!(activity.kind, ActivityKind::Create);
//! assert_eq!(activity.message, "Creating file: App.tsx");
//! ```

#![warn(unreachable_pub)]

pub mod tool_activity;

pub use tool_activity::{describe, is_complete, ActivityKind, ToolActivity, ToolCallState};
