//! Events emitted by a task executor over the lifetime of one invocation.

use serde::{Deserialize, Serialize};

/// A single event from an executor's stream.
///
/// Exactly one [`TaskEvent::Completion`] terminates a well-formed stream.
/// The other variants report in-progress activity that consumers may
/// ignore when only the terminal payload matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// The executor accepted the instruction and started working.
    Started { model: String },

    /// Free-form progress notice.
    Progress { message: String },

    /// The executor invoked an external tool.
    ToolUse { name: String },

    /// Terminal event carrying the final textual output.
    Completion { content: String },
}

impl TaskEvent {
    pub fn completion(content: impl Into<String>) -> Self {
        Self::Completion {
            content: content.into(),
        }
    }

    /// Whether this event terminates the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_is_terminal() {
        assert!(TaskEvent::completion("done").is_terminal());
        assert!(!TaskEvent::Started {
            model: "m".into()
        }
        .is_terminal());
        assert!(!TaskEvent::Progress {
            message: "working".into()
        }
        .is_terminal());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(TaskEvent::completion("final output")).unwrap();
        assert_eq!(json["type"], "completion");
        assert_eq!(json["content"], "final output");

        let json = serde_json::to_value(TaskEvent::ToolUse {
            name: "web_search".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "tool_use");
        assert_eq!(json["name"], "web_search");
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: TaskEvent =
            serde_json::from_str(r#"{"type":"completion","content":"report text"}"#).unwrap();
        assert_eq!(event, TaskEvent::completion("report text"));
    }
}
