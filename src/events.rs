//! Domain events that can change resolution

use serde::{Deserialize, Serialize};

/// Events the facade reacts to synchronously
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IconEvent {
    /// Custom or frontmatter rules were edited
    RuleChanged,
    /// An explicit or inheritance icon was set or removed on a path
    AssignmentChanged { path: String },
    /// A document's frontmatter changed
    FrontmatterChanged { path: String },
    /// A file or folder moved
    FileRenamed { from: String, to: String },
    /// A file or folder was deleted
    FileDeleted { path: String },
    /// An icon pack finished (re)loading
    PackReloaded,
    /// Settings were reset or replaced
    SettingsReset,
}

impl IconEvent {
    /// Whether the event can affect any path
    pub fn is_global(&self) -> bool {
        matches!(
            self,
            IconEvent::RuleChanged | IconEvent::PackReloaded | IconEvent::SettingsReset
        )
    }

    /// Roots whose cached subtrees become stale
    pub fn affected_roots(&self) -> Vec<&str> {
        match self {
            IconEvent::AssignmentChanged { path }
            | IconEvent::FrontmatterChanged { path }
            | IconEvent::FileDeleted { path } => vec![path.as_str()],
            IconEvent::FileRenamed { from, to } => vec![from.as_str(), to.as_str()],
            IconEvent::RuleChanged | IconEvent::PackReloaded | IconEvent::SettingsReset => {
                Vec::new()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IconEvent::RuleChanged => "rule changed",
            IconEvent::AssignmentChanged { .. } => "assignment changed",
            IconEvent::FrontmatterChanged { .. } => "frontmatter changed",
            IconEvent::FileRenamed { .. } => "file renamed",
            IconEvent::FileDeleted { .. } => "file deleted",
            IconEvent::PackReloaded => "pack reloaded",
            IconEvent::SettingsReset => "settings reset",
        }
    }
}
