//! Rule-source snapshot queried by the resolver
//!
//! The host fills the snapshot from its settings and metadata layers; the
//! resolver only reads it.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::frontmatter::{Frontmatter, FrontmatterRule, FrontmatterRuleSet, FrontmatterStore};
use crate::rules::{CustomRule, CustomRuleSet};
use crate::types::PathKind;
use crate::utils::path::{is_same_or_descendant, rebase, remove_tree_keys, rename_tree_keys};

/// An icon (and optional colour) attached to a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconAssignment {
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl IconAssignment {
    pub fn new(icon: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Icons keyed by exact path
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    entries: AHashMap<String, IconAssignment>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, assignment: IconAssignment) {
        self.entries.insert(path.into(), assignment);
    }

    pub fn get(&self, path: &str) -> Option<&IconAssignment> {
        self.entries.get(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<IconAssignment> {
        self.entries.remove(path)
    }

    pub fn remove_tree(&mut self, root: &str) -> usize {
        remove_tree_keys(&mut self.entries, root)
    }

    pub fn rename_tree(&mut self, from: &str, to: &str) -> usize {
        rename_tree_keys(&mut self.entries, from, to)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IconAssignment)> {
        self.entries.iter().map(|(path, assignment)| (path.as_str(), assignment))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the resolver needs to know about the current rule state
#[derive(Debug, Clone, Default)]
pub struct RuleSnapshot {
    /// Icons assigned directly to a path
    pub assignments: AssignmentStore,
    /// Document frontmatter keyed by path
    pub frontmatter: FrontmatterStore,
    pub frontmatter_rules: FrontmatterRuleSet,
    pub custom_rules: CustomRuleSet,
    /// Inheritance icons keyed by folder path
    pub inheritance: AssignmentStore,
    folders: AHashSet<String>,
}

impl RuleSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, path: impl Into<String>, assignment: IconAssignment) -> &mut Self {
        self.assignments.set(path, assignment);
        self
    }

    pub fn set_frontmatter(
        &mut self,
        path: impl Into<String>,
        frontmatter: Frontmatter,
    ) -> &mut Self {
        self.frontmatter.set(path, frontmatter);
        self
    }

    /// Replace the custom rules, recompiling their patterns
    pub fn set_custom_rules(&mut self, rules: Vec<CustomRule>) -> &mut Self {
        self.custom_rules = CustomRuleSet::new(rules);
        self
    }

    pub fn set_frontmatter_rules(&mut self, rules: Vec<FrontmatterRule>) -> &mut Self {
        self.frontmatter_rules = FrontmatterRuleSet::new(rules);
        self
    }

    /// Let `folder` pass `assignment` to every descendant
    pub fn inherit(&mut self, folder: impl Into<String>, assignment: IconAssignment) -> &mut Self {
        let folder = folder.into();
        self.folders.insert(folder.clone());
        self.inheritance.set(folder, assignment);
        self
    }

    /// Record that `path` is a folder
    pub fn mark_folder(&mut self, path: impl Into<String>) -> &mut Self {
        self.folders.insert(path.into());
        self
    }

    pub fn path_kind(&self, path: &str) -> PathKind {
        if self.folders.contains(path) {
            PathKind::Folder
        } else {
            PathKind::File
        }
    }

    /// Move all per-path state from `from` (and beneath) to `to`
    pub fn rename_path(&mut self, from: &str, to: &str) {
        let moved = self.assignments.rename_tree(from, to)
            + self.frontmatter.rename_tree(from, to)
            + self.inheritance.rename_tree(from, to);

        let folders: Vec<String> = self
            .folders
            .iter()
            .filter(|path| is_same_or_descendant(path, from))
            .cloned()
            .collect();
        for old in folders {
            self.folders.remove(&old);
            if let Some(new) = rebase(&old, from, to) {
                self.folders.insert(new);
            }
        }

        log::debug!("Moved {} rule entries from {} to {}", moved, from, to);
    }

    /// Drop all per-path state for `path` and beneath
    pub fn remove_path(&mut self, path: &str) {
        let removed = self.assignments.remove_tree(path)
            + self.frontmatter.remove_tree(path)
            + self.inheritance.remove_tree(path);
        self.folders.retain(|folder| !is_same_or_descendant(folder, path));

        log::debug!("Removed {} rule entries under {}", removed, path);
    }
}
