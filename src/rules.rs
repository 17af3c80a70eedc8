//! User-authored custom rules

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{IconResolverError, Result};
use crate::types::PathKind;
use crate::utils::path::file_name;

/// Which kind of path a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleTarget {
    #[default]
    Everything,
    Files,
    Folders,
}

impl RuleTarget {
    pub fn matches(&self, kind: PathKind) -> bool {
        match self {
            RuleTarget::Everything => true,
            RuleTarget::Files => kind == PathKind::File,
            RuleTarget::Folders => kind == PathKind::Folder,
        }
    }
}

/// A pattern-to-icon mapping authored by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRule {
    /// Regular expression matched against the name (or full path)
    pub rule: String,
    /// Icon applied on match
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Match against the full path instead of the last segment
    #[serde(default)]
    pub use_file_path: bool,
    #[serde(default, rename = "for")]
    pub target: RuleTarget,
    /// Evaluation order, ascending
    #[serde(default)]
    pub order: i64,
}

impl CustomRule {
    pub fn new(rule: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            icon: icon.into(),
            color: None,
            use_file_path: false,
            target: RuleTarget::Everything,
            order: 0,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_file_path(mut self) -> Self {
        self.use_file_path = true;
        self
    }

    pub fn with_target(mut self, target: RuleTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Compile the rule pattern
    pub fn compile(&self) -> Result<Regex> {
        Regex::new(&self.rule).map_err(|source| IconResolverError::MalformedRule {
            pattern: self.rule.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: CustomRule,
    /// `None` when the pattern is malformed; such a rule never matches
    matcher: Option<Regex>,
}

impl CompiledRule {
    fn matches(&self, path: &str, kind: PathKind) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };
        if !self.rule.target.matches(kind) {
            return false;
        }

        let subject = if self.rule.use_file_path { path } else { file_name(path) };
        matcher.is_match(subject)
    }
}

/// Custom rules in evaluation order with their patterns compiled once
#[derive(Debug, Clone, Default)]
pub struct CustomRuleSet {
    rules: Vec<CompiledRule>,
}

impl CustomRuleSet {
    /// Sort rules by `order` (stable) and compile their patterns.
    ///
    /// Malformed patterns are kept but never match.
    pub fn new(mut rules: Vec<CustomRule>) -> Self {
        rules.sort_by_key(|rule| rule.order);

        let rules = rules
            .into_iter()
            .map(|rule| {
                let matcher = match rule.compile() {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        log::warn!("Skipping custom rule: {}", e);
                        None
                    }
                };
                CompiledRule { rule, matcher }
            })
            .collect();

        Self { rules }
    }

    /// First rule (in order) matching the path
    pub fn first_match(&self, path: &str, kind: PathKind) -> Option<&CustomRule> {
        self.rules
            .iter()
            .find(|compiled| compiled.matches(path, kind))
            .map(|compiled| &compiled.rule)
    }

    /// Every rule matching the path, in order
    pub fn matches<'a>(
        &'a self,
        path: &'a str,
        kind: PathKind,
    ) -> impl Iterator<Item = &'a CustomRule> + 'a {
        self.rules
            .iter()
            .filter(move |compiled| compiled.matches(path, kind))
            .map(|compiled| &compiled.rule)
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &CustomRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Number of rules whose pattern failed to compile
    pub fn malformed_count(&self) -> usize {
        self.rules.iter().filter(|compiled| compiled.matcher.is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
