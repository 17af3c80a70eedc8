//! Frontmatter-driven icons: the per-file override fields and criteria rules

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::rules::RuleTarget;
use crate::types::PathKind;
use crate::utils::path::{remove_tree_keys, rename_tree_keys};

/// Parsed frontmatter of a single document
pub type Frontmatter = Map<String, Value>;

/// Icon and colour read from a document's frontmatter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterIcon {
    pub icon: String,
    pub color: Option<String>,
}

/// Frontmatter of every document known to the host, keyed by path
#[derive(Debug, Clone, Default)]
pub struct FrontmatterStore {
    entries: AHashMap<String, Frontmatter>,
}

impl FrontmatterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, frontmatter: Frontmatter) {
        self.entries.insert(path.into(), frontmatter);
    }

    pub fn remove(&mut self, path: &str) -> Option<Frontmatter> {
        self.entries.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&Frontmatter> {
        self.entries.get(path)
    }

    /// Override icon for `path` from the configured fields.
    ///
    /// A missing, empty or non-string icon field yields nothing; a non-string
    /// colour field is ignored.
    pub fn icon_for(
        &self,
        path: &str,
        icon_field: &str,
        color_field: &str,
    ) -> Option<FrontmatterIcon> {
        let frontmatter = self.entries.get(path)?;

        let icon = match frontmatter.get(icon_field)? {
            Value::String(icon) if !icon.trim().is_empty() => icon.clone(),
            Value::String(_) | Value::Null => return None,
            other => {
                log::warn!(
                    "Frontmatter field `{}` of {} must be text, got {}",
                    icon_field,
                    path,
                    other
                );
                return None;
            }
        };

        let color = match frontmatter.get(color_field) {
            Some(Value::String(color)) if !color.trim().is_empty() => Some(color.clone()),
            Some(Value::String(_)) | Some(Value::Null) | None => None,
            Some(other) => {
                log::warn!(
                    "Frontmatter field `{}` of {} must be text, got {}",
                    color_field,
                    path,
                    other
                );
                None
            }
        };

        Some(FrontmatterIcon { icon, color })
    }

    /// Drop `root` and everything beneath it
    pub fn remove_tree(&mut self, root: &str) -> usize {
        remove_tree_keys(&mut self.entries, root)
    }

    /// Move `from` and everything beneath it to `to`
    pub fn rename_tree(&mut self, from: &str, to: &str) -> usize {
        rename_tree_keys(&mut self.entries, from, to)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Comparison applied to a frontmatter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CriterionOperator {
    Exists,
    NotExists,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Contains,
    NotContains,
}

/// A single condition on a frontmatter field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub field: String,
    pub operator: CriterionOperator,
    #[serde(default)]
    pub value: Value,
}

impl Criterion {
    pub fn new(
        field: impl Into<String>,
        operator: CriterionOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate against the field value (`None` when the field is absent)
    pub fn evaluate(&self, field_value: Option<&Value>) -> bool {
        let present = field_value.filter(|v| !v.is_null());

        match self.operator {
            CriterionOperator::Exists => present.is_some(),
            CriterionOperator::NotExists => present.is_none(),
            CriterionOperator::Equals => field_value == Some(&self.value),
            CriterionOperator::NotEquals => field_value != Some(&self.value),
            CriterionOperator::GreaterThan => compare_numbers(present, &self.value, |a, b| a > b),
            CriterionOperator::LessThan => compare_numbers(present, &self.value, |a, b| a < b),
            CriterionOperator::GreaterEqual => compare_numbers(present, &self.value, |a, b| a >= b),
            CriterionOperator::LessEqual => compare_numbers(present, &self.value, |a, b| a <= b),
            CriterionOperator::Contains => match (present, &self.value) {
                (Some(Value::String(haystack)), Value::String(needle)) => {
                    haystack.contains(needle.as_str())
                }
                _ => false,
            },
            CriterionOperator::NotContains => match (present, &self.value) {
                (Some(Value::String(haystack)), Value::String(needle)) => {
                    !haystack.contains(needle.as_str())
                }
                _ => false,
            },
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| !n.is_nan())
}

fn compare_numbers(
    field_value: Option<&Value>,
    expected: &Value,
    cmp: impl Fn(f64, f64) -> bool,
) -> bool {
    match (field_value.and_then(as_number), as_number(expected)) {
        (Some(actual), Some(expected)) => cmp(actual, expected),
        _ => false,
    }
}

fn default_enabled() -> bool {
    true
}

/// Frontmatter only exists on files
fn default_target() -> RuleTarget {
    RuleTarget::Files
}

/// Assigns an icon to documents whose frontmatter satisfies every criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontmatterRule {
    #[serde(default)]
    pub name: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "default_target", rename = "for")]
    pub target: RuleTarget,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl FrontmatterRule {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            color: None,
            target: default_target(),
            enabled: true,
            order: 0,
            criteria: Vec::new(),
        }
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
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

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether the rule applies to a path of `kind` with the given frontmatter
    pub fn is_applicable(&self, kind: PathKind, frontmatter: Option<&Frontmatter>) -> bool {
        if !self.enabled || !self.target.matches(kind) {
            return false;
        }
        if kind == PathKind::Folder {
            return true;
        }

        match frontmatter {
            Some(frontmatter) => self
                .criteria
                .iter()
                .all(|criterion| criterion.evaluate(frontmatter.get(&criterion.field))),
            None => self
                .criteria
                .iter()
                .all(|criterion| criterion.operator == CriterionOperator::NotExists),
        }
    }
}

/// Enabled frontmatter rules in evaluation order
#[derive(Debug, Clone, Default)]
pub struct FrontmatterRuleSet {
    rules: Vec<FrontmatterRule>,
}

impl FrontmatterRuleSet {
    pub fn new(mut rules: Vec<FrontmatterRule>) -> Self {
        rules.retain(|rule| rule.enabled);
        rules.sort_by_key(|rule| rule.order);
        Self { rules }
    }

    pub fn first_match(
        &self,
        kind: PathKind,
        frontmatter: Option<&Frontmatter>,
    ) -> Option<&FrontmatterRule> {
        self.rules.iter().find(|rule| rule.is_applicable(kind, frontmatter))
    }

    pub fn rules(&self) -> &[FrontmatterRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
