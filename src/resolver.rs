//! Icon identity resolution
//!
//! Each [`RuleSource`] offers at most one candidate for a path. Sources are
//! consulted in precedence order (see [`RuleOrigin`]); the first candidate
//! supplies the icon. Colour resolves independently: the first candidate that
//! carries a colour supplies it, unless the configuration couples colour to
//! the icon's source.

use smallvec::SmallVec;

use crate::config::ResolverConfig;
use crate::frontmatter::{FrontmatterRuleSet, FrontmatterStore};
use crate::rules::CustomRuleSet;
use crate::snapshot::{AssignmentStore, RuleSnapshot};
use crate::types::{IconReference, PathKind, RuleOrigin};
use crate::utils::path::ancestors;

/// A capability that may supply an icon candidate for a path
#[derive(Debug, Clone, Copy)]
pub enum RuleSource<'a> {
    /// Icon assigned to this exact path
    ExplicitAssignment(&'a AssignmentStore),
    /// `icon`/`iconColor` fields of the document frontmatter
    FrontmatterOverride(&'a FrontmatterStore),
    /// Criteria rules evaluated over the document frontmatter
    FrontmatterRules {
        rules: &'a FrontmatterRuleSet,
        frontmatter: &'a FrontmatterStore,
    },
    /// User pattern rules, first match wins
    CustomRuleSet(&'a CustomRuleSet),
    /// Inheritance icons keyed by folder, nearest ancestor wins
    FolderInheritance(&'a AssignmentStore),
}

/// Icon and colour offered by one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub icon: String,
    pub color: Option<String>,
}

impl Candidate {
    fn new(icon: &str, color: Option<&str>) -> Option<Self> {
        if icon.trim().is_empty() {
            return None;
        }
        Some(Self {
            icon: icon.to_string(),
            color: color.filter(|c| !c.trim().is_empty()).map(str::to_string),
        })
    }
}

impl<'a> RuleSource<'a> {
    pub fn origin(&self) -> RuleOrigin {
        match self {
            RuleSource::ExplicitAssignment(_) => RuleOrigin::Explicit,
            RuleSource::FrontmatterOverride(_) => RuleOrigin::Frontmatter,
            RuleSource::FrontmatterRules { .. } => RuleOrigin::FrontmatterRule,
            RuleSource::CustomRuleSet(_) => RuleOrigin::CustomRule,
            RuleSource::FolderInheritance(_) => RuleOrigin::Inherited,
        }
    }

    fn is_enabled(&self, config: &ResolverConfig) -> bool {
        match self {
            RuleSource::FrontmatterOverride(_) => config.frontmatter_enabled,
            RuleSource::FrontmatterRules { .. } => {
                config.frontmatter_enabled && config.frontmatter_rules_enabled
            }
            RuleSource::FolderInheritance(_) => config.inheritance_enabled,
            RuleSource::ExplicitAssignment(_) | RuleSource::CustomRuleSet(_) => true,
        }
    }

    /// The candidate this source offers for `path`, if any
    pub fn candidate(
        &self,
        path: &str,
        kind: PathKind,
        config: &ResolverConfig,
    ) -> Option<Candidate> {
        match self {
            RuleSource::ExplicitAssignment(store) => {
                let assignment = store.get(path)?;
                Candidate::new(&assignment.icon, assignment.color.as_deref())
            }
            RuleSource::FrontmatterOverride(store) => {
                let found = store.icon_for(
                    path,
                    &config.frontmatter_icon_field,
                    &config.frontmatter_color_field,
                )?;
                Candidate::new(&found.icon, found.color.as_deref())
            }
            RuleSource::FrontmatterRules { rules, frontmatter } => {
                let rule = rules.first_match(kind, frontmatter.get(path))?;
                Candidate::new(&rule.icon, rule.color.as_deref())
            }
            RuleSource::CustomRuleSet(rules) => {
                let rule = rules.first_match(path, kind)?;
                Candidate::new(&rule.icon, rule.color.as_deref())
            }
            RuleSource::FolderInheritance(store) => ancestors(path).find_map(|folder| {
                let assignment = store.get(folder)?;
                Candidate::new(&assignment.icon, assignment.color.as_deref())
            }),
        }
    }
}

/// Every source of a snapshot, in precedence order
pub fn rule_sources(snapshot: &RuleSnapshot) -> SmallVec<[RuleSource<'_>; 5]> {
    smallvec::smallvec![
        RuleSource::ExplicitAssignment(&snapshot.assignments),
        RuleSource::FrontmatterOverride(&snapshot.frontmatter),
        RuleSource::FrontmatterRules {
            rules: &snapshot.frontmatter_rules,
            frontmatter: &snapshot.frontmatter,
        },
        RuleSource::CustomRuleSet(&snapshot.custom_rules),
        RuleSource::FolderInheritance(&snapshot.inheritance),
    ]
}

/// Resolve the icon for `path` from `sources`.
///
/// Never fails: a path no source covers resolves to [`IconReference::None`].
pub fn resolve(
    path: &str,
    kind: PathKind,
    sources: &[RuleSource<'_>],
    config: &ResolverConfig,
) -> IconReference {
    let mut ordered: SmallVec<[&RuleSource<'_>; 5]> =
        sources.iter().filter(|s| s.is_enabled(config)).collect();
    ordered.sort_by_key(|source| source.origin());

    let mut icon: Option<(String, RuleOrigin)> = None;
    let mut color: Option<String> = None;

    for source in ordered {
        let Some(candidate) = source.candidate(path, kind, config) else {
            continue;
        };

        if icon.is_none() {
            icon = Some((candidate.icon, source.origin()));
            color = candidate.color;
            if config.couple_color_with_icon {
                break;
            }
        } else if color.is_none() {
            color = candidate.color;
        }

        if color.is_some() {
            break;
        }
    }

    let Some((icon, origin)) = icon else {
        log::trace!("No icon applies to {}", path);
        return IconReference::None;
    };

    let color = color.or_else(|| config.default_color());
    let reference = IconReference::from_candidate(&icon, color, Some(origin));
    log::debug!("Resolved {} -> {:?} ({})", path, reference.icon(), origin.name());
    reference
}

/// Resolve `path` against every source of `snapshot`
pub fn resolve_in(path: &str, snapshot: &RuleSnapshot, config: &ResolverConfig) -> IconReference {
    let sources = rule_sources(snapshot);
    resolve(path, snapshot.path_kind(path), &sources, config)
}
