//! Core types for the icon resolver

use serde::{Deserialize, Serialize};

use crate::emoji;

/// Rule source that produced a resolved icon.
///
/// Ordering follows precedence: the lowest value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOrigin {
    /// Icon assigned directly to the exact path (highest priority)
    Explicit = 0,
    /// `icon` field in the document frontmatter
    Frontmatter = 1,
    /// Criteria-based frontmatter rule
    FrontmatterRule = 2,
    /// User-authored pattern rule
    CustomRule = 3,
    /// Inherited from the nearest ancestor folder (lowest priority)
    Inherited = 4,
}

impl RuleOrigin {
    /// Get a human-readable name for the origin
    pub fn name(&self) -> &'static str {
        match self {
            RuleOrigin::Explicit => "Explicit",
            RuleOrigin::Frontmatter => "Frontmatter",
            RuleOrigin::FrontmatterRule => "Frontmatter Rule",
            RuleOrigin::CustomRule => "Custom Rule",
            RuleOrigin::Inherited => "Inherited",
        }
    }
}

/// Whether a path names a file or a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathKind {
    File,
    Folder,
}

/// Discriminant of an [`IconReference`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    PackIcon,
    Emoji,
    None,
}

/// The resolved identity of an icon for a path or marker.
///
/// A pack icon carries its prefixed name, an emoji its literal glyph; `None`
/// carries neither.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IconReference {
    #[serde(rename_all = "camelCase")]
    PackIcon {
        icon_name_with_prefix: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<RuleOrigin>,
    },
    #[serde(rename_all = "camelCase")]
    Emoji {
        raw_glyph: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<RuleOrigin>,
    },
    None,
}

impl IconReference {
    /// Classify a candidate icon string.
    ///
    /// Emoji sequences become [`IconReference::Emoji`], any other non-empty
    /// string is taken as a pack-prefixed icon name.
    pub fn from_candidate(
        candidate: &str,
        color: Option<String>,
        origin: Option<RuleOrigin>,
    ) -> Self {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return IconReference::None;
        }

        let color = color.map(|c| normalize_color(&c));
        if emoji::is_emoji(candidate) {
            IconReference::Emoji {
                raw_glyph: candidate.to_string(),
                color,
                origin,
            }
        } else {
            IconReference::PackIcon {
                icon_name_with_prefix: candidate.to_string(),
                color,
                origin,
            }
        }
    }

    pub fn kind(&self) -> IconKind {
        match self {
            IconReference::PackIcon { .. } => IconKind::PackIcon,
            IconReference::Emoji { .. } => IconKind::Emoji,
            IconReference::None => IconKind::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, IconReference::None)
    }

    pub fn icon_name_with_prefix(&self) -> Option<&str> {
        match self {
            IconReference::PackIcon { icon_name_with_prefix, .. } => Some(icon_name_with_prefix),
            _ => None,
        }
    }

    pub fn raw_glyph(&self) -> Option<&str> {
        match self {
            IconReference::Emoji { raw_glyph, .. } => Some(raw_glyph),
            _ => None,
        }
    }

    /// The pack icon name or emoji glyph, whichever is present
    pub fn icon(&self) -> Option<&str> {
        self.icon_name_with_prefix().or_else(|| self.raw_glyph())
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            IconReference::PackIcon { color, .. } | IconReference::Emoji { color, .. } => {
                color.as_deref()
            }
            IconReference::None => None,
        }
    }

    pub fn origin(&self) -> Option<RuleOrigin> {
        match self {
            IconReference::PackIcon { origin, .. } | IconReference::Emoji { origin, .. } => *origin,
            IconReference::None => None,
        }
    }

    /// Replace the colour; `None` references stay colourless.
    pub fn with_color(mut self, new_color: Option<String>) -> Self {
        match &mut self {
            IconReference::PackIcon { color, .. } | IconReference::Emoji { color, .. } => {
                *color = new_color.map(|c| normalize_color(&c));
            }
            IconReference::None => {}
        }
        self
    }

    /// Parsed pack prefix and name, for pack icons with a recognisable prefix
    pub fn icon_name(&self) -> Option<IconName> {
        self.icon_name_with_prefix().and_then(IconName::parse)
    }
}

impl Default for IconReference {
    fn default() -> Self {
        IconReference::None
    }
}

/// A pack-prefixed icon name such as `LiBookOpen` split into `Li` + `BookOpen`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconName {
    pub prefix: String,
    pub name: String,
}

impl IconName {
    /// Split at the first uppercase letter or digit after the first character.
    pub fn parse(icon_name_with_prefix: &str) -> Option<Self> {
        let mut chars = icon_name_with_prefix.char_indices();
        chars.next()?;
        let (split, _) = chars.find(|(_, c)| c.is_ascii_uppercase() || c.is_ascii_digit())?;

        Some(Self {
            prefix: icon_name_with_prefix[..split].to_string(),
            name: icon_name_with_prefix[split..].to_string(),
        })
    }

    pub fn with_prefix(&self) -> String {
        format!("{}{}", self.prefix, self.name)
    }
}

/// Normalise a colour string: bare hexadecimal gets a leading `#`.
pub fn normalize_color(color: &str) -> String {
    let trimmed = color.trim();
    let is_bare_hex = matches!(trimmed.len(), 3 | 4 | 6 | 8)
        && trimmed.chars().all(|c| c.is_ascii_hexdigit());
    if is_bare_hex {
        format!("#{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Statistics about the cache and resolution activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStatistics {
    /// Number of cached entries
    pub entries: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that required resolution
    pub misses: u64,
    /// Resolver invocations
    pub resolutions: u64,
    /// Cache writes
    pub writes: u64,
    /// Entries removed by invalidation
    pub invalidations: u64,
}

impl CacheStatistics {
    /// Fraction of lookups answered from the cache, if any lookup happened
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        if total == 0 {
            None
        } else {
            Some(self.hits as f64 / total as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_origin_precedence_ordering() {
        let mut origins = vec![
            RuleOrigin::Inherited,
            RuleOrigin::CustomRule,
            RuleOrigin::Explicit,
            RuleOrigin::FrontmatterRule,
            RuleOrigin::Frontmatter,
        ];
        origins.sort();
        assert_eq!(
            origins,
            vec![
                RuleOrigin::Explicit,
                RuleOrigin::Frontmatter,
                RuleOrigin::FrontmatterRule,
                RuleOrigin::CustomRule,
                RuleOrigin::Inherited,
            ]
        );
    }

    #[test]
    fn test_from_candidate_classification() {
        let pack = IconReference::from_candidate("LiBook", None, None);
        assert_eq!(pack.kind(), IconKind::PackIcon);
        assert_eq!(pack.icon_name_with_prefix(), Some("LiBook"));
        assert_eq!(pack.raw_glyph(), None);

        let glyph =
            IconReference::from_candidate("👍", Some("ff0000".into()), Some(RuleOrigin::Explicit));
        assert_eq!(glyph.kind(), IconKind::Emoji);
        assert_eq!(glyph.raw_glyph(), Some("👍"));
        assert_eq!(glyph.icon_name_with_prefix(), None);
        assert_eq!(glyph.color(), Some("#ff0000"));

        let none = IconReference::from_candidate("   ", Some("red".into()), None);
        assert!(none.is_none());
        assert_eq!(none.color(), None);
    }

    #[test]
    fn test_icon_name_parse() {
        let name = IconName::parse("IbTest").unwrap();
        assert_eq!(name.prefix, "Ib");
        assert_eq!(name.name, "Test");

        let name = IconName::parse("LiBookOpen").unwrap();
        assert_eq!(name.prefix, "Li");
        assert_eq!(name.name, "BookOpen");
        assert_eq!(name.with_prefix(), "LiBookOpen");

        let name = IconName::parse("Fas0Circle").unwrap();
        assert_eq!(name.prefix, "Fas");

        assert_eq!(IconName::parse("lowercase"), None);
        assert_eq!(IconName::parse(""), None);
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("ff0000"), "#ff0000");
        assert_eq!(normalize_color("#ff0000"), "#ff0000");
        assert_eq!(normalize_color("red"), "red");
        assert_eq!(normalize_color("rgb(0, 0, 0)"), "rgb(0, 0, 0)");
    }

    #[test]
    fn test_serde_shape() {
        let reference = IconReference::from_candidate("LiStar", None, Some(RuleOrigin::CustomRule));
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["kind"], "packIcon");
        assert_eq!(json["iconNameWithPrefix"], "LiStar");
        assert_eq!(json["origin"], "customRule");

        let back: IconReference = serde_json::from_value(json).unwrap();
        assert_eq!(back, reference);
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStatistics::default();
        assert_eq!(stats.hit_rate(), None);
        stats.hits = 3;
        stats.misses = 1;
        assert_eq!(stats.hit_rate(), Some(0.75));
    }
}
