//! Inline icon markers in document text

use std::ops::Range;

use regex::Regex;

use crate::config::ResolverConfig;
use crate::emoji;
use crate::error::{IconResolverError, Result};
use crate::types::{IconReference, RuleOrigin};

/// An icon found in a line of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMarker {
    /// Byte range of the whole marker, delimiters included
    pub range: Range<usize>,
    /// Text between the delimiters, or the emoji run itself
    pub token: String,
    pub reference: IconReference,
}

/// Finds `<id>token<id>` markers and bare emoji in text
#[derive(Debug, Clone)]
pub struct MarkerScanner {
    pattern: Regex,
}

impl MarkerScanner {
    pub fn new(identifier: &str) -> Result<Self> {
        if identifier.is_empty() {
            return Err(IconResolverError::InvalidConfig(
                "inline marker identifier must not be empty".to_string(),
            ));
        }

        let id = regex::escape(identifier);
        let pattern = format!(r"{id}([0-9A-Za-z_]{{1,64}}(?::[0-9]{{17,18}})?){id}");
        let pattern = Regex::new(&pattern).map_err(|source| IconResolverError::MalformedRule {
            pattern: pattern.clone(),
            source,
        })?;

        Ok(Self { pattern })
    }

    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        Self::new(&config.icon_identifier)
    }

    /// All markers in `text`, ordered by position
    pub fn find(&self, text: &str) -> Vec<InlineMarker> {
        let mut markers: Vec<InlineMarker> = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let token = caps.get(1)?.as_str();
                Some(InlineMarker {
                    range: whole.range(),
                    token: token.to_string(),
                    reference: IconReference::from_candidate(
                        token,
                        None,
                        Some(RuleOrigin::Explicit),
                    ),
                })
            })
            .collect();

        for run in emoji::find_emoji_runs(text) {
            if markers.iter().any(|m| m.range.start < run.end && run.start < m.range.end) {
                continue;
            }
            let glyph = &text[run.clone()];
            markers.push(InlineMarker {
                range: run,
                token: glyph.to_string(),
                reference: IconReference::from_candidate(glyph, None, Some(RuleOrigin::Explicit)),
            });
        }

        markers.sort_by_key(|m| m.range.start);
        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IconKind;
    use pretty_assertions::assert_eq;

    fn scanner() -> MarkerScanner {
        MarkerScanner::new(":").unwrap()
    }

    #[test]
    fn test_single_marker() {
        let markers = scanner().find("see :LiBook: here");
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].range, 4..12);
        assert_eq!(markers[0].token, "LiBook");
        assert_eq!(markers[0].reference.icon(), Some("LiBook"));
        assert_eq!(markers[0].reference.kind(), IconKind::PackIcon);
    }

    #[test]
    fn test_marker_with_numeric_suffix() {
        let markers = scanner().find(":custom_icon:123456789012345678:");
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].token, "custom_icon:123456789012345678");
    }

    #[test]
    fn test_no_marker_in_plain_text() {
        assert!(scanner().find("time is 10:30 today").is_empty());
        assert!(scanner().find("::").is_empty());
    }

    #[test]
    fn test_emoji_runs_reported() {
        let text = "done 👍 and :LiStar:";
        let markers = scanner().find(text);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].reference.kind(), IconKind::Emoji);
        assert_eq!(&text[markers[0].range.clone()], "👍");
        assert_eq!(markers[1].token, "LiStar");
    }

    #[test]
    fn test_identifier_is_literal() {
        let scanner = MarkerScanner::new("$").unwrap();
        let markers = scanner.find("a $LiBook$ b :LiStar:");
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].token, "LiBook");
    }

    #[test]
    fn test_multi_char_identifier() {
        let scanner = MarkerScanner::new("::").unwrap();
        let markers = scanner.find("x ::LiBook:: y");
        assert_eq!(markers[0].range, 2..12);
    }

    #[test]
    fn test_empty_identifier_rejected() {
        assert!(matches!(
            MarkerScanner::new(""),
            Err(IconResolverError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = ResolverConfig::default().with_icon_identifier("%");
        let markers = MarkerScanner::from_config(&config).unwrap().find("%LiBook%");
        assert_eq!(markers.len(), 1);
    }
}
