//! Icon resolution and caching for file-tree and inline-text icons
//!
//! Renderers ask the [`IconService`] for the icon of a path. The service
//! answers from a concurrent cache and, on a miss, resolves the path against
//! explicit assignments, frontmatter, frontmatter rules, custom rules and
//! folder inheritance, in that order.

pub mod cache;
pub mod config;
pub mod emoji;
pub mod error;
pub mod events;
pub mod frontmatter;
pub mod lifecycle;
pub mod markers;
pub mod resolver;
pub mod rules;
pub mod service;
pub mod snapshot;
pub mod types;
pub mod utils;

pub use cache::{CacheOwner, IconCache};
pub use config::ResolverConfig;
pub use emoji::is_emoji;
pub use error::{IconResolverError, Result};
pub use events::IconEvent;
pub use frontmatter::{Criterion, CriterionOperator, Frontmatter, FrontmatterRule};
pub use lifecycle::{init_logging, PluginLifecycle};
pub use markers::{InlineMarker, MarkerScanner};
pub use resolver::{resolve, RuleSource};
pub use rules::{CustomRule, RuleTarget};
pub use service::IconService;
pub use snapshot::{IconAssignment, RuleSnapshot};
pub use types::{CacheStatistics, IconKind, IconName, IconReference, PathKind, RuleOrigin};
