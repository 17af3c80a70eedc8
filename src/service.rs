//! Resolution facade used by renderers

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::IconCache;
use crate::config::ResolverConfig;
use crate::events::IconEvent;
use crate::resolver;
use crate::snapshot::RuleSnapshot;
use crate::types::{CacheStatistics, IconReference};

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    resolutions: AtomicU64,
    writes: AtomicU64,
    invalidations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }
}

/// Entry point for icon lookups.
///
/// Answers from the cache when possible and otherwise resolves against the
/// current rule snapshot, remembering the result (including `None`). Rule and
/// configuration changes go through this type so the cache is invalidated in
/// the same step.
#[derive(Debug)]
pub struct IconService {
    cache: Arc<IconCache>,
    snapshot: RwLock<RuleSnapshot>,
    config: RwLock<ResolverConfig>,
    counters: Counters,
}

impl IconService {
    pub fn new(cache: Arc<IconCache>, config: ResolverConfig, snapshot: RuleSnapshot) -> Self {
        Self {
            cache,
            snapshot: RwLock::new(snapshot),
            config: RwLock::new(config),
            counters: Counters::default(),
        }
    }

    /// Icon for `path`, from the cache or freshly resolved
    pub fn get_icon_for(&self, path: &str) -> Arc<IconReference> {
        if let Some(hit) = self.cache.get(path) {
            Counters::bump(&self.counters.hits, 1);
            log::trace!("Icon cache hit: {}", path);
            return hit;
        }

        Counters::bump(&self.counters.misses, 1);

        // Hold the read locks through the write-back so an update cannot
        // clear the cache between resolving and storing.
        let snapshot = self.snapshot.read();
        let config = self.config.read();

        Counters::bump(&self.counters.resolutions, 1);
        let reference = Arc::new(resolver::resolve_in(path, &snapshot, &config));

        self.cache.set(path, Arc::clone(&reference));
        Counters::bump(&self.counters.writes, 1);
        log::debug!("Icon cache miss: {} -> {:?}", path, reference.kind());

        reference
    }

    /// Icons for several paths, in order
    pub fn get_icons_for<I, S>(&self, paths: I) -> Vec<Arc<IconReference>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .map(|path| self.get_icon_for(path.as_ref()))
            .collect()
    }

    /// Drop the cached entry for exactly `path`
    pub fn invalidate(&self, path: &str) {
        if self.cache.invalidate(path) {
            Counters::bump(&self.counters.invalidations, 1);
        }
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        let removed = self.cache.clear();
        Counters::bump(&self.counters.invalidations, removed as u64);
        log::info!("Cleared icon cache ({} entries)", removed);
    }

    /// React to a domain event
    pub fn handle_event(&self, event: IconEvent) {
        let mut snapshot = self.snapshot.write();
        self.apply_event(&mut snapshot, &event);
    }

    /// Mutate the rule snapshot, then react to `event` before releasing it
    pub fn update_snapshot<F, R>(&self, event: IconEvent, update: F) -> R
    where
        F: FnOnce(&mut RuleSnapshot) -> R,
    {
        let mut snapshot = self.snapshot.write();
        let result = update(&mut *snapshot);
        self.apply_event(&mut snapshot, &event);
        result
    }

    /// Replace configuration; every cached result is dropped
    pub fn update_config<F>(&self, update: F)
    where
        F: FnOnce(&mut ResolverConfig),
    {
        let mut config = self.config.write();
        update(&mut *config);
        let removed = self.cache.clear();
        Counters::bump(&self.counters.invalidations, removed as u64);
        log::info!("Resolver configuration changed, dropped {} cached icons", removed);
    }

    fn apply_event(&self, snapshot: &mut RuleSnapshot, event: &IconEvent) {
        match event {
            IconEvent::FileRenamed { from, to } => snapshot.rename_path(from, to),
            IconEvent::FileDeleted { path } => snapshot.remove_path(path),
            _ => {}
        }

        let removed = if event.is_global() {
            let removed = self.cache.clear();
            log::info!("{}: dropped {} cached icons", event.name(), removed);
            removed
        } else {
            let removed: usize = event
                .affected_roots()
                .into_iter()
                .map(|root| self.cache.invalidate_tree(root))
                .sum();
            log::debug!("{}: dropped {} cached icons", event.name(), removed);
            removed
        };

        Counters::bump(&self.counters.invalidations, removed as u64);
    }

    /// Read access to the current rule snapshot
    pub fn with_snapshot<R>(&self, read: impl FnOnce(&RuleSnapshot) -> R) -> R {
        let snapshot = self.snapshot.read();
        read(&*snapshot)
    }

    pub fn config(&self) -> ResolverConfig {
        self.config.read().clone()
    }

    pub fn cache(&self) -> &Arc<IconCache> {
        &self.cache
    }

    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            entries: self.cache.len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            resolutions: self.counters.resolutions.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheOwner;
    use crate::rules::CustomRule;
    use crate::snapshot::IconAssignment;
    use crate::types::{IconKind, RuleOrigin};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn service_with(snapshot: RuleSnapshot) -> IconService {
        let cache = CacheOwner::new().create_cache().unwrap();
        IconService::new(cache, ResolverConfig::default(), snapshot)
    }

    #[test]
    fn test_miss_then_hit() {
        let service = service_with(RuleSnapshot::new());

        let first = service.get_icon_for("/a.md");
        assert!(first.is_none());
        let stats = service.statistics();
        assert_eq!(stats.resolutions, 1);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.misses, 1);

        let second = service.get_icon_for("/a.md");
        assert_eq!(second, first);
        let stats = service.statistics();
        assert_eq!(stats.resolutions, 1);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.hit_rate(), Some(0.5));
    }

    #[test]
    fn test_negative_result_is_cached() {
        let service = service_with(RuleSnapshot::new());
        service.get_icon_for("nothing.md");
        assert!(service.cache().does_record_exist("nothing.md"));
    }

    #[test]
    fn test_rule_change_invalidates_everything() {
        let mut snapshot = RuleSnapshot::new();
        snapshot.set_custom_rules(vec![CustomRule::new("md$", "LiBook")]);
        let service = service_with(snapshot);

        assert_eq!(service.get_icon_for("a.md").icon(), Some("LiBook"));
        assert_eq!(service.get_icon_for("b.md").icon(), Some("LiBook"));

        service.update_snapshot(IconEvent::RuleChanged, |snapshot| {
            snapshot.set_custom_rules(vec![CustomRule::new("md$", "LiScroll")]);
        });

        assert!(service.cache().is_empty());
        assert_eq!(service.get_icon_for("a.md").icon(), Some("LiScroll"));
    }

    #[test]
    fn test_assignment_invalidates_descendants_only() {
        let service = service_with(RuleSnapshot::new());
        service.get_icon_for("notes/a.md");
        service.get_icon_for("other/b.md");

        service.update_snapshot(IconEvent::AssignmentChanged { path: "notes".into() }, |snapshot| {
            snapshot.inherit("notes", IconAssignment::new("LiFolder"));
        });

        assert!(!service.cache().does_record_exist("notes/a.md"));
        assert!(service.cache().does_record_exist("other/b.md"));
        let inherited = service.get_icon_for("notes/a.md");
        assert_eq!(inherited.icon(), Some("LiFolder"));
        assert_eq!(inherited.origin(), Some(RuleOrigin::Inherited));
    }

    #[test]
    fn test_rename_moves_assignment() {
        let mut snapshot = RuleSnapshot::new();
        snapshot.assign("old.md", IconAssignment::new("LiStar"));
        let service = service_with(snapshot);
        assert_eq!(service.get_icon_for("old.md").icon(), Some("LiStar"));

        service.handle_event(IconEvent::FileRenamed {
            from: "old.md".into(),
            to: "new.md".into(),
        });

        assert!(!service.cache().does_record_exist("old.md"));
        assert_eq!(service.get_icon_for("new.md").icon(), Some("LiStar"));
        assert!(service.get_icon_for("old.md").is_none());
    }

    #[test]
    fn test_delete_drops_state() {
        let mut snapshot = RuleSnapshot::new();
        snapshot.assign("gone.md", IconAssignment::new("LiStar"));
        let service = service_with(snapshot);
        service.get_icon_for("gone.md");

        service.handle_event(IconEvent::FileDeleted { path: "gone.md".into() });

        assert!(!service.cache().does_record_exist("gone.md"));
        assert!(service.with_snapshot(|s| s.assignments.get("gone.md").is_none()));
    }

    #[test]
    fn test_frontmatter_change() {
        let service = service_with(RuleSnapshot::new());
        assert!(service.get_icon_for("a.md").is_none());

        service.update_snapshot(IconEvent::FrontmatterChanged { path: "a.md".into() }, |snapshot| {
            let frontmatter = json!({ "icon": "🔥", "iconColor": "ff8800" });
            snapshot.set_frontmatter("a.md", frontmatter.as_object().cloned().unwrap_or_default());
        });

        let result = service.get_icon_for("a.md");
        assert_eq!(result.kind(), IconKind::Emoji);
        assert_eq!(result.color(), Some("#ff8800"));
    }

    #[test]
    fn test_pack_reload_clears() {
        let service = service_with(RuleSnapshot::new());
        service.get_icons_for(["a.md", "b.md", "c.md"]);
        assert_eq!(service.cache().len(), 3);

        service.handle_event(IconEvent::PackReloaded);
        assert!(service.cache().is_empty());
        assert_eq!(service.statistics().invalidations, 3);
    }

    #[test]
    fn test_config_change_clears() {
        let mut snapshot = RuleSnapshot::new();
        snapshot.inherit("notes", IconAssignment::new("LiFolder"));
        let service = service_with(snapshot);
        assert_eq!(service.get_icon_for("notes/a.md").icon(), Some("LiFolder"));

        service.update_config(|config| config.inheritance_enabled = false);
        assert!(service.get_icon_for("notes/a.md").is_none());
        assert!(!service.config().inheritance_enabled);
    }

    #[test]
    fn test_invalidate_single_path() {
        let service = service_with(RuleSnapshot::new());
        service.get_icons_for(["a.md", "b.md"]);
        service.invalidate("a.md");
        assert!(!service.cache().does_record_exist("a.md"));
        assert!(service.cache().does_record_exist("b.md"));

        service.clear();
        assert!(service.cache().is_empty());
    }

    #[test]
    fn test_concurrent_lookups_agree() {
        let mut snapshot = RuleSnapshot::new();
        snapshot.assign("shared.md", IconAssignment::new("LiStar"));
        let service = Arc::new(service_with(snapshot));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    service.get_icon_for("shared.md").icon().map(str::to_string)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().as_deref(), Some("LiStar"));
        }
        assert_eq!(service.cache().len(), 1);
    }
}
