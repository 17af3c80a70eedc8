//! Plugin activation and teardown

use std::sync::Arc;

use crate::cache::CacheOwner;
use crate::config::ResolverConfig;
use crate::error::{IconResolverError, Result};
use crate::service::IconService;
use crate::snapshot::RuleSnapshot;

/// Initialize logging for the host process. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Owns the cache of one running plugin instance and the facade built on it
#[derive(Debug, Default)]
pub struct PluginLifecycle {
    owner: CacheOwner,
    service: Option<Arc<IconService>>,
}

impl PluginLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the cache and the facade
    pub fn activate(
        &mut self,
        config: ResolverConfig,
        snapshot: RuleSnapshot,
    ) -> Result<Arc<IconService>> {
        init_logging();

        if self.service.is_some() {
            log::warn!("Icon resolver is already active");
            return Err(IconResolverError::AlreadyActive);
        }

        config.validate()?;
        let cache = self.owner.create_cache()?;
        let service = Arc::new(IconService::new(cache, config, snapshot));
        self.service = Some(Arc::clone(&service));

        log::info!("Icon resolver activated");
        Ok(service)
    }

    /// The active facade
    pub fn service(&self) -> Result<Arc<IconService>> {
        self.service.clone().ok_or(IconResolverError::NotActive)
    }

    pub fn is_active(&self) -> bool {
        self.service.is_some()
    }

    /// Drop the facade and empty its cache. Does nothing when inactive.
    ///
    /// A new activation succeeds only once every handle to the old facade
    /// has been dropped, since the cache it holds is still live until then.
    pub fn deactivate(&mut self) {
        let Some(service) = self.service.take() else {
            return;
        };

        service.clear();
        if Arc::strong_count(&service) > 1 {
            log::warn!("Icon resolver deactivated while its facade is still in use");
        }
        log::info!("Icon resolver deactivated");
    }
}

impl Drop for PluginLifecycle {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::IconAssignment;

    #[test]
    fn test_activate_and_lookup() {
        let mut lifecycle = PluginLifecycle::new();
        let mut snapshot = RuleSnapshot::new();
        snapshot.assign("a.md", IconAssignment::new("LiStar"));

        let service = lifecycle.activate(ResolverConfig::default(), snapshot).unwrap();
        assert!(lifecycle.is_active());
        assert_eq!(service.get_icon_for("a.md").icon(), Some("LiStar"));
    }

    #[test]
    fn test_second_activation_fails() {
        let mut lifecycle = PluginLifecycle::new();
        lifecycle.activate(ResolverConfig::default(), RuleSnapshot::new()).unwrap();

        let again = lifecycle.activate(ResolverConfig::default(), RuleSnapshot::new());
        assert!(matches!(again, Err(IconResolverError::AlreadyActive)));
    }

    #[test]
    fn test_owner_refuses_second_cache() {
        let mut lifecycle = PluginLifecycle::new();
        lifecycle.activate(ResolverConfig::default(), RuleSnapshot::new()).unwrap();

        assert!(matches!(
            lifecycle.owner.create_cache(),
            Err(IconResolverError::CacheAlreadyConstructed)
        ));
    }

    #[test]
    fn test_service_when_inactive() {
        let lifecycle = PluginLifecycle::new();
        assert!(matches!(lifecycle.service(), Err(IconResolverError::NotActive)));
    }

    #[test]
    fn test_deactivate_clears_and_allows_reactivation() {
        let mut lifecycle = PluginLifecycle::new();
        let service = lifecycle.activate(ResolverConfig::default(), RuleSnapshot::new()).unwrap();
        service.get_icon_for("a.md");

        lifecycle.deactivate();
        assert!(service.cache().is_empty());
        assert!(!lifecycle.is_active());
        drop(service);
        assert!(!lifecycle.owner.has_issued());

        let fresh = lifecycle.activate(ResolverConfig::default(), RuleSnapshot::new()).unwrap();
        assert!(fresh.cache().is_empty());
    }

    #[test]
    fn test_no_second_cache_while_facade_alive() {
        let mut lifecycle = PluginLifecycle::new();
        let held = lifecycle.activate(ResolverConfig::default(), RuleSnapshot::new()).unwrap();

        lifecycle.deactivate();
        let again = lifecycle.activate(ResolverConfig::default(), RuleSnapshot::new());
        assert!(matches!(again, Err(IconResolverError::CacheAlreadyConstructed)));
        assert!(!lifecycle.is_active());

        drop(held);
        assert!(lifecycle.activate(ResolverConfig::default(), RuleSnapshot::new()).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut lifecycle = PluginLifecycle::new();
        let config = ResolverConfig::default().with_icon_identifier("");
        let result = lifecycle.activate(config, RuleSnapshot::new());
        assert!(matches!(result, Err(IconResolverError::InvalidConfig(_))));
        assert!(!lifecycle.owner.has_issued());
    }
}
