//! Blocked-app selection.
//!
//! Holds the set of apps (or whole categories) the shield enforces.
//! Toggling membership does not itself engage or release the shield;
//! the controller re-evaluates on its next pass. The free tier caps
//! the blocked set at [`FREE_TIER_BLOCK_LIMIT`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum blocked apps without a premium entitlement.
pub const FREE_TIER_BLOCK_LIMIT: usize = 3;

/// One selectable app or category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedApp {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub is_blocked: bool,
    /// Opaque Screen Time token, present when the native picker
    /// supplied one.
    #[serde(default)]
    pub token_data: Option<String>,
    #[serde(default)]
    pub is_category: bool,
}

/// The selection the shield enforces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockedApps {
    apps: Vec<BlockedApp>,
}

impl BlockedApps {
    pub fn new(apps: Vec<BlockedApp>) -> Self {
        Self { apps }
    }

    pub fn all(&self) -> &[BlockedApp] {
        &self.apps
    }

    pub fn blocked_count(&self) -> usize {
        self.apps.iter().filter(|a| a.is_blocked).count()
    }

    pub fn any_blocked(&self) -> bool {
        self.apps.iter().any(|a| a.is_blocked)
    }

    pub fn get(&self, id: &str) -> Option<&BlockedApp> {
        self.apps.iter().find(|a| a.id == id)
    }

    /// Add or replace an app entry, keyed by id.
    pub fn upsert(&mut self, app: BlockedApp) {
        match self.apps.iter_mut().find(|a| a.id == app.id) {
            Some(existing) => *existing = app,
            None => self.apps.push(app),
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.apps.len();
        self.apps.retain(|a| a.id != id);
        self.apps.len() != before
    }

    /// Toggle blocking for an app.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown id, or when blocking one more
    /// app would exceed the free-tier cap and `premium` is false.
    pub fn set_blocked(
        &mut self,
        id: &str,
        blocked: bool,
        premium: bool,
    ) -> Result<(), ValidationError> {
        if blocked && !premium {
            let already = self
                .apps
                .iter()
                .filter(|a| a.is_blocked && a.id != id)
                .count();
            if already >= FREE_TIER_BLOCK_LIMIT {
                return Err(ValidationError::BlockLimitReached {
                    limit: FREE_TIER_BLOCK_LIMIT,
                });
            }
        }
        let app = self
            .apps
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "app".into(),
                id: id.into(),
            })?;
        app.is_blocked = blocked;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, blocked: bool) -> BlockedApp {
        BlockedApp {
            id: id.into(),
            name: id.to_uppercase(),
            icon: String::new(),
            is_blocked: blocked,
            token_data: None,
            is_category: false,
        }
    }

    #[test]
    fn toggling_tracks_membership() {
        let mut apps = BlockedApps::new(vec![app("a", false), app("b", false)]);
        assert!(!apps.any_blocked());
        apps.set_blocked("a", true, false).unwrap();
        assert!(apps.any_blocked());
        assert_eq!(apps.blocked_count(), 1);
        apps.set_blocked("a", false, false).unwrap();
        assert!(!apps.any_blocked());
    }

    #[test]
    fn free_tier_caps_at_three() {
        let mut apps = BlockedApps::new(vec![
            app("a", true),
            app("b", true),
            app("c", true),
            app("d", false),
        ]);
        let err = apps.set_blocked("d", true, false).unwrap_err();
        assert!(matches!(err, ValidationError::BlockLimitReached { limit: 3 }));

        // Unblocking is always allowed, and premium lifts the cap.
        apps.set_blocked("a", false, false).unwrap();
        apps.set_blocked("d", true, false).unwrap();
        apps.set_blocked("a", true, true).unwrap();
        assert_eq!(apps.blocked_count(), 4);
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut apps = BlockedApps::default();
        assert!(apps.set_blocked("ghost", true, true).is_err());
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut apps = BlockedApps::default();
        apps.upsert(app("a", false));
        apps.upsert(app("a", true));
        assert_eq!(apps.all().len(), 1);
        assert!(apps.any_blocked());
    }
}
