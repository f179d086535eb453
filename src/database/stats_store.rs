//! Persistence of [`UserStats`], injected into the page controllers.

use super::{LocalStore, db};
use crate::errors::AppResult;
use crate::models::{Tier, UserStats};

#[cfg_attr(test, mockall::automock)]
pub trait StatsStore {
    /// Current stats; missing or corrupt data yields defaults.
    fn load(&self) -> UserStats;
    fn save(&self, stats: &UserStats) -> AppResult<()>;

    fn record_test_generated(&self, question_count: u32) -> AppResult<UserStats> {
        let mut stats = self.load();
        stats.record_generated(question_count);
        self.save(&stats)?;
        Ok(stats)
    }

    fn record_test_completed(&self, score_percentage: u32) -> AppResult<UserStats> {
        let mut stats = self.load();
        stats.record_completed(score_percentage);
        self.save(&stats)?;
        Ok(stats)
    }

    fn apply_tier(&self, tier: Tier) -> AppResult<UserStats> {
        let mut stats = self.load();
        stats.apply_tier(tier);
        self.save(&stats)?;
        Ok(stats)
    }

    fn can_create_test(&self) -> bool {
        self.load().can_create_test()
    }
}

pub struct LocalStatsStore {
    store: LocalStore,
}

impl LocalStatsStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }
}

impl StatsStore for LocalStatsStore {
    fn load(&self) -> UserStats {
        match self.store.get_json::<UserStats>(db::KEY_USER_STATS) {
            Ok(stats) => stats.unwrap_or_default(),
            Err(e) => {
                log::warn!("Failed to read user stats, using defaults: {}", e);
                UserStats::default()
            }
        }
    }

    fn save(&self, stats: &UserStats) -> AppResult<()> {
        self.store.set_json(db::KEY_USER_STATS, stats)?;
        log::debug!("Saved user stats: {:?}", stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_store() -> (LocalStore, LocalStatsStore) {
        let store = LocalStore::in_memory().unwrap();
        (store.clone(), LocalStatsStore::new(store))
    }

    #[test]
    fn test_load_defaults_when_empty() {
        let (_, stats) = stats_store();
        assert_eq!(stats.load(), UserStats::default());
    }

    #[test]
    fn test_load_defaults_when_corrupt() {
        let (store, stats) = stats_store();
        store.set_item(db::KEY_USER_STATS, "][").unwrap();

        assert_eq!(stats.load(), UserStats::default());
    }

    #[test]
    fn test_record_generated_persists() {
        let (_, stats) = stats_store();
        stats.record_test_generated(10).unwrap();
        let loaded = stats.load();

        assert_eq!(loaded.tests_created, 1);
        assert_eq!(loaded.questions_generated, 10);
        assert_eq!(loaded.tests_remaining, 4);
    }

    #[test]
    fn test_record_completed_persists() {
        let (_, stats) = stats_store();
        stats.record_test_completed(100).unwrap();
        stats.record_test_completed(50).unwrap();

        let loaded = stats.load();
        assert_eq!(loaded.tests_completed, 2);
        assert_eq!(loaded.average_score, Some(75));
    }

    #[test]
    fn test_free_user_runs_out_of_tests() {
        let (_, stats) = stats_store();
        for _ in 0..5 {
            stats.record_test_generated(5).unwrap();
        }
        assert!(!stats.can_create_test());

        stats.apply_tier(Tier::Premium).unwrap();
        assert!(stats.can_create_test());
        assert_eq!(stats.load().tests_remaining, 50);
    }
}
