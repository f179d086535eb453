//! Home screen: usage stats and tier selection.

use super::Notice;
use crate::api::{PremiumStatus, QuizApi};
use crate::database::StatsStore;
use crate::errors::AppResult;
use crate::models::{Tier, UserStats};
use std::sync::Arc;

pub struct HomePage {
    api: Arc<dyn QuizApi>,
    stats: Arc<dyn StatsStore>,
    current: UserStats,
}

impl HomePage {
    pub fn new(api: Arc<dyn QuizApi>, stats: Arc<dyn StatsStore>) -> Self {
        let current = stats.load();
        Self {
            api,
            stats,
            current,
        }
    }

    pub fn stats(&self) -> &UserStats {
        &self.current
    }

    pub fn tier(&self) -> Tier {
        self.current.tier()
    }

    /// Re-reads local stats without asking the server.
    pub fn reload(&mut self) {
        self.current = self.stats.load();
    }

    /// Blocking form of `apply_premium_status(api.premium_status())`.
    pub fn refresh(&mut self) -> Option<Notice> {
        let result = self.api.premium_status();
        self.apply_premium_status(result)
    }

    /// Merges the server's premium flag and daily limit into local stats.
    /// The local remaining count is kept. An unreachable server leaves local
    /// stats as they are and produces a warning.
    pub fn apply_premium_status(&mut self, result: AppResult<PremiumStatus>) -> Option<Notice> {
        let mut stats = self.stats.load();
        match result {
            Ok(status) => {
                let tier = Tier::from_premium(status.premium_active);
                stats.is_premium = status.premium_active;
                stats.max_tests = status
                    .daily_tests_limit()
                    .unwrap_or_else(|| tier.daily_tests());
                if let Err(e) = self.stats.save(&stats) {
                    log::warn!("Failed to save merged stats: {}", e);
                }
                self.current = stats;
                None
            }
            Err(e) => {
                log::warn!("Premium status unavailable, using local stats: {}", e);
                self.current = stats;
                Some(Notice::warning("Не удалось загрузить статистику с сервера"))
            }
        }
    }

    /// Blocking form of `switch_tier` followed by `apply_tier_switch`.
    pub fn select_tier(&mut self, tier: Tier) -> AppResult<Notice> {
        let changed = switch_tier(self.api.as_ref(), tier)?;
        self.apply_tier_switch(tier, changed)
    }

    /// Applies the tier's limits locally once the server agrees on `tier`.
    pub fn apply_tier_switch(&mut self, tier: Tier, changed: bool) -> AppResult<Notice> {
        self.current = self.stats.apply_tier(tier)?;
        log::info!("Tier set to {:?} (server toggled: {})", tier, changed);

        Ok(match (tier, changed) {
            (Tier::Premium, true) => Notice::success("Premium активирован!"),
            (Tier::Premium, false) => Notice::info("Premium уже активирован!"),
            (Tier::Free, true) => Notice::success("Бесплатный тариф активирован"),
            (Tier::Free, false) => Notice::info("Бесплатный тариф уже активирован!"),
        })
    }
}

/// Toggles the server-side flag only when it differs from `tier`.
/// Returns whether a toggle was sent.
pub fn switch_tier(api: &dyn QuizApi, tier: Tier) -> AppResult<bool> {
    let status = api.premium_status()?;
    if status.premium_active == tier.is_premium() {
        return Ok(false);
    }
    api.toggle_premium()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockQuizApi, PremiumFeatures};
    use crate::database::{LocalStatsStore, LocalStore};
    use crate::errors::AppError;

    fn local_stats() -> Arc<LocalStatsStore> {
        Arc::new(LocalStatsStore::new(LocalStore::in_memory().unwrap()))
    }

    fn premium_status(active: bool, limit: Option<u32>) -> PremiumStatus {
        PremiumStatus {
            premium_active: active,
            features: limit.map(|l| PremiumFeatures {
                daily_tests_limit: Some(l),
                max_questions: None,
            }),
        }
    }

    #[test]
    fn test_refresh_merges_server_status_and_keeps_remaining() {
        let stats = local_stats();
        let mut seeded = UserStats::default();
        seeded.tests_remaining = 3;
        stats.save(&seeded).unwrap();

        let mut api = MockQuizApi::new();
        api.expect_premium_status()
            .times(1)
            .returning(|| Ok(premium_status(true, Some(50))));

        let mut page = HomePage::new(Arc::new(api), stats.clone());
        let notice = page.refresh();

        assert!(notice.is_none());
        assert!(page.stats().is_premium);
        assert_eq!(page.stats().max_tests, 50);
        assert_eq!(page.stats().tests_remaining, 3);
        assert_eq!(stats.load(), *page.stats());
    }

    #[test]
    fn test_refresh_without_features_uses_tier_default() {
        let mut api = MockQuizApi::new();
        api.expect_premium_status()
            .returning(|| Ok(premium_status(false, None)));

        let mut page = HomePage::new(Arc::new(api), local_stats());
        page.refresh();

        assert_eq!(page.stats().max_tests, 5);
    }

    #[test]
    fn test_refresh_failure_falls_back_to_local() {
        let stats = local_stats();
        let mut api = MockQuizApi::new();
        api.expect_premium_status()
            .returning(|| Err(AppError::Network("connection refused".into())));

        let mut page = HomePage::new(Arc::new(api), stats.clone());
        let notice = page.refresh().unwrap();

        assert_eq!(notice.level, crate::pages::NoticeLevel::Warning);
        assert_eq!(*page.stats(), UserStats::default());
    }

    #[test]
    fn test_select_tier_toggles_only_when_different() {
        let mut api = MockQuizApi::new();
        api.expect_premium_status()
            .returning(|| Ok(premium_status(false, None)));
        api.expect_toggle_premium().times(1).returning(|| Ok(()));

        let mut page = HomePage::new(Arc::new(api), local_stats());
        let notice = page.select_tier(Tier::Premium).unwrap();

        assert_eq!(notice, Notice::success("Premium активирован!"));
        assert_eq!(page.stats().tests_remaining, 50);
        assert_eq!(page.stats().max_tests, 50);
        assert!(page.tier().is_premium());
    }

    #[test]
    fn test_select_same_tier_does_not_toggle() {
        let mut api = MockQuizApi::new();
        api.expect_premium_status()
            .returning(|| Ok(premium_status(false, None)));
        api.expect_toggle_premium().never();

        let mut page = HomePage::new(Arc::new(api), local_stats());
        let notice = page.select_tier(Tier::Free).unwrap();

        assert_eq!(notice, Notice::info("Бесплатный тариф уже активирован!"));
        assert_eq!(page.stats().tests_remaining, 5);
    }

    #[test]
    fn test_select_tier_failure_keeps_stats() {
        let mut api = MockQuizApi::new();
        api.expect_premium_status()
            .returning(|| Ok(premium_status(false, None)));
        api.expect_toggle_premium()
            .returning(|| Err(AppError::Api("Не удалось изменить тариф".into())));

        let stats = local_stats();
        let mut page = HomePage::new(Arc::new(api), stats.clone());

        assert!(page.select_tier(Tier::Premium).is_err());
        assert!(!stats.load().is_premium);
    }
}
