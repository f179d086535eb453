//! Usage counters kept across sessions under the `iceq_user_stats` key.
use super::Tier;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub tests_created: u32,
    pub questions_generated: u32,
    pub tests_remaining: u32,
    pub is_premium: bool,
    pub max_tests: u32,
    pub tests_completed: u32,
    pub average_score: Option<u32>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            tests_created: 0,
            questions_generated: 0,
            tests_remaining: Tier::Free.daily_tests(),
            is_premium: false,
            max_tests: Tier::Free.daily_tests(),
            tests_completed: 0,
            average_score: None,
        }
    }
}

impl UserStats {
    pub fn tier(&self) -> Tier {
        Tier::from_premium(self.is_premium)
    }

    pub fn can_create_test(&self) -> bool {
        self.is_premium || self.tests_remaining > 0
    }

    pub fn record_generated(&mut self, question_count: u32) {
        self.tests_remaining = self.tests_remaining.saturating_sub(1);
        self.tests_created += 1;
        self.questions_generated += question_count;
    }

    /// Running average: the mean of the previous average and the new score.
    pub fn record_completed(&mut self, score_percentage: u32) {
        self.tests_completed += 1;
        self.average_score = Some(match self.average_score {
            Some(avg) => ((avg + score_percentage) as f64 / 2.0).round() as u32,
            None => score_percentage,
        });
    }

    /// A tier change resets the daily allowance to the tier's full limit.
    pub fn apply_tier(&mut self, tier: Tier) {
        self.is_premium = tier.is_premium();
        self.max_tests = tier.daily_tests();
        self.tests_remaining = tier.daily_tests();
    }
}
