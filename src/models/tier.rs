//! Subscription tier and the limits it gates.

use super::GenerationModel;
use std::ops::RangeInclusive;

/// Size limit for ready-made test files, independent of tier.
pub const MAX_TEST_FILE_BYTES: u64 = 1024 * 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl Tier {
    pub fn from_premium(is_premium: bool) -> Self {
        if is_premium { Tier::Premium } else { Tier::Free }
    }

    pub fn is_premium(self) -> bool {
        self == Tier::Premium
    }

    pub fn question_range(self) -> RangeInclusive<u32> {
        match self {
            Tier::Free => 5..=10,
            Tier::Premium => 5..=100,
        }
    }

    pub fn max_text_chars(self) -> usize {
        match self {
            Tier::Free => 10_000,
            Tier::Premium => 1_000_000,
        }
    }

    pub fn max_document_bytes(self) -> u64 {
        match self {
            Tier::Free => 50 * 1024,
            Tier::Premium => 50 * 1024 * 1024,
        }
    }

    pub fn max_document_label(self) -> &'static str {
        match self {
            Tier::Free => "50 КБ",
            Tier::Premium => "50 МБ",
        }
    }

    pub fn daily_tests(self) -> u32 {
        match self {
            Tier::Free => 5,
            Tier::Premium => 50,
        }
    }

    pub fn allows_model(self, model: GenerationModel) -> bool {
        match self {
            Tier::Free => model == GenerationModel::Iceq,
            Tier::Premium => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Free => "Бесплатный",
            Tier::Premium => "Premium",
        }
    }
}
