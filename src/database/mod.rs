pub mod db;
pub mod local_store;
pub mod stats_store;

pub use local_store::{LocalStore, Theme};
pub use stats_store::{LocalStatsStore, StatsStore};
