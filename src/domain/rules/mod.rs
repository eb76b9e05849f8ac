//! Domain rules - pure functions over domain entities

pub mod ranking;

pub use ranking::{rank, Diagnosis, RankingSettings};
