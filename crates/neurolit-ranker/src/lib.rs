//! neurolit-ranker — deduplication and ranking of enriched paper records.

pub mod classify;
pub mod dedup;
pub mod rank;

pub use dedup::dedup_papers;
pub use rank::rank_papers;
