//! neurolit-ingestion — PubMed query building, identifier search, and raw
//! record fetching for the literature pipeline.

pub mod models;
pub mod query;
pub mod sources;
