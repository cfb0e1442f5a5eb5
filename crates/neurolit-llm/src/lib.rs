//! neurolit-llm — Gemini backend with web-search grounding, the enrichment
//! batch processor, the Markdown record parser, and the follow-up chat
//! session.

pub mod backend;
pub mod chat;
pub mod enrich;
pub mod models;
pub mod parser;
