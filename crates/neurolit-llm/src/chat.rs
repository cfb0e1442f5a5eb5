//! Follow-up chat over a finished search result.
//!
//! The session is seeded with a system instruction embedding the top-ranked
//! papers' summaries and then relays free-text turns to the backend. It is
//! presentation-facing only; it plays no part in the retrieval pipeline's
//! correctness.

use std::sync::Arc;

use crate::backend::{GenerateRequest, LlmError, Message, TextBackend};
use crate::models::EnrichedPaper;

/// Papers embedded into the seed instruction.
const SEED_PAPER_CAP: usize = 20;

pub struct ChatSession {
    backend: Arc<dyn TextBackend>,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn TextBackend>, papers: &[EnrichedPaper]) -> Self {
        Self {
            backend,
            history: vec![Message::system(build_seed_instruction(papers))],
        }
    }

    /// Send one user turn; the reply is appended to the session history.
    pub async fn send(&mut self, turn: impl Into<String>) -> Result<String, LlmError> {
        self.history.push(Message::user(turn));
        let req = GenerateRequest {
            messages: self.history.clone(),
            enable_search: false,
            max_tokens: Some(4096),
            temperature: Some(0.4),
        };
        let resp = self.backend.generate(req).await?;
        self.history.push(Message::assistant(resp.content.clone()));
        Ok(resp.content)
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

fn build_seed_instruction(papers: &[EnrichedPaper]) -> String {
    let mut s = String::from(
        "你是神经退行性疾病文献助手。以下是本次检索排名靠前的文献档案，\
         请仅基于这些内容回答用户的追问；无法回答时明确说明。\n\n",
    );
    for (i, p) in papers.iter().take(SEED_PAPER_CAP).enumerate() {
        s.push_str(&format!(
            "{}. {} / {}\n   期刊: {} ({}), 影响因子: {}\n   疾病类型: {}; 结论: {}\n",
            i + 1,
            p.title_en,
            p.title_zh,
            p.journal,
            p.publish_date,
            p.impact_factor,
            p.disease_type,
            p.key_conclusions,
        ));
    }
    s
}
