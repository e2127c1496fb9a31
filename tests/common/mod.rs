//! Shared test utilities

use async_trait::async_trait;

use drishti::handlers::Handler;
use drishti::{Reply, Result};

/// Handler with fixed keywords and a canned reply
pub struct StubHandler {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

#[async_trait]
impl Handler for StubHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    fn keywords(&self) -> &[&'static str] {
        self.keywords
    }

    async fn handle(&self, _utterance: &str) -> Result<Reply> {
        Ok(Reply::say(self.reply))
    }
}
