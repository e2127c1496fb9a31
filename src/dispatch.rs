//! Command dispatch
//!
//! Routes a recognized utterance to at most one handler per loop iteration.
//! Matching is case-insensitive substring membership against each handler's
//! trigger keywords; the first registered match wins.

use crate::handlers::Handler;

/// Phrases that end the session
const SHUTDOWN_TRIGGERS: [&str; 2] = ["shutdown", "shut down"];

/// Where an utterance was routed
pub enum Route<'a> {
    /// A handler claimed the utterance
    Handled(&'a dyn Handler),
    /// The user asked to stop
    Shutdown,
    /// No trigger keyword matched
    Unrecognized,
}

/// Keyword-based command router
#[derive(Default)]
pub struct CommandRouter {
    handlers: Vec<Box<dyn Handler>>,
}

impl CommandRouter {
    /// Create an empty router
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; registration order is match priority
    pub fn register(&mut self, handler: Box<dyn Handler>) {
        tracing::debug!(
            handler = handler.name(),
            keywords = ?handler.keywords(),
            "handler registered"
        );
        self.handlers.push(handler);
    }

    /// Number of registered handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route an utterance to a handler
    ///
    /// Shutdown triggers are checked before handlers so "shutdown" always
    /// wins, even if a handler registers an overlapping keyword.
    #[must_use]
    pub fn route(&self, utterance: &str) -> Route<'_> {
        let lower = utterance.to_lowercase();

        if SHUTDOWN_TRIGGERS.iter().any(|t| lower.contains(t)) {
            return Route::Shutdown;
        }

        for handler in &self.handlers {
            if handler.keywords().iter().any(|k| lower.contains(k)) {
                tracing::debug!(handler = handler.name(), "utterance routed");
                return Route::Handled(handler.as_ref());
            }
        }

        Route::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Reply;
    use crate::Result;
    use async_trait::async_trait;

    struct FixedHandler {
        name: &'static str,
        keywords: &'static [&'static str],
    }

    #[async_trait]
    impl Handler for FixedHandler {
        fn name(&self) -> &'static str {
            self.name
        }

        fn keywords(&self) -> &[&'static str] {
            self.keywords
        }

        async fn handle(&self, _utterance: &str) -> Result<Reply> {
            Ok(Reply::say("ok"))
        }
    }

    fn router() -> CommandRouter {
        let mut router = CommandRouter::new();
        router.register(Box::new(FixedHandler {
            name: "currency",
            keywords: &["currency", "note"],
        }));
        router.register(Box::new(FixedHandler {
            name: "weather",
            keywords: &["the weather"],
        }));
        router
    }

    #[test]
    fn test_substring_match() {
        let router = router();

        match router.route("tell me about the currency note") {
            Route::Handled(h) => assert_eq!(h.name(), "currency"),
            _ => panic!("expected currency handler"),
        }
    }

    #[test]
    fn test_case_insensitive() {
        let router = router();

        match router.route("What's THE WEATHER like?") {
            Route::Handled(h) => assert_eq!(h.name(), "weather"),
            _ => panic!("expected weather handler"),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let router = router();

        // Both "note" and "the weather" appear; currency registered first
        match router.route("note the weather today") {
            Route::Handled(h) => assert_eq!(h.name(), "currency"),
            _ => panic!("expected currency handler"),
        }
    }

    #[test]
    fn test_shutdown_beats_handlers() {
        let router = router();

        assert!(matches!(router.route("shutdown please"), Route::Shutdown));
        assert!(matches!(router.route("please shut down now"), Route::Shutdown));
    }

    #[test]
    fn test_unrecognized() {
        let router = router();

        assert!(matches!(router.route("sing me a song"), Route::Unrecognized));
        assert!(matches!(router.route(""), Route::Unrecognized));
    }
}
