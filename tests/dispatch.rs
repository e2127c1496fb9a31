//! Command dispatch integration tests
//!
//! Exercises routing and the handler registry without audio hardware or
//! network access.

use drishti::config::{
    ApiKeys, CameraConfig, Config, LocationConfig, NewsConfig, VoiceConfig,
};
use drishti::dispatch::{CommandRouter, Route};
use drishti::{Reply, build_router};

mod common;

use common::StubHandler;

fn stub_router() -> CommandRouter {
    let mut router = CommandRouter::new();
    router.register(Box::new(StubHandler {
        name: "currency",
        keywords: &["currency", "note", "rupee"],
        reply: "500 rupees",
    }));
    router.register(Box::new(StubHandler {
        name: "objects",
        keywords: &["detect", "around me"],
        reply: "I found table around you.",
    }));
    router.register(Box::new(StubHandler {
        name: "time",
        keywords: &["the time"],
        reply: "The time is 10 45 PM",
    }));
    router.register(Box::new(StubHandler {
        name: "weather",
        keywords: &["the weather", "temperature"],
        reply: "Temperature in Mumbai is 27 degrees Celsius and humidity is 74 percent.",
    }));
    router.register(Box::new(StubHandler {
        name: "news",
        keywords: &["news", "headlines"],
        reply: "No headlines found.",
    }));
    router.register(Box::new(StubHandler {
        name: "translate",
        keywords: &["translate"],
        reply: "नमस्ते",
    }));
    router
}

fn routed_name(router: &CommandRouter, utterance: &str) -> Option<&'static str> {
    match router.route(utterance) {
        Route::Handled(h) => Some(h.name()),
        _ => None,
    }
}

#[test]
fn test_each_trigger_routes_to_its_handler() {
    let router = stub_router();

    assert_eq!(routed_name(&router, "read this currency note"), Some("currency"));
    assert_eq!(routed_name(&router, "detect what is around me"), Some("objects"));
    assert_eq!(routed_name(&router, "what is the time"), Some("time"));
    assert_eq!(routed_name(&router, "how is the weather today"), Some("weather"));
    assert_eq!(routed_name(&router, "give me the news"), Some("news"));
    assert_eq!(
        routed_name(&router, "translate good morning to hindi"),
        Some("translate")
    );
}

#[test]
fn test_at_most_one_handler_fires() {
    let router = stub_router();

    // "the time" and "the weather" both appear; first registered wins
    assert_eq!(
        routed_name(&router, "tell me the time and the weather"),
        Some("time")
    );
}

#[test]
fn test_shutdown_is_routed_before_handlers() {
    let router = stub_router();

    assert!(matches!(router.route("shutdown"), Route::Shutdown));
    assert!(matches!(
        router.route("please shut down the assistant"),
        Route::Shutdown
    ));
}

#[test]
fn test_unmatched_utterance() {
    let router = stub_router();

    assert!(matches!(router.route("play some music"), Route::Unrecognized));
}

#[test]
fn test_stub_handler_reply() {
    let router = stub_router();

    let Route::Handled(handler) = router.route("what is the time") else {
        panic!("expected handler");
    };

    let reply = tokio_test::block_on(handler.handle("what is the time")).unwrap();
    assert_eq!(reply, Reply::say("The time is 10 45 PM"));
}

#[test]
fn test_reply_voice_override() {
    let reply = Reply::say("नमस्ते").with_voice("onyx");
    assert_eq!(reply.voice_override.as_deref(), Some("onyx"));
    assert_eq!(reply.lines, vec!["नमस्ते".to_string()]);
}

/// A config with no API keys registers only the keyless handlers
#[test]
fn test_build_router_without_keys() {
    let config = Config {
        voice: VoiceConfig::default(),
        camera: CameraConfig::default(),
        location: LocationConfig::default(),
        news: NewsConfig::default(),
        api_keys: ApiKeys::default(),
    };

    let router = build_router(&config);

    // time + translate need no keys
    assert_eq!(router.len(), 2);
    assert_eq!(routed_name(&router, "what is the time"), Some("time"));
    assert_eq!(routed_name(&router, "translate hello"), Some("translate"));
    assert!(matches!(router.route("the weather"), Route::Unrecognized));
}
