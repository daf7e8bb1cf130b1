mod support;

use std::sync::Arc;

use feed_reply::error::RelayError;
use feed_reply::models::StartStopCommand;
use feed_reply::orchestrator::AutomationState;
use feed_reply::services::Settings;
use support::{advance, build_engine, engine_with, test_settings, ScriptedGenerator, ScriptedPage};

fn start_command() -> StartStopCommand {
    StartStopCommand {
        running: true,
        api_url: " https://gateway.example.com/v1 ".to_string(),
        api_key: " sk-new ".to_string(),
        model: "gpt-4o-mini".to_string(),
        system_prompt: "be brief".to_string(),
    }
}

fn stop_command() -> StartStopCommand {
    StartStopCommand {
        running: false,
        ..start_command()
    }
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_before_handshake_rolls_back() {
    let page = ScriptedPage::home();
    let engine = build_engine(&page, Arc::new(ScriptedGenerator::default()), test_settings());

    let err = engine.relay.dispatch(start_command()).await.unwrap_err();

    assert!(matches!(err, RelayError::NotConnected));
    assert!(!engine.settings.snapshot().is_running);
    assert_eq!(engine.controller.state(), AutomationState::Idle);
    // 指令中的接口设置仍然保存
    assert_eq!(engine.settings.snapshot().api_key, "sk-new");
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_rejects_unsupported_page() {
    let page = ScriptedPage::new("https://example.com/feed");
    let engine = engine_with(&page, Arc::new(ScriptedGenerator::default()));

    let err = engine.relay.dispatch(start_command()).await.unwrap_err();

    assert!(matches!(err, RelayError::UnsupportedPage { .. }));
    assert!(!engine.settings.snapshot().is_running);
    assert!(!engine.controller.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_start_persists_settings_and_resets_count() {
    let page = ScriptedPage::new("https://twitter.com/home");
    let engine = build_engine(
        &page,
        Arc::new(ScriptedGenerator::default()),
        Settings {
            total_replies: 5,
            ..test_settings()
        },
    );
    engine.relay.handshake();
    let mut updates = engine.reporter.subscribe();

    engine.relay.dispatch(start_command()).await.unwrap();

    let settings = engine.settings.snapshot();
    assert!(settings.is_running);
    assert_eq!(settings.total_replies, 0);
    assert_eq!(settings.api_url, "https://gateway.example.com/v1");
    assert_eq!(settings.api_key, "sk-new");
    assert_eq!(settings.model_name, "gpt-4o-mini");
    assert_eq!(updates.recv().await.unwrap().count, 0);
    assert!(engine.controller.is_running());

    engine.relay.dispatch(stop_command()).await.unwrap();
    assert!(!engine.settings.snapshot().is_running);
    assert!(!engine.controller.is_running());
    engine.controller.wait_processor().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_while_running_keeps_count() {
    let page = ScriptedPage::home();
    let engine = engine_with(&page, Arc::new(ScriptedGenerator::default()));

    engine.relay.dispatch(start_command()).await.unwrap();
    page.insert(&[("1", "hello")]);
    advance(20).await;
    assert_eq!(engine.counter.current(), 1);

    engine.relay.dispatch(start_command()).await.unwrap();
    assert_eq!(engine.counter.current(), 1);
    engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_reply_count_is_announced() {
    let page = ScriptedPage::home();
    let engine = engine_with(&page, Arc::new(ScriptedGenerator::default()));
    let mut updates = engine.reporter.subscribe();

    engine.controller.start().await.unwrap();
    page.insert(&[("1", "hello")]);
    advance(20).await;

    let mut last = None;
    while let Ok(update) = updates.try_recv() {
        last = Some(update.count);
    }
    assert_eq!(last, Some(1));
    assert_eq!(engine.settings.snapshot().total_replies, 1);
    engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_resume_persisted_running_state() {
    let page = ScriptedPage::home();
    let engine = build_engine(
        &page,
        Arc::new(ScriptedGenerator::default()),
        Settings {
            is_running: true,
            ..test_settings()
        },
    );
    engine.relay.handshake();

    assert!(engine.relay.resume_persisted().await.unwrap());
    assert!(engine.controller.is_running());
    engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_resume_on_unsupported_page_clears_flag() {
    let page = ScriptedPage::new("https://example.com/");
    let engine = build_engine(
        &page,
        Arc::new(ScriptedGenerator::default()),
        Settings {
            is_running: true,
            ..test_settings()
        },
    );
    engine.relay.handshake();

    assert!(engine.relay.resume_persisted().await.is_err());
    assert!(!engine.settings.snapshot().is_running);
}
