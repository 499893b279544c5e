//! Unit tests for TokenRefreshWorker

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::ChannelType;
use crate::services::channel::tests::mocks::{MockChannelProvider, MockOutcome};
use crate::services::channel::StaticProviderRegistry;
use crate::services::worker::TokenRefreshWorker;

const REFRESH_AHEAD: Duration = Duration::from_secs(600);

fn chat_provider() -> MockChannelProvider {
    MockChannelProvider::new(ChannelType::ChatPlatform, MockOutcome::Delivered)
}

#[tokio::test]
async fn test_refreshes_only_due_credentials() {
    let registry = Arc::new(StaticProviderRegistry::new());
    let soon = Arc::new(chat_provider().with_expiry(Utc::now() + ChronoDuration::minutes(5)));
    let later = Arc::new(chat_provider().with_expiry(Utc::now() + ChronoDuration::hours(2)));
    let unknown = Arc::new(chat_provider());
    let sms = Arc::new(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Delivered));
    registry.register("acme", soon.clone());
    registry.register("globex", later.clone());
    registry.register("initech", unknown.clone());
    registry.register("acme", sms.clone());

    let worker = TokenRefreshWorker::new(registry, REFRESH_AHEAD);
    let summary = worker.run_once().await;

    assert_eq!(summary.refreshed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(soon.refresh_count(), 1);
    assert_eq!(later.refresh_count(), 0);
    assert_eq!(unknown.refresh_count(), 1);
    assert_eq!(sms.refresh_count(), 0);
}

#[tokio::test]
async fn test_overlapping_tick_is_skipped() {
    let registry = Arc::new(StaticProviderRegistry::new());
    let provider = Arc::new(chat_provider().with_refresh_delay(Duration::from_millis(100)));
    registry.register("acme", provider.clone());
    let worker = Arc::new(TokenRefreshWorker::new(registry, REFRESH_AHEAD));

    let first = worker.handle_tick();
    let second = worker.handle_tick();

    assert!(first.is_some());
    assert!(second.is_none());
    assert!(worker.is_running());

    let summary = first.unwrap().await.unwrap();
    assert_eq!(summary.refreshed, 1);
    assert_eq!(provider.refresh_count(), 1);
    assert!(!worker.is_running());

    // The guard is released once the run ends
    let third = worker.handle_tick().unwrap();
    third.await.unwrap();
    assert_eq!(provider.refresh_count(), 2);
}

#[tokio::test]
async fn test_start_stops_on_cancel() {
    let registry = Arc::new(StaticProviderRegistry::new());
    let provider = Arc::new(chat_provider());
    registry.register("acme", provider.clone());
    let worker = Arc::new(TokenRefreshWorker::new(registry, REFRESH_AHEAD));

    let cancel = CancellationToken::new();
    let handle = worker.start(cancel.clone(), Duration::from_secs(3600));

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker did not stop")
        .unwrap();

    // The immediate first tick ran once
    assert_eq!(provider.refresh_count(), 1);
}
