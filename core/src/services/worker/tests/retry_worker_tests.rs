//! Unit tests for RetryWorker

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::{ChannelType, RetryTask};
use crate::domain::value_objects::RetryPolicy;
use crate::repositories::{MockOtpQueue, OtpQueue};
use crate::services::channel::tests::mocks::{MockChannelProvider, MockOutcome};
use crate::services::channel::StaticProviderRegistry;
use crate::services::courier::{CourierConfig, CourierService};
use crate::services::rate_limit::tests::mocks::MockCounterStore;
use crate::services::rate_limit::FixedWindowRateLimiter;
use crate::services::worker::{RetryRunSummary, RetryWorker};

fn worker_with(providers: Vec<(&str, MockChannelProvider)>) -> (Arc<RetryWorker>, Arc<MockOtpQueue>) {
    let queue = Arc::new(MockOtpQueue::new());
    let registry = Arc::new(StaticProviderRegistry::new());
    for (tenant, provider) in providers {
        registry.register(tenant, Arc::new(provider));
    }
    let config = CourierConfig {
        retry_policy: RetryPolicy::new(Duration::from_secs(1), Duration::from_secs(10), 2),
        otp_ttl: Duration::from_secs(300),
        rate_limit: None,
    };
    let limiter = Arc::new(FixedWindowRateLimiter::new(Arc::new(MockCounterStore::new())));
    let courier = Arc::new(CourierService::new(queue.clone(), limiter, registry, config));
    (Arc::new(RetryWorker::new(queue.clone(), courier)), queue)
}

async fn seed(queue: &MockOtpQueue, tenant: &str, receiver: &str, channel: ChannelType, retry_count: u32) {
    let mut task = RetryTask::new(tenant, receiver, channel, "123456");
    task.retry_count = retry_count;
    queue.insert_retry(task).await;
}

#[tokio::test]
async fn test_run_once_without_due_tasks() {
    let (worker, _) = worker_with(vec![]);
    let summary = worker.run_once().await.unwrap();
    assert!(summary.is_idle());
}

#[tokio::test]
async fn test_run_once_classifies_each_task() {
    let (worker, queue) = worker_with(vec![
        ("acme", MockChannelProvider::new(ChannelType::Sms, MockOutcome::Delivered)),
        ("globex", MockChannelProvider::new(ChannelType::Sms, MockOutcome::Transient)),
    ]);
    seed(&queue, "acme", "+15550001111", ChannelType::Sms, 1).await;
    seed(&queue, "globex", "+15550002222", ChannelType::Sms, 1).await;
    seed(&queue, "globex", "+15550003333", ChannelType::Sms, 2).await;
    seed(&queue, "initech", "+15550004444", ChannelType::Sms, 1).await;

    let summary = worker.run_once().await.unwrap();

    assert_eq!(
        summary,
        RetryRunSummary {
            scanned: 4,
            delivered: 1,
            rescheduled: 1,
            abandoned: 1,
            dropped: 1,
            failed: 0,
        }
    );
    let rescheduled = queue.retry_task("globex", "+15550002222").await.unwrap();
    assert_eq!(rescheduled.retry_count, 2);
    assert_eq!(queue.retry_count().await, 1);
}

#[tokio::test]
async fn test_rescheduled_task_is_not_due_in_same_scan() {
    let (worker, queue) = worker_with(vec![(
        "acme",
        MockChannelProvider::new(ChannelType::Sms, MockOutcome::Transient),
    )]);
    seed(&queue, "acme", "+15550001111", ChannelType::Sms, 0).await;

    assert_eq!(worker.run_once().await.unwrap().rescheduled, 1);
    assert!(worker.run_once().await.unwrap().is_idle());
}

#[tokio::test]
async fn test_queue_failure_is_counted_not_fatal() {
    let (worker, queue) = worker_with(vec![(
        "acme",
        MockChannelProvider::new(ChannelType::Sms, MockOutcome::Delivered),
    )]);
    seed(&queue, "acme", "+15550001111", ChannelType::Sms, 1).await;
    queue.fail_writes(true);

    let summary = worker.run_once().await.unwrap();
    assert_eq!(summary.failed, 1);

    queue.fail_writes(false);
    assert_eq!(worker.run_once().await.unwrap().delivered, 1);
}

#[tokio::test]
async fn test_start_delivers_and_stops_on_cancel() {
    let (worker, queue) = worker_with(vec![(
        "acme",
        MockChannelProvider::new(ChannelType::Sms, MockOutcome::Delivered),
    )]);
    seed(&queue, "acme", "+15550001111", ChannelType::Sms, 1).await;

    let cancel = CancellationToken::new();
    let handle = worker.start(cancel.clone(), Duration::from_millis(10));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(queue.retry_count().await, 0);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker did not stop")
        .unwrap();
    assert!(queue.get_due_retry_tasks(chrono::Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_start_with_zero_interval_still_ticks() {
    let (worker, queue) = worker_with(vec![(
        "acme",
        MockChannelProvider::new(ChannelType::Sms, MockOutcome::Delivered),
    )]);
    seed(&queue, "acme", "+15550001111", ChannelType::Sms, 1).await;

    let cancel = CancellationToken::new();
    let handle = worker.start(cancel.clone(), Duration::ZERO);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(queue.retry_count().await, 0);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker did not stop")
        .unwrap();
}
