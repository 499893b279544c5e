//! Unit tests for CourierService

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{ChannelType, RetryTask};
use crate::domain::value_objects::RetryPolicy;
use crate::errors::DomainError;
use crate::repositories::{MockOtpQueue, OtpQueue};
use crate::services::channel::tests::mocks::{MockChannelProvider, MockOutcome};
use crate::services::channel::{ProviderRegistry, StaticProviderRegistry};
use crate::services::courier::{
    CourierConfig, CourierService, DispatchOutcome, OtpRequest, RedeliveryOutcome, SendRateLimit,
};
use crate::services::rate_limit::tests::mocks::MockCounterStore;
use crate::services::rate_limit::FixedWindowRateLimiter;

const TENANT: &str = "acme";
const RECEIVER: &str = "+15550001111";

struct Harness {
    courier: CourierService,
    queue: Arc<MockOtpQueue>,
    registry: Arc<StaticProviderRegistry>,
}

fn config() -> CourierConfig {
    CourierConfig {
        retry_policy: RetryPolicy::new(Duration::from_secs(5), Duration::from_secs(60), 3),
        otp_ttl: Duration::from_secs(300),
        rate_limit: Some(SendRateLimit {
            limit: 2,
            window: Duration::from_secs(3600),
        }),
    }
}

fn harness_with(provider: Option<MockChannelProvider>) -> (Harness, Option<Arc<MockChannelProvider>>) {
    let queue = Arc::new(MockOtpQueue::new());
    let registry = Arc::new(StaticProviderRegistry::new());
    let provider = provider.map(Arc::new);
    if let Some(p) = &provider {
        registry.register(TENANT, p.clone());
    }
    let limiter = Arc::new(FixedWindowRateLimiter::new(Arc::new(MockCounterStore::new())));
    let courier = CourierService::new(queue.clone(), limiter, registry.clone(), config());
    (
        Harness {
            courier,
            queue,
            registry,
        },
        provider,
    )
}

fn request() -> OtpRequest {
    OtpRequest::new(TENANT, RECEIVER, ChannelType::Sms, "123456")
}

#[tokio::test]
async fn test_send_otp_delivered() {
    let (h, provider) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Delivered)));
    let provider = provider.unwrap();

    let outcome = h.courier.send_otp(request()).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Delivered { .. }));

    let pending = h.courier.pending(TENANT, RECEIVER).await.unwrap();
    assert_eq!(
        pending.message,
        "Your verification code is 123456. It expires in 5 minutes."
    );
    assert_eq!(h.queue.pending_ttl(TENANT, RECEIVER).await, Some(Duration::from_secs(300)));
    assert_eq!(h.queue.retry_count().await, 0);
    assert_eq!(provider.send_count(), 1);
}

#[tokio::test]
async fn test_send_otp_transient_failure_is_queued() {
    let (h, _) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Transient)));

    let before = Utc::now();
    let outcome = h.courier.send_otp(request()).await.unwrap();

    match outcome {
        DispatchOutcome::Queued { ready_at, retry_count } => {
            assert_eq!(retry_count, 1);
            assert!(ready_at >= before + chrono::Duration::seconds(5));
        }
        other => panic!("Expected queued outcome, got {:?}", other),
    }

    let task = h.queue.retry_task(TENANT, RECEIVER).await.unwrap();
    assert_eq!(task.message, "123456");
    assert_eq!(task.channel, ChannelType::Sms);
    assert!(h.courier.pending(TENANT, RECEIVER).await.is_ok());
}

#[tokio::test]
async fn test_send_otp_auth_failure_is_queued() {
    let (h, _) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::AuthExpired)));
    let outcome = h.courier.send_otp(request()).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Queued { retry_count: 1, .. }));
}

#[tokio::test]
async fn test_send_otp_configuration_failure_is_not_retried() {
    let (h, _) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Misconfigured)));

    let err = h.courier.send_otp(request()).await.unwrap_err();
    assert!(matches!(err, DomainError::Configuration { .. }));
    assert_eq!(h.queue.retry_count().await, 0);
    assert!(h.courier.pending(TENANT, RECEIVER).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_send_otp_without_provider() {
    let (h, _) = harness_with(None);

    let err = h.courier.send_otp(request()).await.unwrap_err();
    assert!(matches!(err, DomainError::Configuration { .. }));
    assert!(h.courier.pending(TENANT, RECEIVER).await.is_err());
}

#[tokio::test]
async fn test_send_otp_rate_limited_before_queueing() {
    let (h, provider) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Delivered)));
    let provider = provider.unwrap();

    h.courier.send_otp(request()).await.unwrap();
    h.courier.send_otp(request()).await.unwrap();
    h.courier.cancel(TENANT, RECEIVER).await.unwrap();

    let err = h.courier.send_otp(request()).await.unwrap_err();
    assert!(matches!(err, DomainError::RateLimitExceeded { limit: 2, .. }));
    assert!(h.courier.pending(TENANT, RECEIVER).await.is_err());
    assert_eq!(provider.send_count(), 2);
}

#[tokio::test]
async fn test_send_otp_rejects_empty_receiver() {
    let (h, _) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Delivered)));
    let err = h
        .courier
        .send_otp(OtpRequest::new(TENANT, "  ", ChannelType::Sms, "123456"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn test_redeliver_success_clears_task_and_pending() {
    let (h, provider) = harness_with(Some(MockChannelProvider::scripted(
        ChannelType::Sms,
        &[MockOutcome::Transient],
        MockOutcome::Delivered,
    )));
    let provider = provider.unwrap();
    h.courier.send_otp(request()).await.unwrap();
    let task = h.queue.retry_task(TENANT, RECEIVER).await.unwrap();

    let outcome = h.courier.redeliver(&task).await.unwrap();

    assert!(matches!(outcome, RedeliveryOutcome::Delivered { .. }));
    assert_eq!(h.queue.retry_count().await, 0);
    assert!(h.courier.pending(TENANT, RECEIVER).await.is_err());
    let sent = provider.sent.lock().unwrap().clone();
    assert_eq!(sent[1], (TENANT.to_string(), RECEIVER.to_string(), "123456".to_string()));
}

#[tokio::test]
async fn test_delivered_otp_discards_retry_of_previous_otp() {
    let (h, provider) = harness_with(Some(MockChannelProvider::scripted(
        ChannelType::Sms,
        &[MockOutcome::Transient],
        MockOutcome::Delivered,
    )));
    let provider = provider.unwrap();

    let first = h
        .courier
        .send_otp(OtpRequest::new(TENANT, RECEIVER, ChannelType::Sms, "111111"))
        .await
        .unwrap();
    assert!(matches!(first, DispatchOutcome::Queued { .. }));

    let second = h
        .courier
        .send_otp(OtpRequest::new(TENANT, RECEIVER, ChannelType::Sms, "222222"))
        .await
        .unwrap();
    assert!(matches!(second, DispatchOutcome::Delivered { .. }));

    assert!(h.queue.retry_task(TENANT, RECEIVER).await.is_none());
    let due = h
        .queue
        .get_due_retry_tasks(Utc::now() + chrono::Duration::hours(1))
        .await
        .unwrap();
    assert!(due.is_empty());

    let pending = h.courier.pending(TENANT, RECEIVER).await.unwrap();
    assert!(pending.message.contains("222222"));
    assert_eq!(provider.send_count(), 2);
}

#[tokio::test]
async fn test_redeliver_failure_reschedules_with_backoff() {
    let (h, _) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Transient)));
    let task = h
        .queue
        .enqueue_retry(&RetryTask::new(TENANT, RECEIVER, ChannelType::Sms, "123456"), Duration::ZERO)
        .await
        .unwrap();
    let task = h.queue.enqueue_retry(&task, Duration::ZERO).await.unwrap();
    assert_eq!(task.retry_count, 2);

    let before = Utc::now();
    let outcome = h.courier.redeliver(&task).await.unwrap();

    match outcome {
        RedeliveryOutcome::Rescheduled { ready_at, retry_count } => {
            assert_eq!(retry_count, 3);
            // 2^2 * 5s
            assert!(ready_at >= before + chrono::Duration::seconds(20));
            assert!(ready_at <= Utc::now() + chrono::Duration::seconds(20));
        }
        other => panic!("Expected rescheduled outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redeliver_gives_up_when_exhausted() {
    let (h, _) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Transient)));
    let mut task = RetryTask::new(TENANT, RECEIVER, ChannelType::Sms, "123456");
    task.retry_count = 3;
    h.queue.insert_retry(task.clone()).await;

    let outcome = h.courier.redeliver(&task).await.unwrap();

    assert_eq!(outcome, RedeliveryOutcome::Abandoned { retry_count: 3 });
    assert_eq!(h.queue.retry_count().await, 0);
}

#[tokio::test]
async fn test_redeliver_drops_task_without_provider() {
    let (h, _) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Transient)));
    let task = RetryTask::new(TENANT, RECEIVER, ChannelType::Webhook, "123456");
    h.queue.insert_retry(task.clone()).await;

    let outcome = h.courier.redeliver(&task).await.unwrap();

    assert_eq!(outcome, RedeliveryOutcome::Dropped);
    assert_eq!(h.queue.retry_count().await, 0);
    assert!(h.registry.resolve(TENANT, ChannelType::Webhook).is_none());
}

#[tokio::test]
async fn test_cancel_removes_pending_and_retry() {
    let (h, _) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Transient)));
    h.courier.send_otp(request()).await.unwrap();

    h.courier.cancel(TENANT, RECEIVER).await.unwrap();

    assert!(h.courier.pending(TENANT, RECEIVER).await.unwrap_err().is_not_found());
    assert_eq!(h.queue.retry_count().await, 0);
    // Cancelling twice is harmless
    h.courier.cancel(TENANT, RECEIVER).await.unwrap();
}

#[tokio::test]
async fn test_queue_failure_surfaces_as_storage_error() {
    let (h, _) = harness_with(Some(MockChannelProvider::new(ChannelType::Sms, MockOutcome::Delivered)));
    h.queue.fail_writes(true);

    let err = h.courier.send_otp(request()).await.unwrap_err();
    assert!(matches!(err, DomainError::Storage { .. }));
}
