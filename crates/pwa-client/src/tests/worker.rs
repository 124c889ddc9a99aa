use super::sim;
use crate::ClientError;
use crate::host::WorkerPhase;
use crate::sim::{DeliverySource, SimHost};
use crate::worker::WorkerController;

#[tokio::test]
async fn register_is_idempotent() {
    let host = sim(SimHost::new());
    let mut controller = WorkerController::new(host.clone());

    let first = controller.register().await.unwrap();
    let second = controller.register().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(host.registration_count(), 1);
}

#[tokio::test]
async fn register_fails_without_worker_support() {
    let host = sim(SimHost::new().without_service_worker());
    let mut controller = WorkerController::new(host.clone());

    let result = controller.register().await;
    assert!(matches!(result, Err(ClientError::UnsupportedEnvironment)));
    assert_eq!(host.registration_count(), 0);
}

#[tokio::test]
async fn registration_error_carries_host_message() {
    let host = sim(SimHost::new().failing_registration("script 404"));
    let mut controller = WorkerController::new(host.clone());

    match controller.register().await {
        Err(ClientError::RegistrationFailed(message)) => assert_eq!(message, "script 404"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn unregister_without_handle_is_noop() {
    let host = sim(SimHost::new());
    let mut controller = WorkerController::new(host.clone());

    controller.unregister().await.unwrap();
    assert_eq!(host.registration_count(), 0);
}

#[tokio::test]
async fn unregister_clears_the_cached_handle() {
    let host = sim(SimHost::new());
    let mut controller = WorkerController::new(host.clone());

    controller.register().await.unwrap();
    controller.unregister().await.unwrap();
    assert!(controller.handle().is_none());

    controller.register().await.unwrap();
    assert_eq!(host.registration_count(), 2);
}

#[tokio::test]
async fn send_message_fails_silently() {
    let unsupported = sim(SimHost::new().without_service_worker());
    let controller = WorkerController::new(unsupported.clone());
    assert!(!controller.send_message("Hi", Some("there")));

    // Supported but nothing registered: still silent.
    let host = sim(SimHost::new());
    let controller = WorkerController::new(host.clone());
    assert!(!controller.send_message("Hi", Some("there")));
}

#[tokio::test]
async fn send_message_posts_to_registered_worker() {
    let host = sim(SimHost::new());
    let mut controller = WorkerController::new(host.clone());

    controller.register().await.unwrap();
    assert!(controller.send_message("Hi", Some("there")));

    let messages = host.posted_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["title"], "Hi");
    assert_eq!(messages[0]["body"], "there");
}

#[tokio::test]
async fn show_notification_unsupported_returns_false_without_registering() {
    let host = sim(SimHost::new().without_service_worker());
    let mut controller = WorkerController::new(host.clone());

    assert!(!controller.show_notification("Hi", Some("there")).await.unwrap());
    assert_eq!(host.registration_count(), 0);
}

#[tokio::test]
async fn show_notification_registers_internally() {
    let host = sim(SimHost::new());
    let mut controller = WorkerController::new(host.clone());

    assert!(controller.show_notification("Hi", Some("there")).await.unwrap());
    assert_eq!(host.registration_count(), 1);

    let entries = host.sink().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, DeliverySource::Worker);
    assert_eq!(entries[0].title, "Hi");
    assert_eq!(entries[0].body.as_deref(), Some("there"));
}

#[tokio::test]
async fn show_notification_requires_active_worker() {
    let host = sim(SimHost::new().with_register_phase(WorkerPhase::Installing));
    let mut controller = WorkerController::new(host.clone());

    let result = controller.show_notification("Hi", None).await;
    assert!(matches!(result, Err(ClientError::NoActiveWorker)));
    assert_eq!(host.sink().count(), 0);
}
