//! Embedded-mode startup and host messaging through the public API.

use std::time::Duration;

use serde_json::json;
use taskflow_core::{DemoCredentials, TaskCreateParams, TaskId};
use taskflow_embed::{CredentialSource, EmbedError, HostEnd, HostLink, OutboundMessage};
use taskflow_settings::{LatencySettings, TaskflowSettings};
use taskflow_view::{App, RunMode, TaskForm};
use tokio::time::Instant;

fn settings() -> TaskflowSettings {
    let mut settings = TaskflowSettings::default();
    settings.backend.latency = LatencySettings::none();
    settings
}

fn credentials(id: &str, name: &str) -> serde_json::Value {
    json!({
        "type": "DEMO_CREDENTIALS",
        "credentials": {
            "user": { "id": id, "name": name, "email": format!("{id}@example.com"), "role": "user" },
            "preferences": { "theme": "dark", "notifications": true }
        }
    })
}

fn types(host: &mut HostEnd) -> Vec<&'static str> {
    host.drain()
        .iter()
        .map(|posted| posted.message.message_type())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn silent_host_falls_back_after_timeout() {
    let (link, mut host) = HostLink::pair();
    let start = Instant::now();
    let app = App::bootstrap(settings(), RunMode::Embedded(link))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(3000));
    assert!(start.elapsed() < Duration::from_millis(3100));
    assert_eq!(app.credentials(), DemoCredentials::fallback());
    assert_eq!(
        app.credential_source(),
        &CredentialSource::Fallback(EmbedError::Timeout { timeout_ms: 3000 })
    );
    assert_eq!(types(&mut host), vec!["REQUEST_DEMO_CREDENTIALS"]);
}

#[tokio::test(start_paused = true)]
async fn ready_is_posted_once_after_first_load() {
    let (link, mut host) = HostLink::pair();
    let mut app = App::bootstrap(settings(), RunMode::Embedded(link))
        .await
        .unwrap();
    assert_eq!(types(&mut host), vec!["REQUEST_DEMO_CREDENTIALS"]);
    assert!(!app.notifier().ready_sent());

    app.start().await;
    app.controller_mut().reload().await;
    app.open("/category/2").await.unwrap();

    let posted = host.drain();
    assert_eq!(posted.len(), 1);
    match &posted[0].message {
        OutboundMessage::Ready { user, .. } => assert_eq!(user.name, "Demo User"),
        other => panic!("expected ready, got {other:?}"),
    }
    assert_eq!(posted[0].target_origin, "*");
}

#[tokio::test(start_paused = true)]
async fn host_credentials_scope_tasks_and_creates() {
    let (link, mut host) = HostLink::pair();
    let (app, ()) = tokio::join!(
        App::bootstrap(settings(), RunMode::Embedded(link)),
        async {
            let request = host.recv().await.unwrap();
            assert_eq!(request.message.message_type(), "REQUEST_DEMO_CREDENTIALS");
            assert!(host.send(credentials("u-ada", "Ada")));
        }
    );
    let mut app = app.unwrap();
    assert_eq!(app.credential_source(), &CredentialSource::Host);
    assert_eq!(app.credentials().user.id, "u-ada");

    // a task owned by someone else never shows up
    let foreign = app
        .services()
        .tasks
        .create(&TaskCreateParams {
            title: "Someone else's task".into(),
            demo_user_id: Some("u-grace".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    app.start().await;
    assert!(app.controller().tasks().iter().all(|t| t.id != foreign.id));
    assert_eq!(app.controller().tasks().len(), 8);

    app.controller_mut().open_create().await;
    let created = app
        .controller_mut()
        .submit(&TaskForm::titled("Water the plants"))
        .await
        .unwrap();
    assert_eq!(created.demo_user_id.as_deref(), Some("u-ada"));
    assert_eq!(created.created_by.as_deref(), Some("Ada"));

    let posted = host.drain();
    let types: Vec<_> = posted.iter().map(|p| p.message.message_type()).collect();
    assert_eq!(types, vec!["TASKFLOW_READY", "TASKFLOW_TASK_CREATED"]);
    match &posted[1].message {
        OutboundMessage::TaskCreated { task, user, .. } => {
            assert_eq!(task.id, created.id);
            assert_eq!(user.id, "u-ada");
        }
        other => panic!("expected task created, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn late_credentials_apply_to_later_creates() {
    let (link, host) = HostLink::pair();
    let mut app = App::bootstrap(settings(), RunMode::Embedded(link))
        .await
        .unwrap();
    assert!(matches!(app.credential_source(), CredentialSource::Fallback(_)));

    assert!(host.send(credentials("u-late", "Late Larry")));
    for _ in 0..10 {
        if app.credentials().user.id == "u-late" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert_eq!(app.credentials().user.name, "Late Larry");
    // the handshake outcome itself does not change
    assert!(matches!(app.credential_source(), CredentialSource::Fallback(_)));

    app.start().await;
    app.controller_mut().open_create().await;
    let created = app
        .controller_mut()
        .submit(&TaskForm::titled("Stretch"))
        .await
        .unwrap();
    assert_eq!(created.demo_user_id.as_deref(), Some("u-late"));
}

#[tokio::test(start_paused = true)]
async fn host_that_stops_listening_does_not_break_the_app() {
    let (link, mut host) = HostLink::pair();
    host.close_outbound();
    let start = Instant::now();
    let mut app = App::bootstrap(settings(), RunMode::Embedded(link))
        .await
        .unwrap();
    // the request could not be posted, so there is nothing to wait for
    assert!(start.elapsed() < Duration::from_millis(3000));
    assert!(matches!(
        app.credential_source(),
        CredentialSource::Fallback(EmbedError::Post(_))
    ));

    app.start().await;
    assert_eq!(app.controller().tasks().len(), 8);
    let _ = app.controller_mut().archive(TaskId::new(1)).await.unwrap();
    assert_eq!(app.controller().tasks().len(), 7);
}
