//! Standalone task management through the public API.

use taskflow_core::{CategoryId, Route, SortKey, StatusFilter, TaskId, TaskPriority, TaskStatus};
use taskflow_settings::{LatencySettings, TaskflowSettings};
use taskflow_view::{App, EmptyState, NotificationKind, RunMode, TaskForm};

async fn started() -> App {
    let mut settings = TaskflowSettings::default();
    settings.backend.latency = LatencySettings::none();
    let mut app = App::bootstrap(settings, RunMode::Standalone).await.unwrap();
    app.start().await;
    app
}

#[tokio::test]
async fn archived_tasks_leave_the_list_but_still_resolve() {
    let mut app = started().await;
    let id = TaskId::new(4);

    let archived = app.controller_mut().archive(id).await.unwrap();
    assert!(archived.archived);
    assert!(app.controller().visible().iter().all(|t| t.id != id));

    app.controller_mut().reload().await;
    assert!(app.controller().tasks().iter().all(|t| t.id != id));

    let fetched = app.services().tasks.get_by_id(id).await.unwrap().unwrap();
    assert!(fetched.archived);
    assert!(app.services().tasks.search("plumber").await.unwrap().is_empty());

    let restored = app.services().tasks.restore(id).await.unwrap();
    assert!(!restored.archived);
    app.controller_mut().reload().await;
    assert!(app.controller().tasks().iter().any(|t| t.id == id));
}

#[tokio::test(start_paused = true)]
async fn search_filters_and_clears() {
    let mut app = started().await;
    let controller = app.controller_mut();

    controller.type_search("");
    assert!(controller.settle_search().await);
    assert_eq!(controller.visible().len(), 8);

    controller.type_search("nomatch12345");
    assert!(controller.settle_search().await);
    assert!(controller.visible().is_empty());
    assert_eq!(controller.empty_state(), Some(EmptyState::Search));
    assert_eq!(controller.count_label(), "0 tasks");

    controller.type_search("REPORT");
    assert!(controller.settle_search().await);
    assert_eq!(controller.visible().len(), 1);
    assert_eq!(controller.visible()[0].id, TaskId::new(1));
    assert_eq!(controller.count_label(), "1 task");

    controller.clear_search();
    assert_eq!(controller.visible().len(), 8);
}

#[tokio::test]
async fn filters_and_sorts_combine() {
    let mut app = started().await;
    let controller = app.controller_mut();

    controller.set_status_filter(StatusFilter::Only(TaskStatus::Pending));
    controller.set_sort(SortKey::DueDate);
    let due: Vec<_> = controller.visible().iter().map(|t| t.due_date).collect();
    assert!(controller
        .visible()
        .iter()
        .all(|t| t.status == TaskStatus::Pending));
    // dated first, ascending; undated last
    let first_undated = due.iter().position(Option::is_none).unwrap_or(due.len());
    assert!(due[first_undated..].iter().all(Option::is_none));
    assert!(due[..first_undated].windows(2).all(|w| w[0] <= w[1]));

    controller.set_sort(SortKey::Priority);
    let ranks: Vec<u8> = controller
        .visible()
        .iter()
        .map(|t| t.priority.rank())
        .collect();
    assert!(ranks.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(controller.visible()[0].priority, TaskPriority::High);
}

#[tokio::test]
async fn create_edit_and_complete() {
    let mut app = started().await;
    app.open("/category/4").await.unwrap();
    assert_eq!(app.controller().header_title(), "Health");
    assert_eq!(app.controller().count_label(), "2 tasks");

    let controller = app.controller_mut();
    controller.open_create().await;
    let mut form = controller.modal().initial_form();
    form.title = "Book eye exam".into();
    form.category_id = "4".into();
    form.due_date = "2026-12-01".into();
    let created = controller.submit(&form).await.unwrap();
    assert_eq!(created.category_id, CategoryId::new(4));
    assert_eq!(controller.visible().len(), 3);
    assert!(created.completed_at.is_none());

    let completed = controller
        .change_status(created.id, TaskStatus::Completed)
        .await
        .unwrap();
    assert!(completed.completed_at.is_some());

    controller.open_edit(completed.clone()).await;
    let mut form = controller.modal().initial_form();
    assert_eq!(form.due_date, "2026-12-01");
    form.status = TaskStatus::Pending;
    form.due_date.clear();
    let edited = controller.submit(&form).await.unwrap();
    assert_eq!(edited.due_date, None);
    assert!(edited.completed_at.is_none());

    let kinds: Vec<_> = controller
        .notifications()
        .drain()
        .into_iter()
        .map(|n| (n.kind, n.message))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (NotificationKind::Success, "Task created successfully".to_owned()),
            (NotificationKind::Success, "Task completed! 🎉".to_owned()),
            (NotificationKind::Success, "Task updated successfully".to_owned()),
        ]
    );

    // the sidebar reflects the new task once reloaded
    app.sidebar_mut().load().await;
    let entries = app.sidebar_entries();
    assert_eq!(entries[0].task_count, 9);
    let health = entries
        .iter()
        .find(|e| e.route == Route::Category(CategoryId::new(4)))
        .unwrap();
    assert_eq!(health.task_count, 3);
    assert!(health.active);
}
