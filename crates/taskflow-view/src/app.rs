//! Application bootstrap.
//!
//! Startup order: settings, credentials handshake (embedded only), the
//! [`Services`] container, then the screens. The credentials watch receiver
//! goes to the controller so late host credentials apply to later loads
//! and creates.
//!
//! Screen operations run inside a panic boundary. Business failures never
//! reach it (the controller turns them into notifications); a panic moves
//! the app to [`Screen::Fault`] until [`App::reload`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use taskflow_core::logging::{init_json_subscriber, init_subscriber};
use taskflow_core::{DemoCredentials, ParseError, Route, Task};
use taskflow_embed::{
    CredentialHandshake, CredentialSource, HostLink, HostNotifier, SessionCredentials,
};
use taskflow_settings::{
    LoggingSettings, TaskflowSettings, load_settings, load_settings_from_path,
};
use taskflow_tasks::Services;
use tracing::{error, info};

use crate::controller::{EmptyState, TaskListController};
use crate::errors::AppError;
use crate::sidebar::{CategorySidebar, SidebarEntry};

/// How the app is hosted.
pub enum RunMode {
    /// On its own; fallback credentials, no host messages.
    Standalone,
    /// Inside a host page reachable through the link.
    Embedded(HostLink),
}

/// What the app presents right now.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Screen {
    /// The task list with its sidebar.
    Tasks {
        /// Page heading.
        header: String,
        /// "N tasks" label.
        count: String,
        /// Sidebar rows.
        sidebar: Vec<SidebarEntry>,
        /// Visible tasks after search, filter and sort.
        tasks: Vec<Task>,
        /// Placeholder shown when `tasks` is empty.
        empty: Option<EmptyState>,
        /// Whether the create/edit modal is showing.
        modal_open: bool,
    },
    /// A screen operation panicked. Only [`App::reload`] leaves this state.
    Fault {
        /// Panic message.
        message: String,
    },
}

/// A running TaskFlow instance.
pub struct App {
    settings: TaskflowSettings,
    services: Services,
    session: SessionCredentials,
    notifier: Arc<HostNotifier>,
    controller: TaskListController,
    sidebar: CategorySidebar,
    fault: Option<String>,
}

/// Install the `tracing` subscriber described by `settings`.
pub fn init_logging(settings: &LoggingSettings) {
    if settings.json {
        init_json_subscriber(&settings.level);
    } else {
        init_subscriber(&settings.level);
    }
}

impl App {
    /// Load settings (from `path`, or the default location), install logging,
    /// and bootstrap.
    pub async fn load(path: Option<&Path>, mode: RunMode) -> Result<Self, AppError> {
        let settings = match path {
            Some(path) => load_settings_from_path(path)?,
            None => load_settings()?,
        };
        init_logging(&settings.logging);
        Self::bootstrap(settings, mode).await
    }

    /// Build every component from already-loaded settings.
    ///
    /// In embedded mode this waits for the credential handshake, which is
    /// bounded by `embed.handshakeTimeoutMs`.
    pub async fn bootstrap(settings: TaskflowSettings, mode: RunMode) -> Result<Self, AppError> {
        settings.validate()?;

        let handshake = CredentialHandshake::from_settings(&settings.embed);
        let (session, notifier) = match mode {
            RunMode::Standalone => (handshake.standalone(), HostNotifier::disabled()),
            RunMode::Embedded(link) => {
                let outbound = Arc::clone(&link.outbound);
                (handshake.run(link).await, HostNotifier::new(outbound))
            }
        };
        let notifier = Arc::new(notifier);

        let services = Services::from_settings(&settings.backend)?;
        let controller = TaskListController::new(
            services.clone(),
            session.subscribe(),
            Arc::clone(&notifier),
            &settings.view,
        );
        let sidebar = CategorySidebar::new(services.categories.clone());

        info!(
            embedded = notifier.is_embedded(),
            user = %session.current().user.name,
            backend = ?settings.backend.kind,
            "taskflow started"
        );

        Ok(Self {
            settings,
            services,
            session,
            notifier,
            controller,
            sidebar,
            fault: None,
        })
    }

    /// Load the sidebar and the root task list.
    pub async fn start(&mut self) {
        self.load_screen(Route::AllTasks).await;
    }

    /// Navigate to a path such as `/` or `/category/2`.
    pub async fn open(&mut self, path: &str) -> Result<(), ParseError> {
        let route: Route = path.parse()?;
        let outcome = AssertUnwindSafe(self.controller.navigate(route))
            .catch_unwind()
            .await;
        let _ = self.contain(outcome);
        Ok(())
    }

    /// Leave the fault screen (if any) and reload the current route.
    pub async fn reload(&mut self) {
        if let Some(message) = self.fault.take() {
            info!(fault = %message, "reloading after fault");
        }
        let route = self.controller.route();
        self.load_screen(route).await;
    }

    async fn load_screen(&mut self, route: Route) {
        let outcome = AssertUnwindSafe(async {
            self.sidebar.load().await;
            self.controller.navigate(route).await;
        })
        .catch_unwind()
        .await;
        let _ = self.contain(outcome);
    }

    /// The current screen.
    pub fn render(&mut self) -> Screen {
        self.render_with(Self::task_screen)
    }

    /// Build a screen with `view` inside the panic boundary. While faulted the
    /// view is not called.
    pub fn render_with(&mut self, view: impl FnOnce(&Self) -> Screen) -> Screen {
        if self.fault.is_none() {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| view(self)));
            if let Some(screen) = self.contain(outcome) {
                return screen;
            }
        }
        Screen::Fault {
            message: self.fault.clone().unwrap_or_default(),
        }
    }

    /// Panic message of the current fault.
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    fn task_screen(&self) -> Screen {
        let controller = &self.controller;
        Screen::Tasks {
            header: controller.header_title().to_owned(),
            count: controller.count_label(),
            sidebar: self.sidebar_entries(),
            tasks: controller.visible().to_vec(),
            empty: controller.empty_state(),
            modal_open: controller.modal().is_open(),
        }
    }

    fn contain<T>(&mut self, outcome: std::thread::Result<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(panic) => {
                let message = panic_message(&*panic);
                error!(panic = %message, "screen operation panicked");
                self.fault = Some(message);
                None
            }
        }
    }

    /// Sidebar rows for the current route.
    pub fn sidebar_entries(&self) -> Vec<SidebarEntry> {
        self.sidebar.entries(self.controller.route())
    }

    /// Effective settings.
    pub fn settings(&self) -> &TaskflowSettings {
        &self.settings
    }

    /// Shared services.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Credentials in effect now.
    pub fn credentials(&self) -> DemoCredentials {
        self.session.current()
    }

    /// How the handshake resolved.
    pub fn credential_source(&self) -> &CredentialSource {
        self.session.source()
    }

    /// Host notifier.
    pub fn notifier(&self) -> &HostNotifier {
        &self.notifier
    }

    /// Task list screen.
    pub fn controller(&self) -> &TaskListController {
        &self.controller
    }

    /// Task list screen, mutably.
    pub fn controller_mut(&mut self) -> &mut TaskListController {
        &mut self.controller
    }

    /// Category sidebar.
    pub fn sidebar(&self) -> &CategorySidebar {
        &self.sidebar
    }

    /// Category sidebar, mutably.
    pub fn sidebar_mut(&mut self) -> &mut CategorySidebar {
        &mut self.sidebar
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic")
        .to_owned()
}
