use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use playground_core::model::{
    BootstrapInfo, Exercise, ExerciseId, ExerciseSession, MarkdownRef, NewSession, SessionId,
    SessionPatch, VerificationReport,
};
use playground_core::time::fixed_now;
use services::{AppBootstrap, AppServices, BackendGateway, ExerciseStore, GatewayError};

use crate::app::BootGate;
use crate::context::{UiApp, build_app_context};
use crate::platform::{LinkOpenerRef, UiLinkOpener};
use crate::views::AboutView;

/// Read-only backend for rendering tests.
pub struct StubGateway {
    /// `None` never answers, leaving the app on its splash screen.
    pub bootstrap: Option<Result<BootstrapInfo, GatewayError>>,
    pub catalog: Vec<Exercise>,
    pub last_session: Option<ExerciseSession>,
    pub completed: Vec<ExerciseId>,
    pub markdown: HashMap<String, String>,
}

impl StubGateway {
    pub fn new(catalog: Vec<Exercise>) -> Self {
        Self {
            bootstrap: Some(Ok(bootstrap_info())),
            catalog,
            last_session: None,
            completed: Vec::new(),
            markdown: HashMap::new(),
        }
    }

    pub fn with_markdown(mut self, name: &str, text: &str) -> Self {
        self.markdown.insert(name.to_owned(), text.to_owned());
        self
    }
}

fn read_only() -> GatewayError {
    GatewayError::Rejected("stub gateway is read-only".into())
}

#[async_trait]
impl BackendGateway for StubGateway {
    async fn load_bootstrap(&self) -> Result<BootstrapInfo, GatewayError> {
        match &self.bootstrap {
            Some(result) => result.clone(),
            None => std::future::pending().await,
        }
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>, GatewayError> {
        Ok(self.catalog.clone())
    }

    async fn last_session(&self) -> Result<Option<ExerciseSession>, GatewayError> {
        Ok(self.last_session.clone())
    }

    async fn create_session(&self, _: NewSession) -> Result<ExerciseSession, GatewayError> {
        Err(read_only())
    }

    async fn update_session(&self, _: SessionPatch) -> Result<ExerciseSession, GatewayError> {
        Err(read_only())
    }

    async fn verify_exercise(&self, _: SessionId) -> Result<VerificationReport, GatewayError> {
        Err(read_only())
    }

    async fn fetch_markdown(&self, reference: MarkdownRef) -> Result<String, GatewayError> {
        self.markdown
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(reference.to_string()))
    }

    async fn pick_folder(&self) -> Result<Option<String>, GatewayError> {
        Ok(None)
    }

    async fn completed_exercise_ids(&self) -> Result<Vec<ExerciseId>, GatewayError> {
        Ok(self.completed.clone())
    }
}

struct SilentOpener;

impl UiLinkOpener for SilentOpener {
    fn open_url(&self, _url: &str) {}
}

struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn store(&self) -> Arc<ExerciseStore> {
        self.services.store()
    }

    fn bootstrap(&self) -> Arc<AppBootstrap> {
        self.services.bootstrap()
    }

    fn gateway(&self) -> Arc<dyn BackendGateway> {
        self.services.gateway()
    }

    fn link_opener(&self) -> LinkOpenerRef {
        Arc::new(SilentOpener)
    }
}

pub fn bootstrap_info() -> BootstrapInfo {
    BootstrapInfo {
        app_name: "Rust Playground".into(),
        backend_version: "0.1.0".into(),
        toolchain_version: Some("rustc 1.85.0".into()),
        support_link: "https://example.com/support".into(),
        loaded_on: fixed_now(),
    }
}

pub fn exercise(id: &str, name: &str) -> Exercise {
    Exercise::new(ExerciseId::new(id), name, MarkdownRef::new(format!("{id}.md")))
        .expect("valid exercise")
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Bootstrap gate plus the real router.
    Shell,
    About,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewHarnessRoot(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    match props.view {
        ViewKind::Shell => rsx! { BootGate {} },
        ViewKind::About => rsx! { Router::<TestRoute> {} },
    }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    rsx! { AboutView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub store: Arc<ExerciseStore>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Builds the app over `gateway`, running both loaders before the first render.
pub async fn setup_view_harness(view: ViewKind, gateway: StubGateway) -> ViewHarness {
    let preload = gateway.bootstrap.is_some();
    let services = AppServices::from_gateway(Arc::new(gateway));
    if preload {
        services.bootstrap().load().await;
        services.store().load().await;
    }

    let store = services.store();
    let app = Arc::new(TestApp { services });
    let dom = VirtualDom::new_with_props(ViewHarnessRoot, ViewHarnessProps { app, view });

    ViewHarness { dom, store }
}
