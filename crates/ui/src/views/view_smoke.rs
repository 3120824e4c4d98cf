use playground_core::model::{ExerciseId, ExerciseSession, NewSession, SessionId};
use playground_core::time::fixed_now;
use services::GatewayError;

use super::test_harness::{StubGateway, ViewKind, exercise, setup_view_harness};

fn two_exercises() -> StubGateway {
    StubGateway::new(vec![exercise("intro", "Intro"), exercise("traits", "Traits")])
}

#[tokio::test(flavor = "current_thread")]
async fn shell_shows_splash_until_bootstrap_answers() {
    let mut gateway = two_exercises();
    gateway.bootstrap = None;
    let mut harness = setup_view_harness(ViewKind::Shell, gateway).await;

    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("Starting Rust Playground"), "missing splash in {html}");
    assert!(!html.contains("exercise-list"), "router rendered early in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn shell_reports_bootstrap_failure() {
    let mut gateway = two_exercises();
    gateway.bootstrap = Some(Err(GatewayError::Unavailable("backend offline".into())));
    let mut harness = setup_view_harness(ViewKind::Shell, gateway).await;

    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("could not start"), "missing failure title in {html}");
    assert!(html.contains("backend offline"), "missing cause in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn shell_lists_catalog_with_progress_and_resumed_session() {
    let mut gateway = two_exercises();
    gateway.completed = vec![ExerciseId::new("intro")];
    gateway.last_session = Some(ExerciseSession::start(
        SessionId::generate(),
        NewSession::new(ExerciseId::new("traits")).with_folder_path("/work/traits"),
        fixed_now(),
    ));
    let mut harness = setup_view_harness(ViewKind::Shell, gateway).await;

    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("1 / 2 completed"), "missing progress in {html}");
    assert!(html.contains("width: 50%;"), "missing progress bar in {html}");
    assert!(html.contains("exercise-item completed"), "missing completion mark in {html}");
    assert!(html.contains("exercise-item current"), "missing current marker in {html}");
    assert!(html.contains("<h2>Traits</h2>"), "missing resumed exercise in {html}");
    assert!(html.contains("/work/traits"), "missing session folder in {html}");
    assert_eq!(
        harness.store.current_exercise().map(|e| e.id().clone()),
        Some(ExerciseId::new("traits"))
    );
}

#[tokio::test(flavor = "current_thread")]
async fn exercise_markdown_is_rendered_sanitized() {
    let gateway = two_exercises()
        .with_markdown("intro.md", "# Welcome\n\nRun <script>alert(1)</script>`cargo run`.");
    let mut harness = setup_view_harness(ViewKind::Shell, gateway).await;

    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();

    assert!(html.contains("<h1>Welcome</h1>"), "missing markdown heading in {html}");
    assert!(html.contains("<code>cargo run</code>"), "missing inline code in {html}");
    assert!(!html.contains("alert(1)"), "script survived in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn missing_markdown_shows_placeholder() {
    let mut harness = setup_view_harness(ViewKind::Shell, two_exercises()).await;

    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();

    assert!(
        html.contains("This exercise has no description yet."),
        "missing placeholder in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn dangling_session_shows_status_message() {
    let mut gateway = two_exercises();
    gateway.last_session = Some(ExerciseSession::start(
        SessionId::generate(),
        NewSession::new(ExerciseId::new("removed")),
        fixed_now(),
    ));
    let mut harness = setup_view_harness(ViewKind::Shell, gateway).await;

    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("no longer available"), "missing status message in {html}");
    assert!(html.contains("Intro"), "catalog should stay usable in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn empty_catalog_shows_status_message() {
    let mut harness = setup_view_harness(ViewKind::Shell, StubGateway::new(Vec::new())).await;

    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("No exercises are installed yet."), "missing message in {html}");
    assert!(html.contains("0 / 0 completed"), "missing empty progress in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn about_view_shows_backend_details() {
    let mut harness = setup_view_harness(ViewKind::About, two_exercises()).await;

    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("Version 0.1.0"), "missing version in {html}");
    assert!(html.contains("rustc 1.85.0"), "missing toolchain in {html}");
    assert!(html.contains("Started 2023-11-14 22:13 UTC"), "missing timestamp in {html}");
    assert!(html.contains("Report an issue"), "missing support link in {html}");
}

fn button_markup<'a>(html: &'a str, label: &str) -> &'a str {
    let end = html.find(label).unwrap_or_else(|| panic!("no {label} button in {html}"));
    let start = html[..end].rfind("<button").unwrap();
    &html[start..end]
}

#[tokio::test(flavor = "current_thread")]
async fn arguments_can_be_saved_before_a_session_exists() {
    let mut harness = setup_view_harness(ViewKind::Shell, two_exercises()).await;

    harness.rebuild();
    let html = harness.render();

    assert!(harness.store.current_session().is_none());
    assert!(
        !button_markup(&html, "Save arguments").contains("disabled=true"),
        "save disabled in {html}"
    );
    assert!(
        button_markup(&html, "Verify").contains("disabled"),
        "verify enabled without a folder in {html}"
    );
}
