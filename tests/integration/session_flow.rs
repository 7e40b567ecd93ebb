//! Multi-step dashboard sessions driven through the public API.

use std::sync::Arc;
use std::time::Duration;

use dashvars::config::ResolverConfig;
use dashvars::executor::FixtureExecutor;
use dashvars::session::{DashboardSession, VariableView};
use dashvars::test_utils::init_test_logging;
use dashvars::variable::{SelectedValue, Variable, VariableSet};
use tokio::sync::mpsc;

fn find<'a>(views: &'a [VariableView], name: &str) -> &'a VariableView {
    views.iter().find(|view| view.name == name).unwrap()
}

/// datacenter → rack → server, where racks in both datacenters share names.
fn inventory() -> (VariableSet, FixtureExecutor) {
    let variables = VariableSet::from_variables([
        Variable::custom("datacenter", "fra, ams"),
        Variable::query("rack", "racks({{.datacenter}})"),
        Variable::query("server", "servers({{.datacenter}}, {{.rack}})").with_multi_select(true),
    ])
    .unwrap();

    let executor = FixtureExecutor::default()
        .with_values("racks(fra)", ["r1", "r2"])
        .with_values("racks(ams)", ["r1", "r2"])
        .with_values("servers(fra, r1)", ["fra-r1-a", "fra-r1-b"])
        .with_values("servers(fra, r2)", ["fra-r2-a"])
        .with_values("servers(ams, r1)", ["ams-r1-a"]);
    (variables, executor)
}

#[tokio::test]
async fn test_variable_with_two_dependencies() {
    init_test_logging(None);
    let (variables, executor) = inventory();
    let executor = Arc::new(executor);
    let (mut session, _handle) =
        DashboardSession::new(variables, Arc::clone(&executor), ResolverConfig::default()).unwrap();
    session.run_until_idle().await;

    let views = session.snapshot();
    assert_eq!(find(&views, "rack").selected_value_string(), "r1");
    assert_eq!(find(&views, "server").selected_value_string(), "fra-r1-a,fra-r1-b");

    // Racks are unchanged, so rack keeps r1; the server query still re-runs
    // because it references datacenter directly.
    session.select("datacenter", SelectedValue::single("ams")).unwrap();
    session.run_until_idle().await;

    let views = session.snapshot();
    assert_eq!(find(&views, "rack").selected_value_string(), "r1");
    let server = find(&views, "server");
    assert!(server.all_selected);
    assert_eq!(server.selected_value_string(), "ams-r1-a");
    assert_eq!(
        executor.calls(),
        vec!["racks(fra)", "servers(fra, r1)", "racks(ams)", "servers(ams, r1)"]
    );
}

#[tokio::test]
async fn test_manual_selection_survives_unrelated_refresh() {
    let (variables, executor) = inventory();
    let (mut session, _handle) =
        DashboardSession::new(variables, Arc::new(executor), ResolverConfig::default()).unwrap();
    session.run_until_idle().await;

    session.select("server", SelectedValue::multi(["fra-r1-b"])).unwrap();
    session.refresh("rack").unwrap();
    session.run_until_idle().await;

    let server = session.view("server").unwrap();
    assert_eq!(server.selected_value_string(), "fra-r1-b");
    assert!(!server.all_selected);
}

#[tokio::test(start_paused = true)]
async fn test_handle_session_with_change_feed() {
    let variables = VariableSet::from_variables([
        Variable::textbox("filter"),
        Variable::query("matches", "match({{.filter}})"),
    ])
    .unwrap();
    let executor = FixtureExecutor::default()
        .with_values("match()", ["all"])
        .with_delayed_values("match(api)", ["api-1", "api-2"], Duration::from_millis(20));
    let config = ResolverConfig {
        debounce_ms: 100,
        ..ResolverConfig::default()
    };
    let (session, handle) = DashboardSession::new(variables, Arc::new(executor), config).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = session.with_change_sender(tx);

    let driver = async {
        for text in ["a", "ap", "api"] {
            handle.type_text("filter", text).await.unwrap();
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        let views = handle.snapshot().await.unwrap();
        handle.shutdown();
        views
    };
    let ((), views) = tokio::join!(session.run(), driver);

    assert_eq!(find(&views, "filter").selected_value_string(), "api");
    assert_eq!(find(&views, "matches").selected_value_string(), "api-1");

    let mut names = Vec::new();
    while let Ok(change) = rx.try_recv() {
        names.push(change.name);
    }
    assert_eq!(names, vec!["matches", "filter", "matches"]);
}
