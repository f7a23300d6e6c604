use listener_console::{
    AppConfig, Console, ConsoleError, FileStorage, MemoryStorage, StorageState,
    navigation::{Decision, flatten::max_depth},
    storage::{KeyValueStorage, TOKEN_KEY},
};
use std::sync::Arc;

// --- Helpers ---

fn console_with(config: AppConfig) -> Console {
    let storage = Arc::new(MemoryStorage::new()) as StorageState;
    Console::new(&config, storage)
}

fn console() -> Console {
    console_with(AppConfig::default())
}

fn visited_paths(console: &Console) -> Vec<String> {
    console.views.visited().into_iter().map(|v| v.path).collect()
}

// --- Guard Scenarios ---

#[test]
fn test_login_round_trip() {
    let console = console();

    // Anonymous: bounced to login with the destination preserved.
    let report = console.navigation.navigate("/dashboard").unwrap();
    assert_eq!(report.route.path, "/login");
    assert_eq!(
        report.redirects,
        vec![Decision::RedirectLogin {
            target: "/login?redirect=%2Fdashboard".into()
        }]
    );

    console.session.set_token("abc").unwrap();

    // Authenticated: the login page bounces home.
    let ticket = console.navigation.begin("/login").unwrap();
    assert_eq!(
        ticket.decision,
        Decision::RedirectHome {
            target: "/".into()
        }
    );

    let report = console.navigation.navigate("/dashboard").unwrap();
    assert!(report.redirects.is_empty());
    assert_eq!(report.route.title(), Some("首页"));
    assert_eq!(report.document_title, "Listener Console | 首页");
    assert!(visited_paths(&console).contains(&"/dashboard".to_string()));
}

#[test]
fn test_allow_listed_pages_need_no_session() {
    let console = console();
    for path in ["/login", "/403", "/404", "/redirect/listener/https"] {
        let ticket = console.navigation.begin(path).unwrap();
        assert!(ticket.decision.is_allowed(), "{path} should be allowed");
    }
    let ticket = console.navigation.begin("/redirectx").unwrap();
    assert!(!ticket.decision.is_allowed());
}

#[test]
fn test_query_survives_the_login_redirect() {
    let console = console();
    let ticket = console.navigation.begin("/listener/https?page=2#top").unwrap();
    assert_eq!(
        ticket.decision.redirect_target(),
        Some("/login?redirect=%2Flistener%2Fhttps%3Fpage%3D2%23top")
    );
}

#[test]
fn test_unknown_path_lands_on_not_found_with_session() {
    let console = console();
    console.session.set_token("abc").unwrap();
    let report = console.navigation.navigate("/does/not/exist").unwrap();
    assert_eq!(report.route.view.as_deref(), Some("pages/error/404"));
}

// --- Two-Phase Protocol ---

#[test]
fn test_stale_navigation_is_discarded() {
    let console = console();
    console.session.set_token("abc").unwrap();
    let nav = &console.navigation;

    let first = nav.begin("/listener/https").unwrap();
    let second = nav.begin("/demo/element-plus").unwrap();

    nav.commit(&second).unwrap();
    assert!(matches!(
        nav.commit(&first),
        Err(ConsoleError::NavigationAborted(_))
    ));

    assert_eq!(nav.state().document_title(), "Listener Console | Element Plus");
    assert_eq!(
        nav.state().current_route().map(|r| r.path),
        Some("/demo/element-plus".to_string())
    );
    assert!(!visited_paths(&console).contains(&"/listener/https".to_string()));
}

#[test]
fn test_superseded_ticket_cannot_commit_first() {
    let console = console();
    console.session.set_token("abc").unwrap();
    let nav = &console.navigation;

    let first = nav.begin("/listener/https").unwrap();
    let _second = nav.begin("/demo/element-plus").unwrap();
    assert!(nav.commit(&first).is_err());
    assert!(nav.state().is_loading());
}

#[test]
fn test_listeners_see_committed_routes_only() {
    let console = console();
    console.session.set_token("abc").unwrap();
    let nav = &console.navigation;
    let mut rx = nav.state().subscribe();

    let redirected = nav.begin("/login").unwrap();
    assert!(nav.commit(&redirected).is_err());
    assert!(!rx.has_changed().unwrap());

    nav.navigate("/listener/https").unwrap();
    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.and_then(|r| r.name), Some("HttpsListener".to_string()));
}

// --- View Cache Through Navigation ---

#[test]
fn test_keep_alive_routes_are_cached() {
    let console = console();
    console.session.set_token("abc").unwrap();
    console.navigation.navigate("/listener/https").unwrap();
    console.navigation.navigate("/demo/composable-demo/use-fetch-select").unwrap();

    assert_eq!(console.views.cached(), vec!["HttpsListener".to_string()]);
    assert_eq!(
        visited_paths(&console),
        vec![
            "/dashboard".to_string(),
            "/listener/https".to_string(),
            "/demo/composable-demo/use-fetch-select".to_string(),
        ]
    );
}

#[test]
fn test_third_level_routes_are_cached_when_flattened() {
    let console = console_with(AppConfig {
        third_level_route_cache: true,
        ..AppConfig::default()
    });
    assert!(max_depth(console.routes()) <= 2);

    console.session.set_token("abc").unwrap();
    let report = console.navigation.navigate("/demo/level2/level3").unwrap();
    assert_eq!(report.route.name.as_deref(), Some("Level3"));
    assert!(console.views.cached().contains(&"Level3".to_string()));
}

#[test]
fn test_group_locations_resolve_the_same_when_flattened() {
    let destinations = |third_level_route_cache: bool| {
        let console = console_with(AppConfig {
            third_level_route_cache,
            ..AppConfig::default()
        });
        console.session.set_token("abc").unwrap();
        ["/demo/level2", "/demo/composable-demo"]
            .into_iter()
            .map(|path| {
                let report = console.navigation.navigate(path).unwrap();
                (report.route.name, report.route.view)
            })
            .collect::<Vec<_>>()
    };

    let nested = destinations(false);
    assert_eq!(
        nested,
        vec![
            (
                Some("Level3".to_string()),
                Some("pages/demo/level2/level3/index".to_string())
            ),
            (
                Some("UseFetchSelect".to_string()),
                Some("pages/demo/composable-demo/use-fetch-select".to_string())
            ),
        ]
    );
    assert_eq!(destinations(true), nested);
}

#[test]
fn test_logout_clears_views_without_tag_cache() {
    let console = console_with(AppConfig {
        cache_tags_view: false,
        ..AppConfig::default()
    });
    console.session.set_token("abc").unwrap();
    console.navigation.navigate("/listener/https").unwrap();

    console.session.logout();

    assert!(!console.session.is_authenticated());
    assert_eq!(visited_paths(&console), vec!["/dashboard".to_string()]);
    assert!(console.views.cached().is_empty());
    assert_eq!(console.session_info().reload_generation, 1);
}

#[test]
fn test_logout_keeps_views_with_tag_cache() {
    let console = console();
    console.session.set_token("abc").unwrap();
    console.navigation.navigate("/listener/https").unwrap();

    console.session.logout();

    assert!(visited_paths(&console).contains(&"/listener/https".to_string()));
    assert_eq!(console.views.cached(), vec!["HttpsListener".to_string()]);
}

// --- Persistence ---

#[test]
fn test_session_and_views_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = || Arc::new(FileStorage::new(dir.path())) as StorageState;

    let first = Console::new(&AppConfig::default(), storage());
    first.session.set_token("abc").unwrap();
    first.navigation.navigate("/listener/https").unwrap();
    drop(first);

    let second = Console::new(&AppConfig::default(), storage());
    assert!(second.session.is_authenticated());
    assert_eq!(second.session.token(), "abc");
    assert!(visited_paths(&second).contains(&"/listener/https".to_string()));
    // The affix view is not duplicated by reseeding.
    assert_eq!(
        visited_paths(&second)
            .iter()
            .filter(|p| p.as_str() == "/dashboard")
            .count(),
        1
    );
}

#[test]
fn test_failed_token_write_leaves_session_unchanged() {
    let storage = Arc::new(MemoryStorage::new_failing()) as StorageState;
    let console = Console::new(&AppConfig::default(), storage);

    assert!(matches!(
        console.session.set_token("abc"),
        Err(ConsoleError::StorageUnavailable(_))
    ));
    assert!(!console.session.is_authenticated());
    assert_eq!(console.session.token(), "");
}

#[test]
fn test_hydrate_reads_persisted_token() {
    let storage = Arc::new(MemoryStorage::with_value(TOKEN_KEY, "persisted"));
    let console = Console::new(&AppConfig::default(), storage.clone() as StorageState);
    assert!(console.session.is_authenticated());

    console.session.reset_token();
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    // A silent reset does not reload the router.
    assert_eq!(console.session_info().reload_generation, 0);
}
