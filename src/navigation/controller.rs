use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use utoipa::ToSchema;

use super::guard::{AllowList, Decision, decide};
use super::matcher::{ResolvedRoute, RouteMatcher};
use super::view::ViewFactory;
use crate::{
    error::ConsoleError,
    models::RouteNode,
    session::{RouterReset, SessionState},
    tags_view::ViewCacheState,
};

/// Route-level redirects and guard redirects followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// NavigationTicket
///
/// Result of the before-phase, handed back to [`NavigationController::commit`]
/// once the target has rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    pub seq: u64,
    pub to: ResolvedRoute,
    pub decision: Decision,
}

/// NavigationReport
///
/// Everything a full [`NavigationController::navigate`] went through.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigationReport {
    pub requested: String,
    /// Guard redirects taken on the way, in order.
    pub redirects: Vec<Decision>,
    pub route: ResolvedRoute,
    pub document_title: String,
}

#[derive(Debug, Default)]
struct Committed {
    seq: u64,
    route: Option<ResolvedRoute>,
    page_title: Option<String>,
    loading: bool,
}

/// NavigationState
///
/// Derived UI state of the last committed navigation: current route, title,
/// progress flag. Owns the sequence counter that tells a current navigation
/// from a superseded one.
pub struct NavigationState {
    app_title: String,
    issued: AtomicU64,
    reloads: AtomicU64,
    committed: Mutex<Committed>,
    route_tx: watch::Sender<Option<ResolvedRoute>>,
}

impl NavigationState {
    pub fn new(app_title: impl Into<String>) -> Self {
        let (route_tx, _) = watch::channel(None);
        Self {
            app_title: app_title.into(),
            issued: AtomicU64::new(0),
            reloads: AtomicU64::new(0),
            committed: Mutex::new(Committed::default()),
            route_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Committed> {
        self.committed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues the next sequence number and starts the progress indicator.
    fn start(&self) -> u64 {
        let mut committed = self.lock();
        committed.loading = true;
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn current_route(&self) -> Option<ResolvedRoute> {
        self.lock().route.clone()
    }

    pub fn page_title(&self) -> Option<String> {
        self.lock().page_title.clone()
    }

    /// `"<app> | <page>"`, or the application title alone.
    pub fn document_title(&self) -> String {
        match self.page_title() {
            Some(page) => format!("{} | {}", self.app_title, page),
            None => self.app_title.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn reload_generation(&self) -> u64 {
        self.reloads.load(Ordering::SeqCst)
    }

    /// Route-change listener; always holds the latest committed route.
    pub fn subscribe(&self) -> watch::Receiver<Option<ResolvedRoute>> {
        self.route_tx.subscribe()
    }
}

impl RouterReset for NavigationState {
    /// Invalidates in-flight tickets and forgets the committed route.
    fn reset_router(&self) {
        let mut committed = self.lock();
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        *committed = Committed {
            seq,
            ..Committed::default()
        };
        let generation = self.reloads.fetch_add(1, Ordering::SeqCst) + 1;
        self.route_tx.send_replace(None);
        tracing::info!(generation, "router reset");
    }
}

/// NavigationController
///
/// Runs every navigation through two phases. [`begin`](Self::begin) resolves
/// the target, asks the guard and hands out a ticket; [`commit`](Self::commit)
/// applies title, listeners and view cache once the target has rendered, but
/// only for the newest ticket.
pub struct NavigationController {
    matcher: RouteMatcher,
    allow_list: AllowList,
    session: SessionState,
    views: ViewCacheState,
    state: Arc<NavigationState>,
}

impl NavigationController {
    pub fn new(
        routes: &[RouteNode],
        allow_list: AllowList,
        session: SessionState,
        views: ViewCacheState,
        state: Arc<NavigationState>,
    ) -> Self {
        Self {
            matcher: RouteMatcher::new(routes),
            allow_list,
            session,
            views,
            state,
        }
    }

    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Resolves `raw`, following route-level redirects (`/` → `/dashboard`).
    pub fn resolve(&self, raw: &str) -> Result<ResolvedRoute, ConsoleError> {
        let mut route = self.matcher.resolve(raw);
        for _ in 0..MAX_REDIRECTS {
            let Some(next) = route.redirect.clone() else {
                return Ok(route);
            };
            tracing::debug!(from = %route.full_path, to = %next, "route redirect");
            route = self.matcher.resolve(&next);
        }
        Err(ConsoleError::TooManyRedirects(raw.to_string()))
    }

    /// Before-phase: starts progress, decides, and re-affirms the session
    /// when an authenticated navigation is allowed.
    pub fn begin(&self, raw: &str) -> Result<NavigationTicket, ConsoleError> {
        let to = self.resolve(raw)?;
        let seq = self.state.start();
        let is_authenticated = self.session.is_authenticated();
        let decision = decide(is_authenticated, &to, &self.allow_list);
        if is_authenticated && decision.is_allowed() {
            self.session.login();
        }
        tracing::debug!(seq, to = %to.full_path, ?decision, "navigation decided");
        Ok(NavigationTicket { seq, to, decision })
    }

    /// After-phase. Applies the ticket's effects if it is still the newest
    /// navigation; otherwise returns `NavigationAborted` and changes nothing.
    pub fn commit(&self, ticket: &NavigationTicket) -> Result<(), ConsoleError> {
        if !ticket.decision.is_allowed() {
            return Err(ConsoleError::aborted(format!(
                "navigation {} to '{}' was redirected",
                ticket.seq, ticket.to.full_path
            )));
        }

        let mut committed = self.state.lock();
        let latest = self.state.latest_issued();
        if ticket.seq != latest || ticket.seq <= committed.seq {
            tracing::debug!(
                seq = ticket.seq,
                latest,
                to = %ticket.to.full_path,
                "discarding superseded navigation"
            );
            return Err(ConsoleError::aborted(format!(
                "navigation {} superseded by {}",
                ticket.seq, latest
            )));
        }

        committed.seq = ticket.seq;
        committed.route = Some(ticket.to.clone());
        committed.page_title = ticket.to.meta.title.clone();
        committed.loading = false;
        // Published under the lock so a concurrent router reset cannot be
        // overwritten by a route it already invalidated.
        self.state.route_tx.send_replace(Some(ticket.to.clone()));
        drop(committed);

        // Tag views may persist to disk; never under the state lock.
        self.views.record_navigation(&ticket.to);
        tracing::debug!(seq = ticket.seq, to = %ticket.to.full_path, "navigation committed");
        Ok(())
    }

    /// Drives a navigation the way the host router would: guard redirects
    /// are followed until a destination is allowed, which is then committed.
    pub fn navigate(&self, raw: &str) -> Result<NavigationReport, ConsoleError> {
        let mut target = raw.to_string();
        let mut redirects = Vec::new();
        for _ in 0..=MAX_REDIRECTS {
            let ticket = self.begin(&target)?;
            if let Some(next) = ticket.decision.redirect_target() {
                target = next.to_string();
                redirects.push(ticket.decision);
                continue;
            }
            self.commit(&ticket)?;
            return Ok(NavigationReport {
                requested: raw.to_string(),
                redirects,
                route: ticket.to,
                document_title: self.state.document_title(),
            });
        }
        Err(ConsoleError::TooManyRedirects(raw.to_string()))
    }

    /// Loads the view of the committed route through `factory`.
    pub fn current_view<F: ViewFactory>(&self, factory: &F) -> Option<F::View> {
        let route = self.state.current_route()?;
        factory.load(route.view.as_deref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use crate::tags_view::ViewCacheStore;
    use std::collections::HashMap;

    fn controller() -> (NavigationController, SessionState) {
        let storage = Arc::new(MemoryStorage::new());
        let views = Arc::new(ViewCacheStore::new());
        let state = Arc::new(NavigationState::new("Console"));
        let session = Arc::new(SessionStore::new(storage, views.clone(), state.clone(), false));
        let controller = NavigationController::new(
            &crate::navigation::table::constant_routes(),
            AllowList::default(),
            session.clone(),
            views,
            state,
        );
        (controller, session)
    }

    #[test]
    fn redirected_ticket_cannot_commit() {
        let (nav, _) = controller();
        let ticket = nav.begin("/dashboard").unwrap();
        assert!(!ticket.decision.is_allowed());
        assert!(matches!(
            nav.commit(&ticket),
            Err(ConsoleError::NavigationAborted(_))
        ));
        assert!(nav.state().is_loading());
    }

    #[test]
    fn commit_fires_once_per_ticket() {
        let (nav, session) = controller();
        session.set_token("t").unwrap();
        let ticket = nav.begin("/listener/https").unwrap();
        nav.commit(&ticket).unwrap();
        assert!(nav.commit(&ticket).is_err());
        assert!(!nav.state().is_loading());
    }

    #[test]
    fn root_follows_route_redirect_before_the_guard() {
        let (nav, session) = controller();
        let ticket = nav.begin("/").unwrap();
        assert_eq!(ticket.to.path, "/dashboard");
        assert_eq!(ticket.decision.redirect_target(), Some("/login?redirect=%2Fdashboard"));

        session.set_token("t").unwrap();
        let report = nav.navigate("/").unwrap();
        assert_eq!(report.route.name.as_deref(), Some("Dashboard"));
        assert_eq!(report.document_title, "Console | 首页");
    }

    #[test]
    fn navigate_follows_guard_redirects() {
        let (nav, _) = controller();
        let report = nav.navigate("/listener/https").unwrap();
        assert_eq!(report.route.path, "/login");
        assert_eq!(
            report.redirects,
            vec![Decision::RedirectLogin {
                target: "/login?redirect=%2Flistener%2Fhttps".into()
            }]
        );
        assert_eq!(report.document_title, "Console");
    }

    #[test]
    fn redirect_cycle_is_reported() {
        let routes = vec![
            RouteNode::new("/a").redirect("/b"),
            RouteNode::new("/b").redirect("/a"),
        ];
        let storage = Arc::new(MemoryStorage::new());
        let views = Arc::new(ViewCacheStore::new());
        let state = Arc::new(NavigationState::new("Console"));
        let session = Arc::new(SessionStore::new(storage, views.clone(), state.clone(), false));
        let nav = NavigationController::new(&routes, AllowList::default(), session, views, state);
        assert!(matches!(nav.begin("/a"), Err(ConsoleError::TooManyRedirects(_))));
    }

    #[test]
    fn reset_invalidates_in_flight_tickets() {
        let (nav, session) = controller();
        session.set_token("t").unwrap();
        nav.navigate("/dashboard").unwrap();
        let pending = nav.begin("/listener/https").unwrap();

        session.logout();
        assert!(nav.commit(&pending).is_err());
        assert_eq!(nav.state().current_route(), None);
        assert_eq!(nav.state().document_title(), "Console");
        assert_eq!(nav.state().reload_generation(), 1);
    }

    #[test]
    fn current_view_goes_through_the_factory() {
        let (nav, session) = controller();
        session.set_token("t").unwrap();
        nav.navigate("/demo/element-plus").unwrap();
        let factory: HashMap<String, &str> =
            HashMap::from([("pages/demo/element-plus/index".to_string(), "ElementPlusView")]);
        assert_eq!(nav.current_view(&factory), Some("ElementPlusView"));
    }

    /// Records, for every tag-view write, whether the navigation state was unlocked.
    struct LockWatchingStorage {
        inner: MemoryStorage,
        state: std::sync::OnceLock<Arc<NavigationState>>,
        writes: Mutex<Vec<bool>>,
    }

    impl KeyValueStorage for LockWatchingStorage {
        fn get(&self, key: &str) -> Result<Option<String>, ConsoleError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), ConsoleError> {
            if let Some(state) = self.state.get() {
                let unlocked = state.committed.try_lock().is_ok();
                self.writes.lock().unwrap().push(unlocked);
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), ConsoleError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn tag_views_persist_outside_the_state_lock() {
        let storage = Arc::new(LockWatchingStorage {
            inner: MemoryStorage::new(),
            state: std::sync::OnceLock::new(),
            writes: Mutex::new(Vec::new()),
        });
        let views = Arc::new(ViewCacheStore::persistent(storage.clone()));
        let state = Arc::new(NavigationState::new("Console"));
        let _ = storage.state.set(state.clone());
        let session = Arc::new(SessionStore::new(
            storage.clone(),
            views.clone(),
            state.clone(),
            true,
        ));
        let nav = NavigationController::new(
            &crate::navigation::table::constant_routes(),
            AllowList::default(),
            session.clone(),
            views,
            state,
        );

        session.set_token("t").unwrap();
        storage.writes.lock().unwrap().clear();
        nav.navigate("/listener/https").unwrap();

        let writes = storage.writes.lock().unwrap().clone();
        assert!(!writes.is_empty());
        assert!(writes.iter().all(|unlocked| *unlocked));
    }
}
