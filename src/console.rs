use std::sync::Arc;

use crate::{
    config::AppConfig,
    models::{RouteNode, SessionInfo},
    navigation::{
        AllowList, NavigationController, NavigationState, constant_routes, flatten_routes,
    },
    session::{SessionState, SessionStore},
    storage::StorageState,
    tags_view::{ViewCacheState, ViewCacheStore},
};

/// Console
///
/// The application instance. Builds the route table, both stores and the
/// navigation controller once, wires them together, and hydrates the session.
/// Tests build isolated instances over their own storage.
pub struct Console {
    routes: Vec<RouteNode>,
    pub session: SessionState,
    pub views: ViewCacheState,
    pub navigation: NavigationController,
}

impl Console {
    pub fn new(config: &AppConfig, storage: StorageState) -> Self {
        let routes = flatten_routes(&constant_routes(), config.third_level_route_cache);

        let views = Arc::new(if config.cache_tags_view {
            ViewCacheStore::persistent(storage.clone())
        } else {
            ViewCacheStore::new()
        });
        views.seed_affix(&routes);

        let state = Arc::new(NavigationState::new(config.app_title.clone()));
        let session = Arc::new(SessionStore::new(
            storage,
            views.clone(),
            state.clone(),
            config.cache_tags_view,
        ));
        session.hydrate();

        let navigation = NavigationController::new(
            &routes,
            AllowList::default(),
            session.clone(),
            views.clone(),
            state,
        );

        tracing::info!(
            third_level_route_cache = config.third_level_route_cache,
            cache_tags_view = config.cache_tags_view,
            records = navigation.matcher().records().len(),
            "console initialised"
        );

        Self {
            routes,
            session,
            views,
            navigation,
        }
    }

    /// The route tree in effect (flattened when third-level caching is on).
    pub fn routes(&self) -> &[RouteNode] {
        &self.routes
    }

    pub fn session_info(&self) -> SessionInfo {
        let session = self.session.snapshot();
        SessionInfo {
            is_authenticated: session.is_authenticated,
            has_token: !session.token.is_empty(),
            reload_generation: self.navigation.state().reload_generation(),
        }
    }
}

/// Shared handle to the console.
pub type ConsoleState = Arc<Console>;
