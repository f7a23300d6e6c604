use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::ConsoleError,
    models::{RouteNode, ViewsSnapshot, VisitedView},
    navigation::{matcher::ResolvedRoute, table::join_path},
    storage::{CACHED_VIEWS_KEY, StorageState, VISITED_VIEWS_KEY},
};

#[derive(Debug, Default)]
struct Views {
    visited: Vec<VisitedView>,
    cached: Vec<String>,
}

/// ViewCacheStore
///
/// The tags view bar (visited views, in insertion order) and the set of view
/// names kept alive. Non-closable (affix) views survive every bulk removal.
///
/// Built with [`ViewCacheStore::persistent`] it restores both lists at
/// construction and writes them back after every mutation, which is what lets
/// tags outlive a logout when `cache_tags_view` is on.
pub struct ViewCacheStore {
    views: RwLock<Views>,
    storage: Option<StorageState>,
}

impl Default for ViewCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewCacheStore {
    pub fn new() -> Self {
        Self {
            views: RwLock::new(Views::default()),
            storage: None,
        }
    }

    pub fn persistent(storage: StorageState) -> Self {
        let visited = restore::<Vec<VisitedView>>(&storage, VISITED_VIEWS_KEY).unwrap_or_default();
        let cached = restore::<Vec<String>>(&storage, CACHED_VIEWS_KEY).unwrap_or_default();
        tracing::debug!(
            visited = visited.len(),
            cached = cached.len(),
            "restored persisted tag views"
        );
        Self {
            views: RwLock::new(Views { visited, cached }),
            storage: Some(storage),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Views> {
        self.views.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Views> {
        self.views.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, views: &Views) {
        let Some(storage) = &self.storage else {
            return;
        };
        save(storage, VISITED_VIEWS_KEY, &views.visited);
        save(storage, CACHED_VIEWS_KEY, &views.cached);
    }

    /// Appends `view`, or refreshes title and full path of the entry already at its path.
    pub fn add_visited(&self, view: VisitedView) {
        let mut views = self.write();
        match views.visited.iter_mut().find(|v| v.path == view.path) {
            Some(existing) => {
                existing.title = view.title;
                existing.full_path = view.full_path;
                existing.closable = existing.closable && view.closable;
            }
            None => views.visited.push(view),
        }
        self.persist(&views);
    }

    pub fn add_cached(&self, name: &str) {
        let mut views = self.write();
        if views.cached.iter().any(|n| n == name) {
            return;
        }
        views.cached.push(name.to_string());
        self.persist(&views);
    }

    /// Closes the view at `path`. Affix views are not closable; returns whether
    /// something was removed.
    pub fn del_visited(&self, path: &str) -> bool {
        let mut views = self.write();
        let before = views.visited.len();
        views.visited.retain(|v| v.path != path || !v.closable);
        let removed = views.visited.len() != before;
        if removed {
            self.persist(&views);
        }
        removed
    }

    /// Closes the tag at `path` and stops keeping its view alive. Affix tags
    /// stay, and so does their cache entry.
    pub fn close_view(&self, path: &str) -> bool {
        let mut views = self.write();
        let Some(idx) = views
            .visited
            .iter()
            .position(|v| v.path == path && v.closable)
        else {
            return false;
        };
        let closed = views.visited.remove(idx);
        if let Some(name) = &closed.name {
            views.cached.retain(|n| n != name);
        }
        self.persist(&views);
        true
    }

    pub fn del_cached(&self, name: &str) -> bool {
        let mut views = self.write();
        let before = views.cached.len();
        views.cached.retain(|n| n != name);
        let removed = views.cached.len() != before;
        if removed {
            self.persist(&views);
        }
        removed
    }

    /// Keeps the view at `path` and the affix views; returns whether anything
    /// was removed.
    pub fn del_others_visited(&self, path: &str) -> bool {
        let mut views = self.write();
        let before = views.visited.len();
        views.visited.retain(|v| v.path == path || !v.closable);
        let removed = views.visited.len() != before;
        if removed {
            self.persist(&views);
        }
        removed
    }

    pub fn del_others_cached(&self, name: &str) -> bool {
        let mut views = self.write();
        let before = views.cached.len();
        views.cached.retain(|n| n == name);
        let removed = views.cached.len() != before;
        if removed {
            self.persist(&views);
        }
        removed
    }

    pub fn del_all_visited(&self) {
        let mut views = self.write();
        views.visited.retain(|v| !v.closable);
        self.persist(&views);
    }

    pub fn del_all_cached(&self) {
        let mut views = self.write();
        views.cached.clear();
        self.persist(&views);
    }

    /// Pins every named affix route of the tree as a non-closable view.
    pub fn seed_affix(&self, routes: &[RouteNode]) {
        let mut affix = Vec::new();
        collect_affix(routes, "/", &mut affix);
        for view in affix {
            self.add_visited(view);
        }
    }

    /// Records a committed navigation: titled, visible routes become visited
    /// views and named keep-alive routes join the cached set.
    pub fn record_navigation(&self, route: &ResolvedRoute) {
        if let (Some(title), false) = (route.title(), route.meta.hidden) {
            self.add_visited(VisitedView {
                path: route.path.clone(),
                full_path: route.full_path.clone(),
                name: route.name.clone(),
                title: title.to_string(),
                closable: !route.meta.affix,
            });
        }
        if let (Some(name), true) = (&route.name, route.meta.keep_alive) {
            self.add_cached(name);
        }
    }

    pub fn visited(&self) -> Vec<VisitedView> {
        self.read().visited.clone()
    }

    pub fn cached(&self) -> Vec<String> {
        self.read().cached.clone()
    }

    pub fn snapshot(&self) -> ViewsSnapshot {
        let views = self.read();
        ViewsSnapshot {
            visited: views.visited.clone(),
            cached: views.cached.clone(),
        }
    }
}

fn collect_affix(routes: &[RouteNode], parent: &str, out: &mut Vec<VisitedView>) {
    for node in routes {
        if node.is_external() {
            continue;
        }
        let path = join_path(parent, &node.path);
        if node.meta.affix {
            if let Some(name) = &node.name {
                out.push(VisitedView {
                    path: path.clone(),
                    full_path: path.clone(),
                    name: Some(name.clone()),
                    title: node.meta.title.clone().unwrap_or_else(|| name.clone()),
                    closable: false,
                });
            }
        }
        collect_affix(&node.children, &path, out);
    }
}

fn restore<T: DeserializeOwned>(storage: &StorageState, key: &str) -> Option<T> {
    match storage.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable persisted tag views");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "tag view storage unavailable, starting empty");
            None
        }
    }
}

fn save<T: Serialize>(storage: &StorageState, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(ConsoleError::from)
        .and_then(|raw| storage.set(key, &raw));
    if let Err(e) = result {
        tracing::warn!(key, error = %e, "failed to persist tag views");
    }
}

/// Shared handle to the view cache.
pub type ViewCacheState = Arc<ViewCacheStore>;
