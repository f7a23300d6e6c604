use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Route Table Schemas ---

/// RouteMeta
///
/// Display and caching metadata attached to a route node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct RouteMeta {
    /// Menu, tag and document title.
    pub title: Option<String>,
    /// Hidden routes never show up in the menu or the tags view.
    pub hidden: bool,
    /// The rendered view is kept alive across navigations away from it.
    pub keep_alive: bool,
    /// Pinned tag: seeded at startup and never closable.
    pub affix: bool,
    /// Show the group in the menu even when it has a single child.
    pub always_show: bool,
    pub svg_icon: Option<String>,
    pub el_icon: Option<String>,
}

impl RouteMeta {
    /// Child-over-parent merge used when a location resolves through nested records.
    /// Present child values win; absent ones inherit; flags are sticky.
    pub fn merged_over(&self, parent: &RouteMeta) -> RouteMeta {
        RouteMeta {
            title: self.title.clone().or_else(|| parent.title.clone()),
            hidden: self.hidden || parent.hidden,
            keep_alive: self.keep_alive || parent.keep_alive,
            affix: self.affix || parent.affix,
            always_show: self.always_show || parent.always_show,
            svg_icon: self.svg_icon.clone().or_else(|| parent.svg_icon.clone()),
            el_icon: self.el_icon.clone().or_else(|| parent.el_icon.clone()),
        }
    }
}

/// RouteNode
///
/// One record of the static route tree. `path` is a segment relative to the
/// parent, an absolute path (leading `/`), or an external URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct RouteNode {
    pub path: String,
    pub name: Option<String>,
    pub redirect: Option<String>,
    /// Alternative absolute pattern resolving to this record.
    pub alias: Option<String>,
    /// Opaque key handed to the `ViewFactory`; grouping nodes usually have none.
    pub view: Option<String>,
    pub meta: RouteMeta,
    #[schema(value_type = Vec<Object>)]
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = Some(title.into());
        self
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn alias(mut self, pattern: impl Into<String>) -> Self {
        self.alias = Some(pattern.into());
        self
    }

    pub fn view(mut self, key: impl Into<String>) -> Self {
        self.view = Some(key.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.meta.hidden = true;
        self
    }

    pub fn keep_alive(mut self) -> Self {
        self.meta.keep_alive = true;
        self
    }

    pub fn affix(mut self) -> Self {
        self.meta.affix = true;
        self
    }

    pub fn always_show(mut self) -> Self {
        self.meta.always_show = true;
        self
    }

    pub fn svg_icon(mut self, icon: impl Into<String>) -> Self {
        self.meta.svg_icon = Some(icon.into());
        self
    }

    pub fn el_icon(mut self, icon: impl Into<String>) -> Self {
        self.meta.el_icon = Some(icon.into());
        self
    }

    pub fn children(mut self, children: Vec<RouteNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// External links (`https://...`) are menu entries, never router locations.
    pub fn is_external(&self) -> bool {
        is_external_path(&self.path)
    }
}

pub fn is_external_path(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("mailto:")
}

// --- View Cache Schemas ---

/// VisitedView
///
/// One entry of the tags view bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VisitedView {
    pub path: String,
    pub full_path: String,
    pub name: Option<String>,
    pub title: String,
    /// Affix views are not closable.
    pub closable: bool,
}

/// ViewsSnapshot
///
/// Response body of `GET /views`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ViewsSnapshot {
    pub visited: Vec<VisitedView>,
    pub cached: Vec<String>,
}

// --- Session Schemas ---

/// SessionInfo
///
/// Response body of `GET /session`. The token itself is never echoed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionInfo {
    pub is_authenticated: bool,
    pub has_token: bool,
    /// Bumped every time logout resets the router; the frontend reloads when it changes.
    pub reload_generation: u64,
}

/// SetTokenRequest
///
/// Input payload for `POST /session/token`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetTokenRequest {
    pub token: String,
}

/// LoginRequestData
///
/// Credentials exchanged for a token by the backend login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequestData {
    pub username: String,
    pub password: String,
}

/// LoginTokenInfo
///
/// The token description returned by the backend on a successful login.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct LoginTokenInfo {
    pub token_name: String,
    pub token_value: String,
    pub is_login: bool,
    pub login_id: String,
    pub login_type: String,
    pub token_timeout: i64,
    pub session_timeout: i64,
    pub token_session_timeout: i64,
    pub token_active_timeout: i64,
    pub login_device_type: String,
    pub tag: Option<String>,
}

/// ApiEnvelope
///
/// The `{ code, msg, data }` wrapper every backend response is delivered in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default, alias = "message")]
    pub msg: String,
    pub data: Option<T>,
}

/// Backend code signalling success.
pub const API_SUCCESS_CODE: i64 = 200;

// --- Listener Schemas ---

/// ListenerData
///
/// An HTTPS listener as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ListenerData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub listen_address: String,
    pub external_address: String,
    pub heart_beat_time: i64,
    pub timeout: i64,
    pub is_enable: bool,
}

/// CreateListenerRequest
///
/// Input payload for creating an HTTPS listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateListenerRequest {
    pub name: String,
    pub description: String,
    pub listen_address: String,
    pub external_address: String,
    pub heart_beat_time: i64,
    pub timeout: i64,
    pub is_enable: bool,
}
