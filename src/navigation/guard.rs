use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::location::encode_component;
use super::matcher::ResolvedRoute;
use super::table::{FORBIDDEN_PATH, HOME_PATH, LOGIN_PATH, NOT_FOUND_PATH, REDIRECT_HELPER_PREFIX};

/// AllowList
///
/// Destinations reachable without a session. Entries are exact paths or
/// path prefixes; a prefix matches the prefix itself and anything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl Default for AllowList {
    /// Login page, error pages and the redirect helper.
    fn default() -> Self {
        Self::new(
            [LOGIN_PATH, FORBIDDEN_PATH, NOT_FOUND_PATH],
            [REDIRECT_HELPER_PREFIX],
        )
    }
}

impl AllowList {
    pub fn new<E, P>(exact: E, prefixes: P) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            exact: exact.into_iter().map(Into::into).collect(),
            prefixes: prefixes
                .into_iter()
                .map(|p| p.into().trim_end_matches('/').to_string())
                .collect(),
        }
    }

    pub fn allows(&self, path: &str) -> bool {
        if self.exact.iter().any(|exact| exact == path) {
            return true;
        }
        self.prefixes.iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Decision
///
/// Outcome of the before-phase for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Decision {
    Allowed,
    RedirectLogin { target: String },
    RedirectHome { target: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    /// Where the host router should go instead, for redirects.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Decision::Allowed => None,
            Decision::RedirectLogin { target } | Decision::RedirectHome { target } => Some(target),
        }
    }
}

/// Login location that resumes at `full_path` once a session exists.
pub fn login_redirect(full_path: &str) -> String {
    format!("{LOGIN_PATH}?redirect={}", encode_component(full_path))
}

/// decide
///
/// The authorization decision. Without a session only allow-listed
/// destinations pass and everything else bounces to login with the intended
/// destination preserved. With a session everything passes except the login
/// page itself, which bounces home. There are no per-route permissions.
pub fn decide(is_authenticated: bool, to: &ResolvedRoute, allow_list: &AllowList) -> Decision {
    if !is_authenticated {
        if allow_list.allows(&to.path) {
            return Decision::Allowed;
        }
        return Decision::RedirectLogin {
            target: login_redirect(&to.full_path),
        };
    }

    if to.path == LOGIN_PATH {
        return Decision::RedirectHome {
            target: HOME_PATH.to_string(),
        };
    }

    Decision::Allowed
}
