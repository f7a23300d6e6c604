use std::env;

/// AppConfig
///
/// The console's configuration, loaded once at startup and immutable afterwards.
/// It is pulled into handlers via `FromRef`, like the other shared state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format and which variables are mandatory.
    pub env: Env,
    // Application title; the document title is "<app_title> | <page title>".
    pub app_title: String,
    // Base URL of the listener backend (CRUD calls).
    pub api_base_url: String,
    // Login endpoint; defaults to `<api_base_url>/login`.
    pub login_url: String,
    // Directory holding the persisted token and tag views.
    pub storage_dir: String,
    // Address the console shell binds to.
    pub listen_addr: String,
    // Keep visited/cached views across logout and restarts.
    pub cache_tags_view: bool,
    // Flatten third-level and deeper routes so their views can be cached.
    pub third_level_route_cache: bool,
    // Server-driven route permissions. Always false: every route is static.
    pub dynamic: bool,
}

/// Env
///
/// Local development or production deployment.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_APP_TITLE: &str = "Listener Console";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";

impl Default for AppConfig {
    /// Test-safe values; nothing is read from the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            app_title: DEFAULT_APP_TITLE.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            login_url: format!("{DEFAULT_API_BASE_URL}/login"),
            storage_dir: ".console".to_string(),
            listen_addr: "127.0.0.1:3000".to_string(),
            cache_tags_view: true,
            third_level_route_cache: false,
            dynamic: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `CONSOLE_API_BASE_URL` is missing, so the
    /// console never starts pointed at a developer backend.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => env::var("CONSOLE_API_BASE_URL")
                .expect("FATAL: CONSOLE_API_BASE_URL must be set in production."),
            Env::Local => env::var("CONSOLE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
        };
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let login_url =
            env::var("CONSOLE_LOGIN_URL").unwrap_or_else(|_| format!("{api_base_url}/login"));

        let dynamic = env_flag("CONSOLE_DYNAMIC_ROUTES", false);
        if dynamic {
            tracing::warn!("CONSOLE_DYNAMIC_ROUTES is not supported; all routes are static");
        }

        let defaults = Self::default();
        Self {
            app_title: env::var("CONSOLE_APP_TITLE").unwrap_or(defaults.app_title),
            login_url,
            storage_dir: env::var("CONSOLE_STORAGE_DIR").unwrap_or(defaults.storage_dir),
            listen_addr: env::var("CONSOLE_LISTEN_ADDR").unwrap_or_else(|_| match env {
                Env::Production => "0.0.0.0:3000".to_string(),
                Env::Local => defaults.listen_addr.clone(),
            }),
            cache_tags_view: env_flag("CONSOLE_CACHE_TAGS_VIEW", defaults.cache_tags_view),
            third_level_route_cache: env_flag(
                "CONSOLE_THIRD_LEVEL_ROUTE_CACHE",
                defaults.third_level_route_cache,
            ),
            dynamic: false,
            api_base_url,
            env,
        }
    }
}

/// `true/1/yes/on` and `false/0/no/off`, case-insensitive; anything else keeps the default.
fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            other => {
                tracing::warn!(key, value = other, "unrecognised boolean, using default");
                default
            }
        },
        Err(_) => default,
    }
}
