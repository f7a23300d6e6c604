use listener_console::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic};

const CONFIG_VARS: [&str; 10] = [
    "APP_ENV",
    "CONSOLE_API_BASE_URL",
    "CONSOLE_LOGIN_URL",
    "CONSOLE_APP_TITLE",
    "CONSOLE_STORAGE_DIR",
    "CONSOLE_LISTEN_ADDR",
    "CONSOLE_CACHE_TAGS_VIEW",
    "CONSOLE_THIRD_LEVEL_ROUTE_CACHE",
    "CONSOLE_DYNAMIC_ROUTES",
    "RUST_LOG",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with every console variable cleared, restoring them afterwards.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_production_requires_api_base_url() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without CONSOLE_API_BASE_URL"
    );
}

#[test]
#[serial]
fn test_local_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://127.0.0.1:8080");
    assert_eq!(config.login_url, "http://127.0.0.1:8080/login");
    assert_eq!(config.listen_addr, "127.0.0.1:3000");
    assert!(config.cache_tags_view);
    assert!(!config.third_level_route_cache);
    assert!(!config.dynamic);
}

#[test]
#[serial]
fn test_production_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("CONSOLE_API_BASE_URL", "https://listeners.internal/");
            env::set_var("CONSOLE_APP_TITLE", "Edge Console");
            env::set_var("CONSOLE_CACHE_TAGS_VIEW", "off");
            env::set_var("CONSOLE_THIRD_LEVEL_ROUTE_CACHE", "TRUE");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    // Trailing slash is trimmed before the login URL is derived.
    assert_eq!(config.api_base_url, "https://listeners.internal");
    assert_eq!(config.login_url, "https://listeners.internal/login");
    assert_eq!(config.app_title, "Edge Console");
    assert_eq!(config.listen_addr, "0.0.0.0:3000");
    assert!(!config.cache_tags_view);
    assert!(config.third_level_route_cache);
}

#[test]
#[serial]
fn test_dynamic_routes_cannot_be_enabled() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("CONSOLE_DYNAMIC_ROUTES", "true");
        }
        AppConfig::load()
    });

    assert!(!config.dynamic);
}

#[test]
#[serial]
fn test_unrecognised_flag_keeps_default() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("CONSOLE_CACHE_TAGS_VIEW", "sometimes");
        }
        AppConfig::load()
    });

    assert!(config.cache_tags_view);
}
