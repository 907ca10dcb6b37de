use connector_console::config::{ConfigError, ConfigLoader};
use std::{
    env, fs,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

const KEYS: &[&str] = &[
    "POBLYSH_PROFILE",
    "POBLYSH_CONSOLE_BIND_ADDR",
    "POBLYSH_LOG_LEVEL",
    "POBLYSH_LOG_FORMAT",
    "POBLYSH_API_BASE_URL",
    "POBLYSH_API_TOKEN",
    "POBLYSH_PUBLIC_URL",
    "POBLYSH_OAUTH_REDIRECT_DELAY_MS",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

fn loader(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::with_base_dir(dir.path().to_path_buf())
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    let cfg = loader(&temp_dir).load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.console_bind_addr, "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.log_format, "json");
    assert_eq!(cfg.api_base_url, "http://localhost:8080");
    assert_eq!(cfg.public_url, "http://localhost:3000");
    assert_eq!(cfg.oauth_redirect_delay_ms, 2000);
    assert!(cfg.api_token.is_none());
    cfg.bind_addr().expect("default bind addr parses");
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "POBLYSH_CONSOLE_BIND_ADDR=127.0.0.1:3000\nPOBLYSH_API_BASE_URL=http://base:8080\n",
    );
    write_env_file(
        &temp_dir,
        ".env.local",
        "POBLYSH_PROFILE=staging\nPOBLYSH_CONSOLE_BIND_ADDR=127.0.0.1:4000\n",
    );
    write_env_file(
        &temp_dir,
        ".env.staging",
        "POBLYSH_CONSOLE_BIND_ADDR=192.168.0.10:5000\nPOBLYSH_LOG_FORMAT=pretty\n",
    );
    write_env_file(
        &temp_dir,
        ".env.staging.local",
        "POBLYSH_CONSOLE_BIND_ADDR=10.0.0.5:6000\n",
    );

    let cfg = loader(&temp_dir).load().expect("layered config loads");

    assert_eq!(cfg.profile, "staging");
    assert_eq!(cfg.console_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.api_base_url, "http://base:8080");
    assert_eq!(cfg.log_format, "pretty");
}

#[test]
fn process_env_overrides_files() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "POBLYSH_API_BASE_URL=http://from-file:8080\nPOBLYSH_API_TOKEN=file-token\n",
    );
    unsafe {
        env::set_var("POBLYSH_API_BASE_URL", "https://from-env.example.com");
        env::set_var("POBLYSH_OAUTH_REDIRECT_DELAY_MS", "500");
    }

    let cfg = loader(&temp_dir).load().expect("config loads");
    clear_env();

    assert_eq!(cfg.api_base_url, "https://from-env.example.com");
    assert_eq!(cfg.api_token.as_deref(), Some("file-token"));
    assert_eq!(cfg.oauth_redirect_delay_ms, 500);

    let redacted = cfg.redacted_json().unwrap();
    assert!(!redacted.contains("file-token"));
}

#[test]
fn invalid_values_are_rejected() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("POBLYSH_OAUTH_REDIRECT_DELAY_MS", "soon");
    }
    let err = loader(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    clear_env();

    unsafe {
        env::set_var("POBLYSH_CONSOLE_BIND_ADDR", "not-an-address");
    }
    let err = loader(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    clear_env();

    unsafe {
        env::set_var("POBLYSH_API_BASE_URL", "backend:8080");
    }
    let err = loader(&temp_dir).load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    clear_env();
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "POBLYSH_LOG_LEVEL=\nPOBLYSH_API_TOKEN=   \n");

    let cfg = loader(&temp_dir).load().expect("config loads");

    assert_eq!(cfg.log_level, "info");
    assert!(cfg.api_token.is_none());
}
