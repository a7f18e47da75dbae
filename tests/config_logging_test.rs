//! Startup ordering: config fallback warnings land in the log file.
//!
//! Lives in its own test binary because it installs the global logger.

use std::fs;
use std::process;

use rotary_dial::config::{init_logging_from, RunConfig};
use rotary_dial::engine::DemoKind;

#[test]
fn config_warnings_reach_the_log_file() {
    let path = std::env::temp_dir().join(format!("dial-config-{}.log", process::id()));
    let _ = fs::remove_file(&path);
    let path_str = path.display().to_string();

    init_logging_from(|key| match key {
        "DIAL_LOG_PATH" => Some(path_str.clone()),
        _ => None,
    })
    .expect("logger installs once");

    let config = RunConfig::from_lookup(|key| match key {
        "DIAL_DEMO" => Some("pinball".to_string()),
        "DIAL_SEED" => Some("not-a-seed".to_string()),
        "DIAL_LOG_PATH" => Some(path_str.clone()),
        _ => None,
    });
    assert_eq!(config.demo, DemoKind::Tetris);
    log::logger().flush();

    let logged = fs::read_to_string(&path).expect("log file written");
    let _ = fs::remove_file(&path);
    assert!(logged.contains("DIAL_DEMO"), "missing demo warning: {logged}");
    assert!(logged.contains("DIAL_SEED"), "missing seed warning: {logged}");
}
