//! Simulator settings read from the environment at startup.
//!
//! Call [`init_logging`] before [`RunConfig::from_env`] so fallback
//! warnings reach the configured log target.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::engine::DemoKind;

/// Runtime settings for the simulator binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Demo shown first (`DIAL_DEMO`)
    pub demo: DemoKind,
    /// Piece and sparkle RNG seed (`DIAL_SEED`)
    pub seed: u32,
    /// Hold threshold override (`DIAL_LONG_PRESS_MS`)
    pub long_press_ms: Option<u32>,
    /// Log file target (`DIAL_LOG_PATH`)
    pub log_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparsable values fall back
    /// to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let demo = match lookup("DIAL_DEMO") {
            None => DemoKind::Tetris,
            Some(s) => DemoKind::from_str(&s).unwrap_or_else(|| {
                log::warn!("DIAL_DEMO={s:?} is not a demo; using tetris");
                DemoKind::Tetris
            }),
        };

        let seed = lookup("DIAL_SEED")
            .and_then(|s| match s.trim().parse::<u32>() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("DIAL_SEED={s:?} is not a u32; using a time seed");
                    None
                }
            })
            .unwrap_or_else(time_seed);

        let long_press_ms = lookup("DIAL_LONG_PRESS_MS").and_then(|s| {
            match s.trim().parse::<u32>() {
                Ok(v) if v > 0 => Some(v),
                _ => {
                    log::warn!("DIAL_LONG_PRESS_MS={s:?} is not a positive integer; ignoring");
                    None
                }
            }
        });

        let log_path = log_path_from(&lookup);

        Self {
            demo,
            seed,
            long_press_ms,
            log_path,
        }
    }

    /// Hold threshold for `demo`, honoring the override
    pub fn long_press_for(&self, demo: DemoKind) -> u32 {
        self.long_press_ms.unwrap_or_else(|| demo.long_press_ms())
    }
}

/// Install the process logger from `RUST_LOG` and `DIAL_LOG_PATH`.
pub fn init_logging() -> Result<()> {
    init_logging_from(|key| std::env::var(key).ok())
}

/// Same as [`init_logging`], reading `DIAL_LOG_PATH` from `lookup`.
pub fn init_logging_from(lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_path_from(&lookup) {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

fn log_path_from(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    lookup("DIAL_LOG_PATH")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn time_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(1);
    // Fold the high bits in so consecutive launches differ.
    ((nanos ^ (nanos >> 32)) as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults() {
        let config = RunConfig::from_lookup(|_| None);
        assert_eq!(config.demo, DemoKind::Tetris);
        assert_ne!(config.seed, 0);
        assert_eq!(config.long_press_ms, None);
        assert_eq!(config.log_path, None);
        assert_eq!(config.long_press_for(DemoKind::Tetris), 150);
        assert_eq!(config.long_press_for(DemoKind::Lights), 300);
    }

    #[test]
    fn explicit_values() {
        let config = RunConfig::from_lookup(lookup(&[
            ("DIAL_DEMO", "lights"),
            ("DIAL_SEED", "1234"),
            ("DIAL_LONG_PRESS_MS", "500"),
            ("DIAL_LOG_PATH", "/tmp/dial.log"),
        ]));
        assert_eq!(config.demo, DemoKind::Lights);
        assert_eq!(config.seed, 1234);
        assert_eq!(config.long_press_for(DemoKind::Tetris), 500);
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/dial.log")));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = RunConfig::from_lookup(lookup(&[
            ("DIAL_DEMO", "pinball"),
            ("DIAL_LONG_PRESS_MS", "0"),
            ("DIAL_LOG_PATH", "  "),
        ]));
        assert_eq!(config.demo, DemoKind::Tetris);
        assert_eq!(config.long_press_ms, None);
        assert_eq!(config.log_path, None);
    }
}
