#![forbid(unsafe_code)]

//! Key tape replay harness for keynav-core.
//!
//! Replays a scripted sequence of key events against a simulated document
//! on a virtual clock and prints every key outcome, page callback and frame
//! as one JSON object per line.
//!
//! # Running
//!
//! ```sh
//! cargo run -p keynav-harness -- [--config nav.json] [script.keys]
//! ```
//!
//! The script is read from stdin when no path is given; see [`script`] for
//! the format. Logs go to stderr and honor `RUST_LOG` (default `warn`).
//!
//! # Environment
//!
//! - `KEYNAV_HARNESS_FRAME_MS`: frame interval in milliseconds (16)
//! - `KEYNAV_HARNESS_VIEWPORT`: viewport height (800)
//! - `KEYNAV_HARNESS_DOCUMENT`: document height (4000)
//! - `KEYNAV_HARNESS_SCROLL_WIDTH`: horizontal scroll range (1000)

mod replay;
mod script;
mod sim;

use std::error::Error;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use keynav_core::config::NavConfig;
use tracing_subscriber::EnvFilter;

use crate::replay::{Replay, ReplayOptions};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                return Err("usage: keynav-harness [--config <file.json>] [script]".into());
            }
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(format!("unknown flag {flag}"));
            }
            path => {
                if parsed.script.is_some() {
                    return Err(format!("unexpected argument {path}"));
                }
                if path != "-" {
                    parsed.script = Some(PathBuf::from(path));
                }
            }
        }
    }
    Ok(parsed)
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn replay_options() -> ReplayOptions {
    let defaults = ReplayOptions::default();
    ReplayOptions {
        frame_ms: env_or("KEYNAV_HARNESS_FRAME_MS", defaults.frame_ms),
        viewport: env_or("KEYNAV_HARNESS_VIEWPORT", defaults.viewport),
        document: env_or("KEYNAV_HARNESS_DOCUMENT", defaults.document),
        scroll_width: env_or("KEYNAV_HARNESS_SCROLL_WIDTH", defaults.scroll_width),
    }
}

fn load_config(args: &Args) -> Result<NavConfig, Box<dyn Error>> {
    let Some(path) = &args.config else {
        return Ok(NavConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|err| format!("reading config {}: {err}", path.display()))?;
    let config: NavConfig = serde_json::from_str(&text)
        .map_err(|err| format!("parsing config {}: {err}", path.display()))?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn read_script(args: &Args) -> io::Result<String> {
    match &args.script {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = load_config(&args)?;
    let steps = script::parse(&read_script(&args)?)?;
    tracing::debug!(steps = steps.len(), "replaying script");

    let stdout = io::stdout();
    let mut replay = Replay::new(config, replay_options(), BufWriter::new(stdout.lock()))?;
    replay.run(&steps)?;
    replay.into_inner().flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn config_and_script() {
        let parsed = args(&["--config", "nav.json", "tape.keys"]).expect("valid args");
        assert_eq!(parsed.config, Some(PathBuf::from("nav.json")));
        assert_eq!(parsed.script, Some(PathBuf::from("tape.keys")));
    }

    #[test]
    fn dash_means_stdin() {
        let parsed = args(&["-"]).expect("valid args");
        assert!(parsed.script.is_none());
    }

    #[test]
    fn bad_arguments() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["a.keys", "b.keys"]).is_err());
    }

    #[test]
    fn missing_config_file_names_path() {
        let parsed = Args {
            config: Some(PathBuf::from("/nonexistent/keynav.json")),
            script: None,
        };
        let err = load_config(&parsed).expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/keynav.json"));
    }
}
