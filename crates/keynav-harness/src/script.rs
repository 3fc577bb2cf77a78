//! Key tape parsing.
//!
//! One step per line; `#` starts a comment. Keys use DOM `KeyboardEvent.key`
//! names (`j`, `G`, `Escape`, `Backspace`, ...).
//!
//! ```text
//! viewport 800          # viewport height
//! document 4000         # document height
//! target link https://example.com
//! target text
//! target button
//! down j                # key down, no release
//! wait 250              # advance the virtual clock, running frames
//! up j
//! type gg               # press and release each character
//! press Escape
//! edit Escape           # key down with an editable element focused
//! settle                # run frames until the scroll animation stops
//! ```

use std::fmt;

use keynav_core::event::KeyCode;
use keynav_core::hint_session::TargetKind;

/// Longest accepted `wait`, one hour of virtual time.
pub const MAX_WAIT_MS: u64 = 3_600_000;

/// One scripted action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Viewport(f64),
    Document(f64),
    Target(TargetKind),
    Down(KeyCode),
    Up(KeyCode),
    Press(KeyCode),
    Type(Vec<KeyCode>),
    Edit(KeyCode),
    Wait(u64),
    Settle,
}

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ScriptError {}

pub fn parse(source: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let err = |message: String| ScriptError {
            line: index + 1,
            message,
        };
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let step = match verb {
            "viewport" => Step::Viewport(parse_extent(rest).map_err(err)?),
            "document" => Step::Document(parse_extent(rest).map_err(err)?),
            "target" => Step::Target(parse_target(rest).map_err(err)?),
            "down" => Step::Down(parse_key(rest).map_err(err)?),
            "up" => Step::Up(parse_key(rest).map_err(err)?),
            "press" => Step::Press(parse_key(rest).map_err(err)?),
            "edit" => Step::Edit(parse_key(rest).map_err(err)?),
            "type" if !rest.is_empty() => Step::Type(rest.chars().map(KeyCode::Char).collect()),
            "wait" => Step::Wait(parse_wait(rest).map_err(err)?),
            "settle" => Step::Settle,
            other => return Err(err(format!("unknown step {other:?}"))),
        };
        steps.push(step);
    }
    Ok(steps)
}

fn parse_key(name: &str) -> Result<KeyCode, String> {
    KeyCode::from_key_name(name).ok_or_else(|| format!("unknown key {name:?}"))
}

fn parse_wait(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(ms) if ms <= MAX_WAIT_MS => Ok(ms),
        Ok(ms) => Err(format!("wait of {ms} ms exceeds {MAX_WAIT_MS} ms")),
        Err(_) => Err(format!("expected milliseconds, got {value:?}")),
    }
}

fn parse_extent(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!("expected a non-negative extent, got {value:?}")),
    }
}

fn parse_target(desc: &str) -> Result<TargetKind, String> {
    let (kind, arg) = match desc.split_once(char::is_whitespace) {
        Some((kind, arg)) => (kind, arg.trim()),
        None => (desc, ""),
    };
    match kind {
        "link" if !arg.is_empty() => Ok(TargetKind::Link {
            destination: arg.to_string(),
        }),
        "link" => Err("link target needs a destination".to_string()),
        "text" => Ok(TargetKind::TextEntry),
        "button" | "generic" => Ok(TargetKind::Generic),
        other => Err(format!("unknown target kind {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps_and_comments() {
        let steps = parse(
            "# header\n\
             viewport 600\n\
             down j   # hold\n\
             wait 120\n\
             up j\n\
             type gg\n\
             press Escape\n\
             \n\
             settle\n",
        )
        .expect("valid script");
        assert_eq!(
            steps,
            vec![
                Step::Viewport(600.0),
                Step::Down(KeyCode::Char('j')),
                Step::Wait(120),
                Step::Up(KeyCode::Char('j')),
                Step::Type(vec![KeyCode::Char('g'), KeyCode::Char('g')]),
                Step::Press(KeyCode::Escape),
                Step::Settle,
            ]
        );
    }

    #[test]
    fn parses_targets() {
        let steps = parse("target link https://example.com/a\ntarget text\ntarget button")
            .expect("valid script");
        assert_eq!(
            steps,
            vec![
                Step::Target(TargetKind::Link {
                    destination: "https://example.com/a".into()
                }),
                Step::Target(TargetKind::TextEntry),
                Step::Target(TargetKind::Generic),
            ]
        );
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse("down j\nwait soon").expect_err("bad wait");
        assert_eq!(err.line, 2);
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[test]
    fn rejects_unknown_keys_and_steps() {
        assert!(parse("down Hyper").is_err());
        assert!(parse("jump 3").is_err());
        assert!(parse("target link").is_err());
        assert!(parse("type").is_err());
        assert!(parse("document -5").is_err());
    }

    #[test]
    fn rejects_waits_past_an_hour() {
        assert_eq!(parse("wait 3600000"), Ok(vec![Step::Wait(MAX_WAIT_MS)]));
        let err = parse("wait 10\nwait 18446744073709551615").expect_err("too long");
        assert_eq!(err.line, 2);
        assert!(parse("wait 99999999999999999999").is_err());
    }
}
