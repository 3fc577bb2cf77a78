#![forbid(unsafe_code)]

//! Built-in commands and their default bindings.
//!
//! [`COMMAND_DEFINITIONS`] is the listing a help overlay renders, grouped by
//! [`Category`]. The dispatcher installs [`default_sequences`] and
//! [`default_keys`] at construction; hosts can rebind through
//! [`Dispatcher::register_sequence`](crate::dispatcher::Dispatcher::register_sequence)
//! and [`Dispatcher::register_key`](crate::dispatcher::Dispatcher::register_key).

use std::fmt;

use crate::event::KeyCode;
use crate::key_sequence::KeySequence;

/// Something a key binding can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavCommand {
    /// Jump to the top of the document.
    ScrollToTop,
    /// Jump to the bottom of the document.
    ScrollToBottom,
    /// Move down by half a viewport.
    HalfPageDown,
    /// Move up by half a viewport.
    HalfPageUp,
    /// Open a hint session that activates targets in place.
    ShowHints,
    /// Open a hint session that opens links in a new context.
    ShowHintsNewTab,
    /// Show or hide the help overlay.
    ToggleHelp,
}

/// Help overlay grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Scrolling and jumps.
    Navigation,
    /// Hint activation.
    Links,
    /// The help overlay itself.
    Help,
}

impl Category {
    /// Heading shown in the help overlay.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Links => "Links",
            Self::Help => "Help",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One row of the help listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDefinition {
    /// Keys as typed.
    pub key: &'static str,
    /// What the keys do.
    pub description: &'static str,
    /// Grouping.
    pub category: Category,
}

/// Every default binding, in help order.
pub const COMMAND_DEFINITIONS: &[CommandDefinition] = &[
    CommandDefinition {
        key: "j",
        description: "Scroll down",
        category: Category::Navigation,
    },
    CommandDefinition {
        key: "k",
        description: "Scroll up",
        category: Category::Navigation,
    },
    CommandDefinition {
        key: "h",
        description: "Scroll left",
        category: Category::Navigation,
    },
    CommandDefinition {
        key: "l",
        description: "Scroll right",
        category: Category::Navigation,
    },
    CommandDefinition {
        key: "d",
        description: "Half page down",
        category: Category::Navigation,
    },
    CommandDefinition {
        key: "u",
        description: "Half page up",
        category: Category::Navigation,
    },
    CommandDefinition {
        key: "gg",
        description: "Go to top",
        category: Category::Navigation,
    },
    CommandDefinition {
        key: "G",
        description: "Go to bottom",
        category: Category::Navigation,
    },
    CommandDefinition {
        key: "f",
        description: "Show link hints",
        category: Category::Links,
    },
    CommandDefinition {
        key: "F",
        description: "Show link hints (new tab)",
        category: Category::Links,
    },
    CommandDefinition {
        key: "?",
        description: "Show/hide help",
        category: Category::Help,
    },
];

/// Definitions grouped by category, categories in first-seen order.
#[must_use]
pub fn grouped(definitions: &[CommandDefinition]) -> Vec<(Category, Vec<CommandDefinition>)> {
    let mut groups: Vec<(Category, Vec<CommandDefinition>)> = Vec::new();
    for def in definitions {
        match groups.iter_mut().find(|(cat, _)| *cat == def.category) {
            Some((_, rows)) => rows.push(*def),
            None => groups.push((def.category, vec![*def])),
        }
    }
    groups
}

/// Default multi-key sequences.
#[must_use]
pub fn default_sequences() -> Vec<(KeySequence, NavCommand)> {
    vec![(KeySequence::parse("gg"), NavCommand::ScrollToTop)]
}

/// Default single-key commands.
///
/// The hold keys (`j`/`k`/`h`/`l`) are not commands; the dispatcher treats
/// them separately because they also need the key-up.
#[must_use]
pub fn default_keys() -> Vec<(KeyCode, NavCommand)> {
    vec![
        (KeyCode::Char('G'), NavCommand::ScrollToBottom),
        (KeyCode::Char('d'), NavCommand::HalfPageDown),
        (KeyCode::Char('u'), NavCommand::HalfPageUp),
    ]
}

/// Key that opens a plain hint session.
pub const HINT_KEY: KeyCode = KeyCode::Char('f');

/// Key that opens a new-tab hint session.
pub const HINT_NEW_TAB_KEY: KeyCode = KeyCode::Char('F');

/// Key that toggles the help overlay.
pub const HELP_KEY: KeyCode = KeyCode::Char('?');

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_covers_default_bindings() {
        let keys: Vec<&str> = COMMAND_DEFINITIONS.iter().map(|d| d.key).collect();
        for (seq, _) in default_sequences() {
            assert!(keys.contains(&seq.to_string().as_str()));
        }
        for (key, _) in default_keys() {
            assert!(keys.contains(&key.to_string().as_str()));
        }
        for key in ["j", "k", "h", "l", "f", "F", "?"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }

    #[test]
    fn grouping_keeps_order() {
        let groups = grouped(COMMAND_DEFINITIONS);
        let cats: Vec<Category> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            cats,
            vec![Category::Navigation, Category::Links, Category::Help]
        );
        assert_eq!(groups[0].1.len(), 8);
        assert_eq!(groups[1].1[0].key, "f");
    }

    #[test]
    fn category_titles() {
        assert_eq!(Category::Links.to_string(), "Links");
    }
}
