//! Scripted input for headless runs.
//!
//! A script file is read line by line; blank lines and lines starting with `#`
//! are skipped and every other character is one action, consumed one per tick:
//!
//! | Char        | Action                         |
//! |-------------|--------------------------------|
//! | ` ` or `_`  | Space                          |
//! | `e`         | Enter                          |
//! | `q`         | Escape                         |
//! | `r`         | Restart level                  |
//! | `p`         | Debug personalization          |
//! | `f`         | Toggle fullscreen              |
//! | `N` `S` `E` `W` | Walk into that door        |
//! | `.`         | Wait one tick                  |

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::gameflow::InputKey;
use crate::generation::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction {
    Key(InputKey),
    Door(Direction),
    Wait,
}

impl ScriptAction {
    pub fn from_char(c: char) -> Option<Self> {
        let action = match c {
            ' ' | '_' => ScriptAction::Key(InputKey::Space),
            'e' => ScriptAction::Key(InputKey::Enter),
            'q' => ScriptAction::Key(InputKey::Escape),
            'r' => ScriptAction::Key(InputKey::Restart),
            'p' => ScriptAction::Key(InputKey::DebugPersonalize),
            'f' => ScriptAction::Key(InputKey::ToggleFullscreen),
            '.' => ScriptAction::Wait,
            c => ScriptAction::Door(Direction::from_char(c)?),
        };
        Some(action)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    actions: Vec<ScriptAction>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut script = String::new();
        for line in reader.lines() {
            script.push_str(&line?);
            script.push('\n');
        }
        Ok(Self::parse(&script))
    }

    pub fn parse(script: &str) -> Self {
        let mut actions = Vec::new();
        for line in script.lines() {
            let line = line.trim_end_matches('\r');
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            for c in line.chars() {
                match ScriptAction::from_char(c) {
                    Some(action) => actions.push(action),
                    None => warn!("Unknown key in script: {:?}", c),
                }
            }
        }
        Self { actions, cursor: 0 }
    }

    pub fn next_action(&mut self) -> Option<ScriptAction> {
        let action = self.actions.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(action)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.actions.len()
    }

    pub fn remaining(&self) -> usize {
        self.actions.len().saturating_sub(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_comments() {
        let mut script = ScriptedInput::parse("# skip splash\n_\n\n e.N\n");
        assert_eq!(script.remaining(), 5);
        assert_eq!(script.next_action(), Some(ScriptAction::Key(InputKey::Space)));
        assert_eq!(script.next_action(), Some(ScriptAction::Key(InputKey::Space)));
        assert_eq!(script.next_action(), Some(ScriptAction::Key(InputKey::Enter)));
        assert_eq!(script.next_action(), Some(ScriptAction::Wait));
        assert_eq!(script.next_action(), Some(ScriptAction::Door(Direction::North)));
        assert!(script.is_finished());
        assert_eq!(script.next_action(), None);
    }

    #[test]
    fn test_case_distinguishes_enter_and_east() {
        assert_eq!(ScriptAction::from_char('e'), Some(ScriptAction::Key(InputKey::Enter)));
        assert_eq!(ScriptAction::from_char('E'), Some(ScriptAction::Door(Direction::East)));
        assert_eq!(ScriptAction::from_char('x'), None);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "_e").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "SWq").unwrap();
        let mut script = ScriptedInput::from_file(file.path()).unwrap();
        assert_eq!(script.remaining(), 5);
        script.next_action();
        script.next_action();
        assert_eq!(script.next_action(), Some(ScriptAction::Door(Direction::South)));
    }
}
