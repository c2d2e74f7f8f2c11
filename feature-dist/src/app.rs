use tracing::info;

use crate::input::{self, AppAction};
use crate::view::FeatureDistribution;

/// Application state.
pub struct App {
    /// The distribution widget.
    pub widget: FeatureDistribution,
    /// Current text in the feature input bar.
    pub input: String,
    /// Cursor position in input (byte offset).
    pub cursor: usize,
    /// Previously applied feature lists.
    pub history: Vec<String>,
    /// Current position in history (for up/down navigation).
    pub history_pos: Option<usize>,
    /// Whether we should quit.
    pub quit: bool,
}

impl App {
    pub fn new(mut widget: FeatureDistribution, features: Vec<String>) -> Self {
        let input = features.join(", ");
        widget.set_features(features);
        Self {
            cursor: input.len(),
            history: if input.is_empty() { Vec::new() } else { vec![input.clone()] },
            input,
            widget,
            history_pos: None,
            quit: false,
        }
    }

    /// Apply the input bar as the new feature list.
    fn submit(&mut self) {
        let line = self.input.trim().to_string();
        let features = input::parse_features(&line);
        if !line.is_empty() && self.history.last() != Some(&line) {
            self.history.push(line);
        }
        self.history_pos = None;
        if self.widget.set_features(features) {
            info!(features = ?self.widget.features(), "feature set changed");
        }
    }

    pub fn apply(&mut self, action: AppAction) {
        match action {
            AppAction::Quit => self.quit = true,
            AppAction::Refresh => self.widget.refresh(),
            AppAction::Submit => self.submit(),
            AppAction::TypeChar(c) => {
                self.input.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            AppAction::Backspace => {
                if let Some(c) = self.input[..self.cursor].chars().next_back() {
                    self.cursor -= c.len_utf8();
                    self.input.remove(self.cursor);
                }
            }
            AppAction::Delete => {
                if self.cursor < self.input.len() {
                    self.input.remove(self.cursor);
                }
            }
            AppAction::CursorLeft => {
                if let Some(c) = self.input[..self.cursor].chars().next_back() {
                    self.cursor -= c.len_utf8();
                }
            }
            AppAction::CursorRight => {
                if let Some(c) = self.input[self.cursor..].chars().next() {
                    self.cursor += c.len_utf8();
                }
            }
            AppAction::CursorHome => self.cursor = 0,
            AppAction::CursorEnd => self.cursor = self.input.len(),
            AppAction::ClearInput => {
                self.input.clear();
                self.cursor = 0;
            }
            AppAction::HistoryUp => {
                if !self.history.is_empty() {
                    let pos = match self.history_pos {
                        Some(p) if p > 0 => p - 1,
                        Some(p) => p,
                        None => self.history.len() - 1,
                    };
                    self.history_pos = Some(pos);
                    self.input = self.history[pos].clone();
                    self.cursor = self.input.len();
                }
            }
            AppAction::HistoryDown => {
                if let Some(pos) = self.history_pos {
                    if pos + 1 < self.history.len() {
                        self.history_pos = Some(pos + 1);
                        self.input = self.history[pos + 1].clone();
                    } else {
                        self.history_pos = None;
                        self.input.clear();
                    }
                    self.cursor = self.input.len();
                }
            }
            AppAction::Noop => {}
        }
    }
}
