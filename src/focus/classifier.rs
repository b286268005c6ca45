use crate::models::WindowKind;

/// Application identifiers that should receive a path instead of image bytes
pub const DEFAULT_TERMINAL_APPS: &[&str] = &[
    "ghostty",
    "terminal",
    "konsole",
    "alacritty",
    "kitty",
    "wezterm",
    "foot",
    "tilix",
    "xterm",
    "claude",
    "code",
    "vim",
    "emacs",
    "zed",
];

/// Decides whether a focused window is terminal-like by case-insensitive
/// substring match against a configurable list of identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClassifier {
    patterns: Vec<String>,
}

impl WindowClassifier {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        WindowClassifier { patterns }
    }

    pub fn classify(&self, window: &str) -> WindowKind {
        let window = window.to_lowercase();
        if self.patterns.iter().any(|p| window.contains(p.as_str())) {
            WindowKind::TerminalLike
        } else {
            WindowKind::Other
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for WindowClassifier {
    fn default() -> Self {
        WindowClassifier::new(DEFAULT_TERMINAL_APPS)
    }
}
