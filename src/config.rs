use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::parser::ParseOptions;
use crate::record::Column;
use crate::source::DEFAULT_SOURCE;
use crate::style::Theme;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "rsiview.toml";

/// Something a key press can ask the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Refresh,
    Quit,
    SortSelected,
    SelectLeft,
    SelectRight,
    RowUp,
    RowDown,
    Top,
    Bottom,
    /// Sort by header position; bound to the digit keys
    #[serde(skip)]
    SortColumn(Column),
}

/// Maps single characters to actions
#[derive(Debug, Clone)]
pub struct KeyMap {
    basic_map: HashMap<char, Action>,
}

impl KeyMap {
    /// Bind `key` to `action`, replacing any earlier binding
    pub fn bind(&mut self, key: char, action: Action) {
        self.basic_map.insert(key, action);
    }

    /// Digits 1-9 always sort by header position
    pub fn get(&self, key: char) -> Option<Action> {
        if let Some(action) = self.basic_map.get(&key) {
            return Some(*action);
        }
        key.to_digit(10)
            .filter(|d| *d >= 1)
            .and_then(|d| Column::from_index(d as usize - 1))
            .map(Action::SortColumn)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            basic_map: HashMap::from([
                ('r', Action::Refresh),
                ('q', Action::Quit),
                ('s', Action::SortSelected),
                ('h', Action::SelectLeft),
                ('l', Action::SelectRight),
                ('k', Action::RowUp),
                ('j', Action::RowDown),
                ('g', Action::Top),
                ('G', Action::Bottom),
            ]),
        }
    }
}

/// Theme given either as a built-in name or as an inline table
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThemeSetting {
    Named(String),
    Custom(Theme),
}

impl Default for ThemeSetting {
    fn default() -> Self {
        ThemeSetting::Named("dark".to_string())
    }
}

/// Contents of `rsiview.toml`. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path or `http(s)://` URL of the screening CSV
    pub source: String,
    pub delimiter: String,
    pub quoting: bool,
    pub no_data_label: String,
    pub theme: ThemeSetting,
    pub http_timeout_secs: u64,
    /// Extra key bindings: character to action name
    pub keys: HashMap<String, Action>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let parse = ParseOptions::default();
        Self {
            source: DEFAULT_SOURCE.to_string(),
            delimiter: ",".to_string(),
            quoting: parse.quoting,
            no_data_label: parse.no_data_label,
            theme: ThemeSetting::default(),
            http_timeout_secs: 10,
            keys: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn from_str(text: &str) -> Result<Self, String> {
        let config: AppConfig = toml::from_str(text)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;
        parse_delimiter(&config.delimiter)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        Self::from_str(&content)
    }

    /// Load `path` if given, else `rsiview.toml` in the working directory if
    /// present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(p) => Self::from_file(p),
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            delimiter: parse_delimiter(&self.delimiter).unwrap_or(b','),
            quoting: self.quoting,
            no_data_label: self.no_data_label.clone(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Resolve the theme, falling back to the default for unknown names
    pub fn resolve_theme(&self) -> Theme {
        match &self.theme {
            ThemeSetting::Custom(theme) => theme.clone(),
            ThemeSetting::Named(name) => Theme::by_name(name).unwrap_or_else(|| {
                warn!(theme = %name, available = ?Theme::builtin_names(), "unknown theme, using default");
                Theme::default()
            }),
        }
    }

    /// Default bindings with the `[keys]` table applied on top
    pub fn key_map(&self) -> KeyMap {
        let mut map = KeyMap::default();
        for (key, action) in &self.keys {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => map.bind(c, *action),
                _ => warn!(key = %key, "key bindings must be a single character"),
            }
        }
        map
    }
}

/// Parse a delimiter name or single character into a byte
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.to_lowercase().as_str() {
        "comma" | "," => Ok(b','),
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        "semicolon" | ";" => Ok(b';'),
        "pipe" | "|" => Ok(b'|'),
        _ if s.len() == 1 => Ok(s.as_bytes()[0]),
        _ => Err(format!(
            "Invalid delimiter: '{}'. Use comma, tab, semicolon, pipe, or a single character.",
            s
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_str("").unwrap();
        assert_eq!(config.source, DEFAULT_SOURCE);
        assert_eq!(config.parse_options(), ParseOptions::default());
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.resolve_theme().name, "dark");
    }

    #[test]
    fn test_full_config() {
        let text = r#"
            source = "https://example.com/results.csv"
            delimiter = "semicolon"
            quoting = true
            no_data_label = "정보 없음"
            theme = "light"
            http_timeout_secs = 3

            [keys]
            R = "refresh"
            x = "quit"
        "#;
        let config = AppConfig::from_str(text).unwrap();
        let options = config.parse_options();
        assert_eq!(options.delimiter, b';');
        assert!(options.quoting);
        assert_eq!(options.no_data_label, "정보 없음");
        assert_eq!(config.resolve_theme().name, "light");

        let keys = config.key_map();
        assert_eq!(keys.get('R'), Some(Action::Refresh));
        assert_eq!(keys.get('x'), Some(Action::Quit));
        assert_eq!(keys.get('r'), Some(Action::Refresh));
    }

    #[test]
    fn test_inline_theme() {
        let text = r#"
            [theme]
            name = "custom"

            [theme.positive]
            fg = "green"
        "#;
        let config = AppConfig::from_str(text).unwrap();
        let theme = config.resolve_theme();
        assert_eq!(theme.name, "custom");
        assert!(theme.positive.fg.is_some());
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let config = AppConfig::from_str("theme = \"neon\"").unwrap();
        assert_eq!(config.resolve_theme().name, "dark");
    }

    #[test]
    fn test_bad_delimiter_rejected() {
        assert!(AppConfig::from_str("delimiter = \"colon-ish\"").is_err());
        assert!(AppConfig::from_str("quoting = \"yes\"").is_err());
    }

    #[test]
    fn test_digit_keys_sort_by_position() {
        let keys = KeyMap::default();
        assert_eq!(keys.get('1'), Some(Action::SortColumn(Column::Name)));
        assert_eq!(keys.get('4'), Some(Action::SortColumn(Column::Rsi7)));
        assert_eq!(keys.get('9'), Some(Action::SortColumn(Column::Rsi14Change)));
        assert_eq!(keys.get('0'), None);
        assert_eq!(keys.get('z'), None);
    }

    #[test]
    fn test_multi_char_binding_ignored() {
        let config = AppConfig::from_str("[keys]\nab = \"quit\"").unwrap();
        let keys = config.key_map();
        assert_eq!(keys.get('a'), None);
        assert_eq!(keys.get('q'), Some(Action::Quit));
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("|"), Ok(b'|'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("::").is_err());
    }
}
