use std::fs;

use follow_core::DEFAULT_HINT_CHARSET;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hint alphabet handed to the controller.
    pub charset: String,
    /// Selectable targets in the top-level frame.
    pub self_count: usize,
    /// Selectable targets per direct child frame, one entry per child.
    pub child_counts: Vec<usize>,
    /// Ask activated targets to open in a new tab.
    pub new_tab: bool,
    /// Key script replayed once every frame has its labels. Whitespace
    /// separated; "Enter", "Escape", "Backspace" and "Delete" are named
    /// keys, anything else is typed character by character.
    pub keys: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            charset: DEFAULT_HINT_CHARSET.to_string(),
            self_count: 2,
            child_counts: vec![2, 2],
            new_tab: false,
            keys: "b".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("simulator.toml") {
        match toml::from_str::<Settings>(&raw) {
            Ok(file_cfg) => settings = file_cfg,
            Err(err) => warn!(%err, "simulator.toml is unreadable; using defaults"),
        }
    }

    if let Ok(v) = std::env::var("FOLLOW_SIM_CHARSET") {
        settings.charset = v;
    }
    if let Ok(v) = std::env::var("FOLLOW_SIM_KEYS") {
        settings.keys = v;
    }
    if let Ok(v) = std::env::var("FOLLOW_SIM_NEW_TAB") {
        settings.new_tab = v == "true" || v == "1";
    }
    if let Ok(v) = std::env::var("FOLLOW_SIM_SELF_COUNT") {
        if let Ok(parsed) = v.parse() {
            settings.self_count = parsed;
        }
    }
    if let Ok(v) = std::env::var("FOLLOW_SIM_CHILD_COUNTS") {
        settings.child_counts = parse_counts(&v);
    }

    settings
}

pub fn parse_counts(raw: &str) -> Vec<usize> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
