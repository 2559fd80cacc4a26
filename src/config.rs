// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

#[macro_use]
mod partial;
use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use macro_rules_attribute::derive;
use partial::{PartialConfig, ValidationError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::actor::wm::WmCommand;
use crate::model::{Button, Hotkey, HotkeyParseError, Key, Modifiers, Size, TileParams};

/// The built-in configuration. User files are layered over it.
pub const DEFAULT_CONFIG: &str = include_str!("../duplex.default.toml");

pub fn config_path_default() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".duplex.toml"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub settings: Settings,
    /// Sorted by hotkey so lookups are deterministic.
    pub keys: Vec<(Hotkey, WmCommand)>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
#[serde(default)]
struct ConfigPartial {
    settings: SettingsPartial,
    keys: Option<FxHashMap<String, WmCommand>>,
}

#[derive(PartialConfig!)]
#[derive_args(SettingsPartial)]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub gap: u32,
    pub master_ratio: f64,
    pub max_master: usize,
    pub virtual_screens: usize,
    pub min_drag_size: Size,
    pub focus_follows_mouse: bool,
    pub terminal: String,
    #[derive_args(ButtonsPartial)]
    pub buttons: Buttons,
}

#[derive(PartialConfig!)]
#[derive_args(ButtonsPartial)]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Buttons {
    pub modifier: Modifiers,
    #[serde(rename = "move")]
    pub move_button: Button,
    #[serde(rename = "retile")]
    pub retile_button: Button,
    #[serde(rename = "resize")]
    pub resize_button: Button,
}

impl Settings {
    pub fn tile_params(&self) -> TileParams {
        TileParams {
            gap: self.gap,
            master_ratio: self.master_ratio,
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if !(self.master_ratio > 0.0 && self.master_ratio < 1.0) {
            return Err(ConfigError::MasterRatio(self.master_ratio));
        }
        if self.virtual_screens == 0 {
            return Err(ConfigError::NoScreens);
        }
        if self.min_drag_size.width <= 0 || self.min_drag_size.height <= 0 {
            return Err(ConfigError::MinDragSize(self.min_drag_size));
        }
        let b = &self.buttons;
        let bound = [b.move_button, b.retile_button, b.resize_button];
        if let Some(button) = bound.into_iter().duplicates().next() {
            return Err(ConfigError::ButtonConflict(button));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Missing(#[from] ValidationError),
    #[error("could not parse hotkey {0:?}: {1}")]
    Hotkey(String, #[source] HotkeyParseError),
    #[error("hotkey {0:?} is bound more than once")]
    DuplicateHotkey(String),
    #[error("master_ratio must be strictly between 0 and 1, got {0}")]
    MasterRatio(f64),
    #[error("virtual_screens must be at least 1")]
    NoScreens,
    #[error("min_drag_size must be positive, got {0}")]
    MinDragSize(Size),
    #[error("{0:?} is bound to more than one mouse action")]
    ButtonConflict(Button),
}

impl ConfigPartial {
    fn builtin() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in config parses")
    }

    fn validate(self) -> Result<Config, ConfigError> {
        let settings = self.settings.validate()?;
        settings.check()?;
        let mut keys = Vec::new();
        for (text, cmd) in self.keys.unwrap_or_default() {
            let hotkey: Hotkey = text.parse().map_err(|e| ConfigError::Hotkey(text.clone(), e))?;
            keys.push((hotkey, cmd));
        }
        keys.sort_by_key(|&(hotkey, _)| hotkey);
        if let Some(hotkey) = keys.iter().map(|&(hotkey, _)| hotkey).duplicates().next() {
            return Err(ConfigError::DuplicateHotkey(hotkey.to_string()));
        }
        Ok(Config { settings, keys })
    }

    fn merge(low: Self, high: Self) -> Self {
        Self {
            settings: SettingsPartial::merge(low.settings, high.settings),
            keys: high.keys.or(low.keys),
        }
    }
}

impl Config {
    /// Loads the config at `custom_path`, or `~/.duplex.toml` if none is given.
    /// A missing default file is not an error; the built-in config is used.
    pub fn load(custom_path: Option<&Path>) -> anyhow::Result<Config> {
        let mut buf = String::new();
        let default = config_path_default();
        let (mut file, path) = match (custom_path, &default) {
            (Some(path), _) => (File::open(path)?, path),
            (None, Some(default)) => match File::open(default) {
                Ok(file) => (file, default.as_path()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
                Err(e) => return Err(e.into()),
            },
            (None, None) => return Ok(Config::default()),
        };
        file.read_to_string(&mut buf)?;
        Self::parse(&buf).map_err(|e| anyhow::anyhow!("{}", format_toml_error(e, &buf, path)))
    }

    fn parse(buf: &str) -> Result<Self, SpannedError> {
        let c: ConfigPartial = toml::from_str(buf)?;
        let defaults = ConfigPartial::builtin();
        ConfigPartial::merge(defaults, c).validate().map_err(|e| SpannedError::locate(e, buf))
    }

    /// The action bound to a key press, if any.
    pub fn command_for(&self, modifiers: Modifiers, key: Key) -> Option<WmCommand> {
        self.keys
            .iter()
            .find(|(hotkey, _)| hotkey.matches(modifiers, key))
            .map(|&(_, cmd)| cmd)
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigPartial::builtin().validate().expect("built-in config is valid")
    }
}

fn format_toml_error(error: SpannedError, input: &str, path: &Path) -> String {
    use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

    let message = error.message;
    let Some(span) = error.span else {
        return format!("could not parse config: {}", message);
    };

    let snippet = Snippet::source(input)
        .path(path.to_string_lossy())
        .annotation(AnnotationKind::Primary.span(span.start..span.end).label(message));

    let report = Level::ERROR.primary_title("could not parse config").element(snippet);

    let renderer = Renderer::styled();
    format!("{}", renderer.render(&[report]))
}

#[derive(Debug)]
struct SpannedError {
    message: String,
    span: Option<Range<usize>>,
}

impl SpannedError {
    /// Points hotkey errors at the offending key in the source. Other
    /// validation errors have no single location.
    fn locate(error: ConfigError, input: &str) -> Self {
        let span = match &error {
            ConfigError::Hotkey(text, _) | ConfigError::DuplicateHotkey(text) => {
                input.find(text.as_str()).map(|start| start..start + text.len())
            }
            _ => None,
        };
        Self { message: error.to_string(), span }
    }
}

impl From<toml::de::Error> for SpannedError {
    fn from(e: toml::de::Error) -> Self {
        Self {
            message: e.message().to_owned(),
            span: e.span(),
        }
    }
}
