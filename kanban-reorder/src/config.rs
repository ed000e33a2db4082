//! Reorder settings loaded with figment
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. An optional settings file (TOML, YAML or JSON, picked by extension)
//! 3. Environment variables prefixed with `KANBAN_REORDER_`, nested keys
//!    separated by `__` (e.g. `KANBAN_REORDER_MESSAGES__LIST_MOVED`)

use crate::edge::{Axis, Edge};
use crate::error::{ReorderError, Result};
use crate::types::ItemKind;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "KANBAN_REORDER_";

/// Behaviour knobs for the reordering engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderSettings {
    /// Lists sit side by side on the board
    pub list_axis: Axis,
    /// Cards stack inside a list
    pub card_axis: Axis,
    pub link_axis: Axis,
    /// Send a notification when persistence confirms a move
    pub notify_on_success: bool,
    /// Invalidate and refetch the board after a confirmed move
    pub refetch_on_confirm: bool,
    pub messages: Messages,
}

impl Default for ReorderSettings {
    fn default() -> Self {
        Self {
            list_axis: Axis::Horizontal,
            card_axis: Axis::Vertical,
            link_axis: Axis::Vertical,
            notify_on_success: true,
            refetch_on_confirm: true,
            messages: Messages::default(),
        }
    }
}

impl ReorderSettings {
    /// Layout axis of the container an item of `kind` is sorted in
    pub fn axis_for(&self, kind: ItemKind) -> Axis {
        match kind {
            ItemKind::List => self.list_axis,
            ItemKind::Card => self.card_axis,
            ItemKind::Link => self.link_axis,
        }
    }

    /// Edges a drop target of `kind` reports
    pub fn allowed_edges(&self, kind: ItemKind) -> &'static [Edge] {
        self.axis_for(kind).allowed_edges()
    }
}

/// Notification texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub list_moved: String,
    pub card_moved: String,
    pub link_moved: String,
    /// `{item}` and `{reason}` are substituted
    pub move_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            list_moved: "SUCCESS: List moved.".to_string(),
            card_moved: "SUCCESS: Card moved.".to_string(),
            link_moved: "SUCCESS: Link moved.".to_string(),
            move_failed: "ERROR: Failed to move {item}: {reason}".to_string(),
        }
    }
}

impl Messages {
    /// Success text for a moved item
    pub fn moved(&self, kind: ItemKind) -> &str {
        match kind {
            ItemKind::List => &self.list_moved,
            ItemKind::Card => &self.card_moved,
            ItemKind::Link => &self.link_moved,
        }
    }

    /// Failure text for an item, with the reason filled in
    pub fn failed(&self, kind: ItemKind, reason: &str) -> String {
        self.move_failed
            .replace("{item}", &kind.to_string())
            .replace("{reason}", reason)
    }
}

/// Builds [`ReorderSettings`] from layered sources
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer a settings file between the defaults and the environment
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Merge all sources and extract the settings
    pub fn load(&self) -> Result<ReorderSettings> {
        let settings: ReorderSettings = self.figment()?.extract()?;
        debug!(?settings, "reorder settings loaded");
        Ok(settings)
    }

    fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(ReorderSettings::default()));

        if let Some(path) = &self.file {
            figment = merge_file(figment, path)?;
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    if !path.is_file() {
        return Err(ReorderError::config(format!(
            "settings file not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    debug!(path = %path.display(), "merging settings file");
    match extension.as_deref() {
        Some("toml") => Ok(figment.merge(Toml::file(path))),
        Some("yaml") | Some("yml") => Ok(figment.merge(Yaml::file(path))),
        Some("json") => Ok(figment.merge(Json::file(path))),
        _ => Err(ReorderError::config(format!(
            "unsupported settings file format: {}",
            path.display()
        ))),
    }
}
