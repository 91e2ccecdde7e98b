// SPDX-License-Identifier: MPL-2.0
//! This module handles the crate's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use lens_edit::config::{self, Config};
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.export.jpeg_quality = 85;
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::domain::editing::Color;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "LensEdit";

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "LENS_EDIT_CONFIG_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editing: EditingConfig,
    pub display: DisplayConfig,
    pub cache: CacheConfig,
    pub export: ExportConfig,
}

/// Annotation appearance. Pixel sizes are screen pixels at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    pub stroke_color: [u8; 4],
    pub stroke_width_px: f32,
    pub text_color: [u8; 4],
    pub font_size_px: f32,
    pub font_family: String,
    /// Extra font file loaded next to the system fonts.
    pub font_file: Option<PathBuf>,
    pub erase_radius_px: f32,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            stroke_color: DEFAULT_STROKE_COLOR,
            stroke_width_px: DEFAULT_STROKE_WIDTH_PX,
            text_color: DEFAULT_TEXT_COLOR,
            font_size_px: DEFAULT_FONT_SIZE_PX,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_file: None,
            erase_radius_px: DEFAULT_ERASE_RADIUS_PX,
        }
    }
}

impl EditingConfig {
    #[must_use]
    pub fn stroke_color(&self) -> Color {
        Color::from_rgba8(self.stroke_color)
    }

    #[must_use]
    pub fn text_color(&self) -> Color {
        Color::from_rgba8(self.text_color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub zoom_step: f32,
    pub background: [u8; 4],
    pub crop_dim_opacity: f32,
    pub crop_border_width: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            zoom_step: DEFAULT_ZOOM_STEP,
            background: DEFAULT_BACKGROUND,
            crop_dim_opacity: DEFAULT_CROP_DIM_OPACITY,
            crop_border_width: DEFAULT_CROP_BORDER_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub prefetch_adjacent: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            prefetch_adjacent: DEFAULT_PREFETCH_ADJACENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub jpeg_quality: u8,
    pub edited_suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            edited_suffix: DEFAULT_EDITED_SUFFIX.to_string(),
        }
    }
}

impl Config {
    /// Clamps every numeric setting into its supported range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let size = MIN_ANNOTATION_SIZE_PX..=MAX_ANNOTATION_SIZE_PX;
        self.editing.stroke_width_px = self
            .editing
            .stroke_width_px
            .clamp(*size.start(), *size.end());
        self.editing.font_size_px = self.editing.font_size_px.clamp(*size.start(), *size.end());
        self.editing.erase_radius_px = self
            .editing
            .erase_radius_px
            .clamp(*size.start(), *size.end());
        self.display.zoom_step = self.display.zoom_step.clamp(MIN_ZOOM_STEP, MAX_ZOOM_STEP);
        self.display.crop_dim_opacity = self.display.crop_dim_opacity.clamp(0.0, 1.0);
        self.display.crop_border_width = self.display.crop_border_width.max(0.0);
        self.cache.capacity = self
            .cache
            .capacity
            .clamp(MIN_CACHE_CAPACITY, MAX_CACHE_CAPACITY);
        self.cache.prefetch_adjacent = self.cache.prefetch_adjacent.min(MAX_PREFETCH_ADJACENT);
        self.export.jpeg_quality = self
            .export
            .jpeg_quality
            .clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);
        if self.export.edited_suffix.is_empty() {
            self.export.edited_suffix = DEFAULT_EDITED_SUFFIX.to_string();
        }
        self
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir).join(CONFIG_FILE));
    }
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config = match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Ignoring invalid settings file {}: {err}", path.display());
            Config::default()
        }
    };
    Ok(config.sanitized())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
