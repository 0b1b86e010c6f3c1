// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use common::colors::CATEGORY_PALETTE;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const CATEGORY_COLORS_FILE_NAME: &str = "category_colors.json";

/// Assigns each category name a color from the palette, in order of first use,
/// and remembers the assignments across restarts.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CategoryPalette {
    colors: HashMap<String, String>,
    next_color_index: usize,
    // Where assignments are persisted; `None` keeps them in memory only.
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl CategoryPalette {
    /// A palette that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the palette saved in `data_dir`, starting a fresh one if the file
    /// is missing or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CATEGORY_COLORS_FILE_NAME);
        let mut palette = match read_palette(&path) {
            Ok(palette) => palette,
            Err(e) => {
                warn!(
                    "Could not load category colors from {}, starting a new map: {:?}",
                    path.display(),
                    e
                );
                Self::default()
            }
        };
        // Ensure next_color_index is within bounds after loading
        palette.next_color_index %= CATEGORY_PALETTE.len();
        palette.path = Some(path);
        palette
    }

    /// Returns the color of `category`, if one has been assigned already.
    pub fn get(&self, category: &str) -> Option<&str> {
        self.colors.get(category).map(String::as_str)
    }

    /// Returns the assigned color of `category`, or a palette color derived
    /// from its name when none has been assigned yet. Nothing is recorded.
    pub fn color_of(&self, category: &str) -> String {
        match self.get(category) {
            Some(color) => color.to_string(),
            None => {
                let hash = category
                    .bytes()
                    .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(usize::from(b)));
                CATEGORY_PALETTE[hash % CATEGORY_PALETTE.len()].to_string()
            }
        }
    }

    /// Returns the color of `category`, assigning the next palette color if it
    /// is new. New assignments are saved right away; a failed save is logged
    /// and the in-memory assignment is kept.
    pub fn color_for(&mut self, category: &str) -> String {
        if let Some(color) = self.colors.get(category) {
            return color.clone();
        }

        let color = CATEGORY_PALETTE[self.next_color_index].to_string();
        self.colors.insert(category.to_string(), color.clone());
        // Move to the next color in the palette, wrapping around if necessary
        self.next_color_index = (self.next_color_index + 1) % CATEGORY_PALETTE.len();
        debug!("Assigned color {} to category {}", color, category);

        if let Err(e) = self.save() {
            warn!("Error saving category colors: {:?}", e);
        }
        color
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

fn read_palette(path: &Path) -> Result<CategoryPalette> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let palette = serde_json::from_str(&data).context("Failed to parse category colors")?;
    Ok(palette)
}
