// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material edits (colour and opacity) applied to live nodes.
//!
//! Material changes are applied directly and are not part of the transform
//! history.

use crate::live::{NodeId, SceneGraph};
use crate::mirror::find_by_id;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors parsing a colour string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    /// Wrong number of hex digits
    #[error("Expected 3 or 6 hex digits, got {0}")]
    InvalidLength(usize),

    /// A character that is not a hex digit
    #[error("Invalid hex color: {0:?}")]
    InvalidDigit(String),
}

/// Linear RGB colour with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a colour from float components
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a colour from 8-bit components
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0)
    }

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let digits = input.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(input.to_string()));
        }

        let expanded = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            n => return Err(ColorParseError::InvalidLength(n)),
        };

        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| ColorParseError::InvalidDigit(input.to_string()))
        };
        Ok(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as `#rrggbb`
    pub fn to_hex(&self) -> String {
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", to_byte(self.r), to_byte(self.g), to_byte(self.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Editable material properties of a live node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProps {
    /// Base colour
    pub color: Color,
    /// Opacity in `0.0..=1.0`
    pub opacity: f32,
    /// Whether the material renders with blending
    pub transparent: bool,
}

impl Default for MaterialProps {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
        }
    }
}

impl MaterialProps {
    /// Copy with the given opacity; any opacity below one turns on blending
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.opacity < 1.0;
        self
    }
}

/// Set the base colour of every material slot of a node
pub fn set_color<S: SceneGraph + ?Sized>(scene: &mut S, id: NodeId, color: Color) -> bool {
    update_material(scene, id, |material| material.color = color)
}

/// Set the opacity of every material slot of a node
pub fn set_opacity<S: SceneGraph + ?Sized>(scene: &mut S, id: NodeId, opacity: f32) -> bool {
    update_material(scene, id, |material| *material = material.with_opacity(opacity))
}

fn update_material<S, F>(scene: &mut S, id: NodeId, mut edit: F) -> bool
where
    S: SceneGraph + ?Sized,
    F: FnMut(&mut MaterialProps),
{
    let Some(live) = find_by_id(scene, id) else {
        tracing::debug!("Material edit skipped, node {id} not found");
        return false;
    };
    if !scene.edit_materials(live, &mut edit) {
        tracing::debug!("Material edit skipped, node {id} has no material");
        return false;
    }
    true
}
