// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor tools: transform modes, the orbit camera and the gizmo animator.

use crate::config::{CameraConfig, GizmoConfig};
use crate::transform::{TransformField, Vector3};
use serde::{Deserialize, Serialize};

/// Active gizmo mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransformMode {
    /// Move - W key
    #[default]
    Translate,
    /// Rotate - E key
    Rotate,
    /// Scale - R key
    Scale,
}

impl TransformMode {
    /// Get the name of this mode
    pub fn name(&self) -> &'static str {
        match self {
            Self::Translate => "Translate",
            Self::Rotate => "Rotate",
            Self::Scale => "Scale",
        }
    }

    /// Get the hotkey for this mode
    pub fn hotkey(&self) -> char {
        match self {
            Self::Translate => 'W',
            Self::Rotate => 'E',
            Self::Scale => 'R',
        }
    }

    /// Transform vector this mode edits
    pub fn field(&self) -> TransformField {
        match self {
            Self::Translate => TransformField::Position,
            Self::Rotate => TransformField::Rotation,
            Self::Scale => TransformField::Scale,
        }
    }

    /// Parse a mode name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "translate" | "move" => Some(Self::Translate),
            "rotate" => Some(Self::Rotate),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }
}

/// Eased camera flight between two poses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFocus {
    from_position: Vector3,
    from_target: Vector3,
    to_position: Vector3,
    to_target: Vector3,
    elapsed: f32,
    duration: f32,
}

impl CameraFocus {
    fn new(from: (Vector3, Vector3), to: (Vector3, Vector3), duration: f32) -> Self {
        Self {
            from_position: from.0,
            from_target: from.1,
            to_position: to.0,
            to_target: to.1,
            elapsed: 0.0,
            duration,
        }
    }

    /// Linear progress in `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }

    /// Whether the flight has reached its destination
    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    fn advance(&mut self, dt: f32) -> (Vector3, Vector3) {
        self.elapsed += dt.max(0.0);
        // cubic ease-out
        let t = 1.0 - (1.0 - self.progress()).powi(3);
        (
            Vector3::lerp(self.from_position, self.to_position, t),
            Vector3::lerp(self.from_target, self.to_target, t),
        )
    }
}

/// Orbit camera of the viewport.
///
/// Pointer input is ignored while `input_enabled` is false; the transform
/// gizmo disables it for the duration of a drag.
#[derive(Debug, Clone)]
pub struct EditorCamera {
    /// Camera position
    pub position: Vector3,
    /// Look-at point
    pub target: Vector3,
    /// Orbit distance from target
    pub distance: f32,
    /// Orbit yaw angle in radians
    pub yaw: f32,
    /// Orbit pitch angle in radians
    pub pitch: f32,
    config: CameraConfig,
    input_enabled: bool,
    focus: Option<CameraFocus>,
    home: Option<(Vector3, Vector3)>,
}

impl Default for EditorCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl EditorCamera {
    /// Create a camera with the given behaviour
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            position: Vector3::ZERO,
            target: Vector3::ZERO,
            distance: 10.0,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: std::f32::consts::FRAC_PI_6,
            config,
            input_enabled: true,
            focus: None,
            home: None,
        };
        camera.update_position();
        camera
    }

    /// Whether orbit/pan/zoom input is accepted
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Grant or revoke pointer input
    pub fn set_input_enabled(&mut self, enabled: bool) {
        if self.input_enabled != enabled {
            tracing::trace!("Camera input {}", if enabled { "enabled" } else { "disabled" });
        }
        self.input_enabled = enabled;
    }

    /// Orbit around the target; false if input is disabled
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) -> bool {
        if !self.input_enabled {
            return false;
        }
        self.yaw += delta_x * self.config.rotate_speed;
        self.pitch += delta_y * self.config.rotate_speed;

        // Clamp pitch to avoid gimbal lock
        let limit = std::f32::consts::FRAC_PI_2 - 0.01;
        self.pitch = self.pitch.clamp(-limit, limit);

        self.update_position();
        true
    }

    /// Move the target in the view plane; false if input is disabled
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) -> bool {
        if !self.input_enabled {
            return false;
        }
        let right = self.right();
        let up = self.up();
        let speed = self.distance * self.config.pan_speed;

        let offset = right.scale(-delta_x * speed).add(up.scale(delta_y * speed));
        self.target = self.target.add(offset);
        self.update_position();
        true
    }

    /// Change orbit distance; false if input is disabled
    pub fn zoom(&mut self, delta: f32) -> bool {
        if !self.input_enabled {
            return false;
        }
        self.distance *= 1.0 - delta * self.config.zoom_speed * 0.1;
        self.distance = self.distance.clamp(0.1, 10000.0);
        self.update_position();
        true
    }

    /// Fly towards `point`, remembering the current pose for [`Self::return_home`]
    pub fn focus_on(&mut self, point: Vector3) {
        if self.home.is_none() {
            self.home = Some((self.position, self.target));
        }
        let d = self.config.focus_distance;
        let destination = (point.add(Vector3::new(d, d, d)), point);
        self.focus = Some(CameraFocus::new(
            (self.position, self.target),
            destination,
            self.config.focus_duration_secs(),
        ));
    }

    /// Fly back to the pose held before the first focus
    pub fn return_home(&mut self) -> bool {
        let Some(home) = self.home.take() else {
            return false;
        };
        self.focus = Some(CameraFocus::new(
            (self.position, self.target),
            home,
            self.config.focus_duration_secs(),
        ));
        true
    }

    /// Whether a focus flight is in progress
    pub fn is_animating(&self) -> bool {
        self.focus.is_some()
    }

    /// Advance the focus flight by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let Some(focus) = self.focus.as_mut() else {
            return;
        };
        let (position, target) = focus.advance(dt);
        let finished = focus.is_finished();
        self.position = position;
        self.target = target;
        if finished {
            self.focus = None;
            self.sync_orbit();
        }
    }

    fn update_position(&mut self) {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.position = self.target.add(Vector3::new(x, y, z));
    }

    fn sync_orbit(&mut self) {
        let offset = self.position.sub(self.target);
        self.distance = offset.length().max(0.1);
        self.pitch = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
        self.yaw = offset.x.atan2(offset.z);
    }

    /// Camera forward direction
    pub fn forward(&self) -> Vector3 {
        let d = self.target.sub(self.position);
        let len = d.length();
        if len <= f32::EPSILON {
            return Vector3::new(0.0, 0.0, -1.0);
        }
        d.scale(1.0 / len)
    }

    /// Camera right direction
    pub fn right(&self) -> Vector3 {
        let f = self.forward();
        let up = Vector3::new(0.0, 1.0, 0.0);
        // up x forward
        Vector3::new(up.y * f.z - up.z * f.y, up.z * f.x - up.x * f.z, up.x * f.y - up.y * f.x)
    }

    /// Camera up direction (orthogonalized)
    pub fn up(&self) -> Vector3 {
        let f = self.forward();
        let r = self.right();
        // forward x right
        Vector3::new(f.y * r.z - f.z * r.y, f.z * r.x - f.x * r.z, f.x * r.y - f.y * r.x)
    }
}

/// Smooths the on-screen gizmo size between rest and hover/drag states
#[derive(Debug, Clone)]
pub struct GizmoAnimator {
    config: GizmoConfig,
    scale: f32,
    hovered: bool,
    dragging: bool,
}

impl GizmoAnimator {
    /// Create an animator at rest size
    pub fn new(config: GizmoConfig) -> Self {
        Self {
            scale: config.base_size,
            config,
            hovered: false,
            dragging: false,
        }
    }

    /// Pointer is over the gizmo
    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Gizmo is being dragged
    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Size the animation is heading towards
    pub fn target_scale(&self) -> f32 {
        if self.hovered || self.dragging {
            self.config.base_size * self.config.hover_scale
        } else {
            self.config.base_size
        }
    }

    /// Current display size
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Advance the animation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let target = self.target_scale();
        let blend = 1.0 - (-self.config.smoothing_rate * dt.max(0.0)).exp();
        self.scale += (target - self.scale) * blend;
        if (target - self.scale).abs() < 1e-4 {
            self.scale = target;
        }
    }
}

impl Default for GizmoAnimator {
    fn default() -> Self {
        Self::new(GizmoConfig::default())
    }
}
