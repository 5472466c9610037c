// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transform value types shared by the live scene, the controller and history.

use serde::{Deserialize, Serialize};

/// A three-component vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vector3 {
    /// All components zero
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All components one
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a new vector
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Get a single component
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Set a single component
    pub fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }

    /// Component-wise sum
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise difference
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Multiply every component by `factor`
    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Euclidean length
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Linear interpolation between `from` and `to`
    pub fn lerp(from: Self, to: Self, t: f32) -> Self {
        from.add(to.sub(from).scale(t))
    }

    /// Components as an array
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(value: [f32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

/// A single coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// All axes in order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Lowercase name of this axis
    pub fn name(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }

    /// Parse an axis name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            _ => None,
        }
    }
}

/// One of the three vectors of a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformField {
    /// Position
    Position,
    /// Euler rotation in radians
    Rotation,
    /// Scale
    Scale,
}

impl TransformField {
    /// Lowercase name of this field
    pub fn name(&self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
        }
    }

    /// Parse a field name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "position" | "pos" => Some(Self::Position),
            "rotation" | "rot" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }
}

/// Immutable copy of a node's position, rotation and scale at one instant.
///
/// Snapshots are plain values: capturing one never borrows the live node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSnapshot {
    /// Position
    pub position: Vector3,
    /// Euler rotation in radians
    pub rotation: Vector3,
    /// Scale
    pub scale: Vector3,
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
        }
    }
}

impl TransformSnapshot {
    /// Create a snapshot from its three vectors
    pub fn new(position: Vector3, rotation: Vector3, scale: Vector3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Identity rotation and unit scale at `position`
    pub fn at(position: Vector3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Get one of the three vectors
    pub fn field(&self, field: TransformField) -> Vector3 {
        match field {
            TransformField::Position => self.position,
            TransformField::Rotation => self.rotation,
            TransformField::Scale => self.scale,
        }
    }

    /// Copy of this snapshot with one scalar replaced
    pub fn with_component(mut self, field: TransformField, axis: Axis, value: f32) -> Self {
        let target = match field {
            TransformField::Position => &mut self.position,
            TransformField::Rotation => &mut self.rotation,
            TransformField::Scale => &mut self.scale,
        };
        target.set(axis, value);
        self
    }

    /// The nine scalars in position, rotation, scale order
    pub fn scalars(&self) -> [f32; 9] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
        ]
    }

    /// True if at least one of the nine scalars differs bitwise from `other`
    pub fn differs_from(&self, other: &Self) -> bool {
        self.scalars()
            .iter()
            .zip(other.scalars().iter())
            .any(|(a, b)| a.to_bits() != b.to_bits())
    }

    /// True if none of the nine scalars is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.scalars().iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_default_is_identity() {
        let snapshot = TransformSnapshot::default();
        assert_eq!(snapshot.position, Vector3::ZERO);
        assert_eq!(snapshot.rotation, Vector3::ZERO);
        assert_eq!(snapshot.scale, Vector3::ONE);
    }

    #[test]
    fn test_differs_from_single_scalar() {
        let a = TransformSnapshot::at(Vector3::new(1.0, 2.0, 3.0));
        assert!(!a.differs_from(&a));

        let b = a.with_component(TransformField::Scale, Axis::Z, 2.0);
        assert!(a.differs_from(&b));
        assert_eq!(b.scale, Vector3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_differs_from_is_bitwise() {
        let nan = TransformSnapshot::at(Vector3::new(f32::NAN, 0.0, 0.0));
        assert!(!nan.differs_from(&nan));
        assert!(!nan.is_finite());
        assert!(TransformSnapshot::default().is_finite());

        let zero = TransformSnapshot::at(Vector3::ZERO);
        let negative_zero = TransformSnapshot::at(Vector3::new(-0.0, 0.0, 0.0));
        assert!(zero.differs_from(&negative_zero));
    }

    #[test]
    fn test_lerp_endpoints() {
        let from = Vector3::new(0.0, 0.0, 0.0);
        let to = Vector3::new(4.0, -2.0, 8.0);
        assert_eq!(Vector3::lerp(from, to, 0.0), from);
        assert_eq!(Vector3::lerp(from, to, 1.0), to);
        assert_eq!(Vector3::lerp(from, to, 0.5), Vector3::new(2.0, -1.0, 4.0));
    }

    #[test]
    fn test_axis_and_field_names() {
        assert_eq!(Axis::from_name("Y"), Some(Axis::Y));
        assert_eq!(Axis::from_name("w"), None);
        assert_eq!(TransformField::from_name("rot"), Some(TransformField::Rotation));
        assert_eq!(TransformField::Scale.name(), "scale");
    }
}
