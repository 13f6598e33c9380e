/// Euler rotation of object-space sample points
use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Cumulative rotation around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl RotationState {
    pub fn new(a: f32, b: f32, c: f32) -> Self {
        Self { a, b, c }
    }

    pub fn zero() -> Self {
        Self {
            a: 0.0,
            b: 0.0,
            c: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians).
    ///
    /// Angles are kept in `[0, 2π)` so long runs don't lose precision;
    /// the trigonometry downstream is periodic, so frames are unaffected.
    pub fn rotate(&mut self, delta: &RotationState) {
        self.a = (self.a + delta.a).rem_euclid(TAU);
        self.b = (self.b + delta.b).rem_euclid(TAU);
        self.c = (self.c + delta.c).rem_euclid(TAU);
    }

    fn trig(&self) -> Trig {
        let (sin_a, cos_a) = self.a.sin_cos();
        let (sin_b, cos_b) = self.b.sin_cos();
        let (sin_c, cos_c) = self.c.sin_cos();
        Trig {
            sin_a,
            cos_a,
            sin_b,
            cos_b,
            sin_c,
            cos_c,
        }
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

struct Trig {
    sin_a: f32,
    cos_a: f32,
    sin_b: f32,
    cos_b: f32,
    sin_c: f32,
    cos_c: f32,
}

/// Rotate an object-space point `(i, j, k)` by the angles in `rotation`.
pub fn rotate_point(point: &Point3<f32>, rotation: &RotationState) -> Point3<f32> {
    let Trig {
        sin_a,
        cos_a,
        sin_b,
        cos_b,
        sin_c,
        cos_c,
    } = rotation.trig();
    let (i, j, k) = (point.x, point.y, point.z);

    let x = j * sin_a * sin_b * cos_c - k * cos_a * sin_b * cos_c
        + j * cos_a * sin_c
        + k * sin_a * sin_c
        + i * cos_b * cos_c;
    let y = j * cos_a * cos_c + k * sin_a * cos_c - j * sin_a * sin_b * sin_c
        + k * cos_a * sin_b * sin_c
        - i * cos_b * sin_c;
    let z = k * cos_a * cos_b - j * sin_a * cos_b + i * sin_b;

    Point3::new(x, y, z)
}

/// Matrix form of [`rotate_point`], for callers transforming many points
/// with the same angles.
pub fn rotation_matrix(rotation: &RotationState) -> Matrix3<f32> {
    let t = rotation.trig();
    Matrix3::new(
        t.cos_b * t.cos_c,
        t.sin_a * t.sin_b * t.cos_c + t.cos_a * t.sin_c,
        t.sin_a * t.sin_c - t.cos_a * t.sin_b * t.cos_c,
        -t.cos_b * t.sin_c,
        t.cos_a * t.cos_c - t.sin_a * t.sin_b * t.sin_c,
        t.sin_a * t.cos_c + t.cos_a * t.sin_b * t.sin_c,
        t.sin_b,
        -t.sin_a * t.cos_b,
        t.cos_a * t.cos_b,
    )
}
