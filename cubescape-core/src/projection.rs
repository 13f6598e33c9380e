/// Perspective projection onto the character grid
use nalgebra::Point3;

/// A rotated point mapped to a screen cell.
///
/// `ooz` is the inverse of the camera-space depth ("one over z"): larger
/// values are nearer the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: i32,
    pub y: i32,
    pub ooz: f32,
}

/// Camera and screen constants for projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub width: usize,
    pub height: usize,
    /// Distance from the camera to the object origin along z.
    pub camera_distance: f32,
    /// Perspective scale applied after division by depth.
    pub perspective: f32,
}

impl Projector {
    pub fn new(width: usize, height: usize, camera_distance: f32, perspective: f32) -> Self {
        Self {
            width,
            height,
            camera_distance,
            perspective,
        }
    }

    /// Project a rotated point to a screen cell, shifted horizontally by
    /// `offset` columns.
    ///
    /// Columns are stretched by two to compensate for terminal cells being
    /// roughly twice as tall as they are wide.
    ///
    /// Returns `None` when the point sits exactly on the camera plane
    /// (`z + distance == 0`) or the result is not a finite number. Points
    /// behind the camera come back with a negative `ooz`, which never
    /// passes the compositor's depth test.
    pub fn project(&self, point: &Point3<f32>, offset: f32) -> Option<Projected> {
        let z = point.z + self.camera_distance;
        if z == 0.0 {
            return None;
        }
        let ooz = 1.0 / z;

        let center_x = (self.width / 2) as f32;
        let center_y = (self.height / 2) as f32;
        let xp = (center_x + offset + self.perspective * ooz * point.x * 2.0).floor();
        let yp = (center_y + self.perspective * ooz * point.y).floor();

        if !(ooz.is_finite() && xp.is_finite() && yp.is_finite()) {
            return None;
        }

        Some(Projected {
            x: xp as i32,
            y: yp as i32,
            ooz,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> Projector {
        Projector::new(140, 40, 120.0, 40.0)
    }

    #[test]
    fn test_origin_lands_on_center() {
        let p = projector().project(&Point3::origin(), 0.0).unwrap();
        assert_eq!((p.x, p.y), (70, 20));
        assert!((p.ooz - 1.0 / 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_shifts_columns_only() {
        let p = projector().project(&Point3::origin(), -40.0).unwrap();
        assert_eq!((p.x, p.y), (30, 20));
    }

    #[test]
    fn test_perspective_scaling() {
        // x = 16 at depth 128: 70 + 40 * (1/128) * 16 * 2 = 80
        let p = projector()
            .project(&Point3::new(16.0, 0.0, 8.0), 0.0)
            .unwrap();
        assert_eq!(p.x, 80);
        // y = -8 at depth 64: 20 + 40 * (1/64) * -8 = 15
        let p = projector()
            .project(&Point3::new(0.0, -8.0, -56.0), 0.0)
            .unwrap();
        assert_eq!(p.y, 15);
    }

    #[test]
    fn test_negative_coordinates_floor() {
        // 70 - 70 + 40 * (1/120) * -1.6 * 2 = -1.07
        let p = projector()
            .project(&Point3::new(-1.6, 0.0, 0.0), -70.0)
            .unwrap();
        assert_eq!(p.x, -2);
    }

    #[test]
    fn test_nearer_points_have_larger_ooz() {
        let near = projector()
            .project(&Point3::new(0.0, 0.0, -5.0), 0.0)
            .unwrap();
        let far = projector()
            .project(&Point3::new(0.0, 0.0, 5.0), 0.0)
            .unwrap();
        assert!(near.ooz > far.ooz);
    }

    #[test]
    fn test_camera_plane_is_discarded() {
        assert_eq!(
            projector().project(&Point3::new(1.0, 1.0, -120.0), 0.0),
            None
        );
    }

    #[test]
    fn test_behind_camera_has_negative_ooz() {
        let p = projector()
            .project(&Point3::new(0.0, 0.0, -130.0), 0.0)
            .unwrap();
        assert!(p.ooz < 0.0);
    }

    #[test]
    fn test_non_finite_input_is_discarded() {
        assert_eq!(
            projector().project(&Point3::new(f32::NAN, 0.0, 0.0), 0.0),
            None
        );
        assert_eq!(
            projector().project(&Point3::new(0.0, f32::INFINITY, 0.0), 0.0),
            None
        );
    }
}
