/// Procedural cube surfaces
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Default distance between neighbouring samples along a face.
pub const DEFAULT_SAMPLE_STEP: f32 = 0.6;

/// One cube face: the glyph it is drawn with and how a pair of loop
/// coordinates `(u, v)` lands on it for a cube of half-width `h`.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub glyph: char,
    pub place: fn(u: f32, v: f32, h: f32) -> Point3<f32>,
}

/// The six faces, in submission order.
pub static FACES: [Face; 6] = [
    Face {
        glyph: '@',
        place: |u, v, h| Point3::new(u, v, -h),
    },
    Face {
        glyph: '$',
        place: |u, v, h| Point3::new(h, v, u),
    },
    Face {
        glyph: '~',
        place: |u, v, h| Point3::new(-h, v, -u),
    },
    Face {
        glyph: '#',
        place: |u, v, h| Point3::new(-u, v, h),
    },
    Face {
        glyph: ';',
        place: |u, v, h| Point3::new(u, -h, -v),
    },
    Face {
        glyph: '+',
        place: |u, v, h| Point3::new(u, h, v),
    },
];

/// An object-space point on a cube surface and the glyph drawn for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Point3<f32>,
    pub glyph: char,
}

/// A cube placed in the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeSpec {
    pub half_width: f32,
    /// Horizontal screen offset in columns.
    pub offset: f32,
    #[serde(default = "default_step")]
    pub step: f32,
}

fn default_step() -> f32 {
    DEFAULT_SAMPLE_STEP
}

impl CubeSpec {
    pub fn new(half_width: f32, offset: f32) -> Self {
        Self {
            half_width,
            offset,
            step: DEFAULT_SAMPLE_STEP,
        }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// The three cubes of the default scene, largest on the left.
    pub fn default_scene() -> Vec<CubeSpec> {
        vec![
            CubeSpec::new(20.0, -40.0),
            CubeSpec::new(10.0, 10.0),
            CubeSpec::new(5.0, 40.0),
        ]
    }

    /// Upper bound on the number of loop coordinates along one axis.
    /// Saturates for degenerate steps.
    pub fn axis_len(&self) -> usize {
        ((2.0 * self.half_width) / self.step).ceil() as usize
    }

    /// Loop coordinates along one free axis: `-h, -h + step, ...` while
    /// below `+h`.
    pub fn axis(&self) -> impl Iterator<Item = f32> + Clone {
        let h = self.half_width;
        let step = self.step;
        // One spare index absorbs rounding in the bound.
        (0..=self.axis_len())
            .map(move |n| -h + n as f32 * step)
            .take_while(move |u| *u < h)
    }

    /// Every surface sample of this cube: for each `(u, v)` on the grid,
    /// one sample per face in [`FACES`] order.
    pub fn samples(&self) -> impl Iterator<Item = SurfaceSample> + '_ {
        let h = self.half_width;
        self.axis().flat_map(move |u| {
            self.axis().flat_map(move |v| {
                FACES.iter().map(move |face| SurfaceSample {
                    position: (face.place)(u, v, h),
                    glyph: face.glyph,
                })
            })
        })
    }

    /// Number of samples per face.
    pub fn samples_per_face(&self) -> usize {
        let n = self.axis().count();
        n * n
    }
}

/// Snap sample coordinates toward zero onto the integer lattice.
pub fn truncate(position: &Point3<f32>) -> Point3<f32> {
    position.map(f32::trunc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_excludes_upper_bound() {
        let cube = CubeSpec::new(2.0, 0.0).with_step(1.0);
        let axis: Vec<f32> = cube.axis().collect();
        assert_eq!(axis, vec![-2.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_axis_len_matches_axis() {
        for cube in [
            CubeSpec::new(2.0, 0.0).with_step(1.0),
            CubeSpec::new(20.0, 0.0),
            CubeSpec::new(5.0, 0.0).with_step(0.7),
            CubeSpec::new(3.0, 0.0).with_step(0.1),
        ] {
            let n = cube.axis().count();
            assert!(n <= cube.axis_len() + 1, "{cube:?}");
            assert!(n + 1 >= cube.axis_len(), "{cube:?}");
        }
    }

    #[test]
    fn test_axis_is_bounded_for_tiny_steps() {
        // Iteration stops at the precomputed bound instead of counting forever.
        let cube = CubeSpec::new(1.0, 0.0).with_step(1e-4);
        assert!((20_000..=20_001).contains(&cube.axis_len()));
        assert!(cube.axis().count() <= cube.axis_len() + 1);
    }

    #[test]
    fn test_axis_default_step() {
        let cube = CubeSpec::new(20.0, -40.0);
        let axis: Vec<f32> = cube.axis().collect();
        // -20, -19.4, ..., 19.6
        assert_eq!(axis.len(), 67);
        assert_eq!(axis[0], -20.0);
        assert!(axis.iter().all(|u| *u < 20.0));
    }

    #[test]
    fn test_six_samples_per_grid_point() {
        let cube = CubeSpec::new(5.0, 0.0).with_step(1.0);
        let samples: Vec<_> = cube.samples().collect();
        assert_eq!(samples.len(), 6 * 10 * 10);
        assert_eq!(cube.samples_per_face(), 100);

        let glyphs: Vec<char> = samples[..6].iter().map(|s| s.glyph).collect();
        assert_eq!(glyphs, vec!['@', '$', '~', '#', ';', '+']);
    }

    #[test]
    fn test_face_placement() {
        let (u, v, h) = (1.0, 2.0, 5.0);
        let placed: Vec<_> = FACES.iter().map(|f| (f.glyph, (f.place)(u, v, h))).collect();
        assert_eq!(placed[0], ('@', Point3::new(1.0, 2.0, -5.0)));
        assert_eq!(placed[1], ('$', Point3::new(5.0, 2.0, 1.0)));
        assert_eq!(placed[2], ('~', Point3::new(-5.0, 2.0, -1.0)));
        assert_eq!(placed[3], ('#', Point3::new(-1.0, 2.0, 5.0)));
        assert_eq!(placed[4], (';', Point3::new(1.0, -5.0, -2.0)));
        assert_eq!(placed[5], ('+', Point3::new(1.0, 5.0, 2.0)));
    }

    #[test]
    fn test_samples_lie_on_surface() {
        let cube = CubeSpec::new(3.0, 0.0).with_step(0.7);
        for s in cube.samples() {
            let p = s.position;
            let on_face = [p.x, p.y, p.z].iter().any(|c| c.abs() == 3.0);
            let inside = [p.x, p.y, p.z].iter().all(|c| c.abs() <= 3.0);
            assert!(on_face && inside, "{p:?}");
        }
    }

    #[test]
    fn test_truncate_toward_zero() {
        let p = truncate(&Point3::new(-19.4, 0.6, 19.999));
        assert_eq!(p, Point3::new(-19.0, 0.0, 19.0));
    }

    #[test]
    fn test_default_scene() {
        let scene = CubeSpec::default_scene();
        assert_eq!(scene.len(), 3);
        assert_eq!(scene[0], CubeSpec::new(20.0, -40.0));
        assert_eq!(scene[1].offset, 10.0);
        assert_eq!(scene[2].half_width, 5.0);
        assert!(scene.iter().all(|c| c.step == DEFAULT_SAMPLE_STEP));
    }
}
