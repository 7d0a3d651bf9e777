//! Terrain height sampling
//!
//! Optional collaborator. When no sampler is supplied, target heights are
//! left as computed from the reference point.

/// Height lookup provided by the terrain/navigation service
pub trait TerrainSampler {
    /// Ground height at horizontal world position (x, z)
    fn sample_height(&self, x: f32, z: f32) -> f32;
}

impl<F> TerrainSampler for F
where
    F: Fn(f32, f32) -> f32,
{
    fn sample_height(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Terrain at a constant height
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlatTerrain {
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl TerrainSampler for FlatTerrain {
    fn sample_height(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_terrain() {
        let terrain = FlatTerrain::new(2.5);
        assert_eq!(terrain.sample_height(-100.0, 42.0), 2.5);
    }

    #[test]
    fn test_closure_sampler() {
        let slope = |x: f32, _z: f32| x * 0.5;
        assert_eq!(slope.sample_height(4.0, 0.0), 2.0);

        let dyn_sampler: &dyn TerrainSampler = &slope;
        assert_eq!(dyn_sampler.sample_height(-2.0, 9.0), -1.0);
    }
}
