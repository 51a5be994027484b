//! Perlin fractal noise for the stand-in overworld terrain.

use ::noise::{NoiseFn, Perlin};

/// Octave settings for one fractal noise field.
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    pub frequency: f64,
    pub seed: u32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 1.0,
            seed: 0,
        }
    }
}

impl NoiseConfig {
    /// Broad rolling hills.
    pub fn hills(seed: u32) -> Self {
        Self {
            octaves: 3,
            lacunarity: 2.2,
            persistence: 0.6,
            frequency: 0.006,
            seed,
        }
    }

    /// Surface detail on top of the hills.
    pub fn detail(seed: u32) -> Self {
        Self {
            octaves: 4,
            lacunarity: 2.3,
            persistence: 0.4,
            frequency: 0.03,
            seed: seed.wrapping_add(1000),
        }
    }

    /// 3D field for underground lava pockets.
    pub fn pockets(seed: u32) -> Self {
        Self {
            octaves: 2,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 0.08,
            seed: seed.wrapping_add(2000),
        }
    }
}

/// Multi-octave Perlin sampler. Output lies in `[-1, 1]`.
pub struct NoiseGenerator {
    perlin: Perlin,
    config: NoiseConfig,
}

impl NoiseGenerator {
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            perlin: Perlin::new(config.seed),
            config,
        }
    }

    pub fn sample_2d(&self, x: f64, z: f64) -> f64 {
        self.fractal(|f| self.perlin.get([x * f, z * f]))
    }

    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.fractal(|f| self.perlin.get([x * f, y * f, z * f]))
    }

    fn fractal(&self, sample: impl Fn(f64) -> f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.config.frequency;
        let mut max_value = 0.0;

        for _ in 0..self.config.octaves {
            value += sample(frequency) * amplitude;
            max_value += amplitude;
            amplitude *= self.config.persistence;
            frequency *= self.config.lacunarity;
        }

        value / max_value
    }
}

/// Hills plus detail, combined into one height signal.
pub struct LayeredNoise {
    hills: NoiseGenerator,
    detail: NoiseGenerator,
}

impl LayeredNoise {
    pub fn new(world_seed: u64) -> Self {
        let seed = world_seed as u32;
        Self {
            hills: NoiseGenerator::new(NoiseConfig::hills(seed)),
            detail: NoiseGenerator::new(NoiseConfig::detail(seed)),
        }
    }

    /// Combined height signal in `[-1, 1]`.
    pub fn sample_height(&self, x: f64, z: f64) -> f64 {
        self.hills.sample_2d(x, z) * 0.75 + self.detail.sample_2d(x, z) * 0.25
    }
}
