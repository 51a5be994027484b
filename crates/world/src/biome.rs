//! Biome classification for the warped dimension.
//!
//! Three interfering sine waves plus a small per-column jitter are folded
//! into `[0, 1]` and cut by a threshold profile. The function is pure: the
//! same `(x, z, seed)` always yields the same category, and nothing is
//! cached or stored.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::chunk::ChunkPos;

/// Biome category of a world column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeCategory {
    /// Warped Forest: nylium ground, huge fungi, ruins.
    Primary,
    /// Sculk Forest: sculk trees.
    Secondary,
    /// Amethyst Forest: amethyst trees, rocks and chorus.
    Tertiary,
}

impl BiomeCategory {
    pub const ALL: [BiomeCategory; 3] = [
        BiomeCategory::Primary,
        BiomeCategory::Secondary,
        BiomeCategory::Tertiary,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            BiomeCategory::Primary => "Warped Forest",
            BiomeCategory::Secondary => "Sculk Forest",
            BiomeCategory::Tertiary => "Amethyst Forest",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BiomeCategory::Primary => "warped_forest",
            BiomeCategory::Secondary => "sculk_forest",
            BiomeCategory::Tertiary => "amethyst_forest",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "warped_forest" | "primary" => Some(BiomeCategory::Primary),
            "sculk_forest" | "secondary" => Some(BiomeCategory::Secondary),
            "amethyst_forest" | "tertiary" => Some(BiomeCategory::Tertiary),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            BiomeCategory::Primary => 0,
            BiomeCategory::Secondary => 1,
            BiomeCategory::Tertiary => 2,
        }
    }
}

/// Threshold profile applied to the combined noise value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiomeThresholds {
    /// `> 0.7` tertiary, `> 0.4` secondary.
    #[default]
    Classic,
    /// `> 0.67` tertiary, `> 0.33` secondary.
    Balanced,
}

impl BiomeThresholds {
    /// Lower bound (exclusive) for the tertiary category.
    pub fn upper(self) -> f64 {
        match self {
            BiomeThresholds::Classic => 0.7,
            BiomeThresholds::Balanced => 0.67,
        }
    }

    /// Lower bound (exclusive) for the secondary category.
    pub fn lower(self) -> f64 {
        match self {
            BiomeThresholds::Classic => 0.4,
            BiomeThresholds::Balanced => 0.33,
        }
    }

    pub fn categorize(self, value: f64) -> BiomeCategory {
        if value > self.upper() {
            BiomeCategory::Tertiary
        } else if value > self.lower() {
            BiomeCategory::Secondary
        } else {
            BiomeCategory::Primary
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BiomeThresholds::Classic => "classic",
            BiomeThresholds::Balanced => "balanced",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(BiomeThresholds::Classic),
            "balanced" => Some(BiomeThresholds::Balanced),
            _ => None,
        }
    }
}

/// Combined biome noise at a column, in `[0, 1]`.
pub fn biome_noise(x: i32, z: i32, seed: u64) -> f64 {
    let jitter_seed = seed
        .wrapping_add((x as i64).wrapping_mul(12345) as u64)
        .wrapping_add((z as i64).wrapping_mul(67890) as u64);
    let jitter = (StdRng::seed_from_u64(jitter_seed).gen::<f64>() - 0.5) * 0.1;

    let (fx, fz) = (x as f64, z as f64);
    let n1 = (fx * 0.001).sin() * (fz * 0.001).cos();
    let n2 = (fx * 0.002 + fz * 0.002).sin() * 0.6;
    let n3 = (fx * 0.003 - fz * 0.003).sin() * 0.4;

    ((n1 + n2 + n3 + jitter + 2.0) / 4.0).clamp(0.0, 1.0)
}

/// Seeded, stateless biome classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BiomeNoiseClassifier {
    thresholds: BiomeThresholds,
}

impl BiomeNoiseClassifier {
    pub fn new(thresholds: BiomeThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> BiomeThresholds {
        self.thresholds
    }

    /// Classify a single world column.
    pub fn classify(&self, x: i32, z: i32, seed: u64) -> BiomeCategory {
        self.thresholds.categorize(biome_noise(x, z, seed))
    }

    /// Classify a chunk by its center column.
    pub fn classify_chunk(&self, chunk: ChunkPos, seed: u64) -> BiomeCategory {
        let (x, z) = chunk.center();
        self.classify(x, z, seed)
    }

    /// Tally categories over a square grid `[-extent, extent]` sampled every `step` blocks.
    pub fn survey(&self, seed: u64, extent: i32, step: i32) -> BiomeHistogram {
        let step = step.max(1) as usize;
        let mut histogram = BiomeHistogram::default();
        for x in (-extent..=extent).step_by(step) {
            for z in (-extent..=extent).step_by(step) {
                histogram.record(self.classify(x, z, seed));
            }
        }
        histogram
    }
}

/// Category counts from a sampled area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiomeHistogram {
    counts: [usize; 3],
}

impl BiomeHistogram {
    pub fn record(&mut self, category: BiomeCategory) {
        self.counts[category.index()] += 1;
    }

    pub fn count(&self, category: BiomeCategory) -> usize {
        self.counts[category.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn fraction(&self, category: BiomeCategory) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(category) as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_deterministic() {
        let classifier = BiomeNoiseClassifier::default();
        for (x, z) in [(0, 0), (-513, 77), (12_345, -9_876)] {
            let a = classifier.classify(x, z, 42);
            let b = classifier.classify(x, z, 42);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn noise_stays_in_unit_range() {
        for x in (-20_000..20_000).step_by(997) {
            for z in (-20_000..20_000).step_by(1_009) {
                let v = biome_noise(x, z, 7);
                assert!((0.0..=1.0).contains(&v), "value {v} at {x},{z}");
            }
        }
    }

    #[test]
    fn jitter_is_bounded() {
        // At the origin all sine terms are zero, leaving (jitter + 2) / 4.
        for seed in 0..64 {
            let v = biome_noise(0, 0, seed);
            assert!((v - 0.5).abs() <= 0.0125 + 1e-12);
        }
    }

    #[test]
    fn thresholds_cut_as_documented() {
        let classic = BiomeThresholds::Classic;
        assert_eq!(classic.categorize(0.71), BiomeCategory::Tertiary);
        assert_eq!(classic.categorize(0.7), BiomeCategory::Secondary);
        assert_eq!(classic.categorize(0.41), BiomeCategory::Secondary);
        assert_eq!(classic.categorize(0.4), BiomeCategory::Primary);

        let balanced = BiomeThresholds::Balanced;
        assert_eq!(balanced.categorize(0.68), BiomeCategory::Tertiary);
        assert_eq!(balanced.categorize(0.34), BiomeCategory::Secondary);
        assert_eq!(balanced.categorize(0.33), BiomeCategory::Primary);
    }

    #[test]
    fn chunk_classification_uses_center_column() {
        let classifier = BiomeNoiseClassifier::default();
        let chunk = ChunkPos::new(-3, 5);
        assert_eq!(
            classifier.classify_chunk(chunk, 99),
            classifier.classify(-40, 88, 99)
        );
    }

    #[test]
    fn names_parse_back() {
        for category in BiomeCategory::ALL {
            assert_eq!(BiomeCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(BiomeThresholds::parse("BALANCED"), Some(BiomeThresholds::Balanced));
        assert_eq!(BiomeThresholds::parse("steep"), None);
    }

    #[test]
    fn histogram_fractions_sum_to_one() {
        let histogram = BiomeNoiseClassifier::default().survey(1, 512, 64);
        let sum: f64 = BiomeCategory::ALL
            .iter()
            .map(|c| histogram.fraction(*c))
            .sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(histogram.total(), 17 * 17);
    }
}
