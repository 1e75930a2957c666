//! Synthetic training label
//!
//! There is no historical fantasy production in the dataset, so the models
//! are trained against a hand-built heuristic score. Changing any coefficient
//! here changes what every model learns: bump `LABEL_VERSION` when you do.

use crate::features::PlayerAttributes;
use crate::sampling::SeededSampler;
use roster_normalizer::FantasyPosition;

/// Recorded in every model run manifest
pub const LABEL_VERSION: &str = "heuristic-v1";

/// Seed of the label perturbation generator
pub const LABEL_SEED: u64 = 42;

const BASE: f64 = 50.0;
const POSITION_WEIGHT: f64 = 40.0;
const NOISE_STD: f64 = 5.0;

pub fn position_multiplier(position: FantasyPosition) -> f64 {
    match position {
        FantasyPosition::QB => 1.2,
        FantasyPosition::RB => 1.1,
        FantasyPosition::WR => 1.0,
        FantasyPosition::TE => 0.9,
        FantasyPosition::K => 0.6,
        FantasyPosition::DEF | FantasyPosition::DST => 0.7,
    }
}

/// Rises through the first seven seasons, then erodes one point a year
pub fn experience_bonus(years_exp: f64) -> f64 {
    if years_exp < 3.0 {
        years_exp * 5.0
    } else if years_exp <= 7.0 {
        15.0 + (years_exp - 3.0) * 2.0
    } else {
        23.0 - (years_exp - 7.0)
    }
}

pub fn age_penalty(age: f64) -> f64 {
    if age > 30.0 {
        -2.0 * (age - 30.0)
    } else {
        0.0
    }
}

pub fn depth_bonus(depth: f64) -> f64 {
    if depth == 1.0 {
        20.0
    } else if depth == 2.0 {
        5.0
    } else {
        0.0
    }
}

/// Noise-free part of the label
pub fn base_score(attributes: &PlayerAttributes) -> f64 {
    BASE + POSITION_WEIGHT * position_multiplier(attributes.position)
        + experience_bonus(attributes.years_exp)
        + age_penalty(attributes.age)
        + depth_bonus(attributes.depth)
}

/// Draws one perturbation per record, in call order
pub struct SyntheticLabeler {
    noise: SeededSampler,
}

impl SyntheticLabeler {
    pub fn new(seed: u64) -> Self {
        Self { noise: SeededSampler::new(seed) }
    }

    /// Label in [0, 100]
    pub fn label(&mut self, attributes: &PlayerAttributes) -> f64 {
        let score = base_score(attributes) + self.noise.normal(0.0, NOISE_STD);
        score.clamp(0.0, 100.0)
    }
}
