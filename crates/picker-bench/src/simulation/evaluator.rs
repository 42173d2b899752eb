use picker_core::Outcome;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::RunnerError;
use crate::config::EvaluatorConfig;

/// Stand-in for the person clicking through pairs.
///
/// Each side is perceived as its true appeal plus independent Gaussian noise;
/// perceived gaps within `draw_threshold` are answered as a draw.
#[derive(Debug, Clone)]
pub struct SimulatedEvaluator {
    noise: Normal<f64>,
    draw_threshold: f64,
    skip_rate: f64,
}

impl SimulatedEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Result<Self, RunnerError> {
        let noise = Normal::new(0.0, config.noise).map_err(|err| RunnerError::Simulation {
            message: format!("evaluator noise: {err}"),
        })?;
        Ok(Self {
            noise,
            draw_threshold: config.draw_threshold,
            skip_rate: config.skip_rate,
        })
    }

    /// Every call consumes the same amount of randomness, whatever the answer.
    pub fn judge<R: Rng + ?Sized>(&self, left_appeal: f64, right_appeal: f64, rng: &mut R) -> Outcome {
        let skipped = rng.gen_bool(self.skip_rate);
        let left = left_appeal + self.noise.sample(rng);
        let right = right_appeal + self.noise.sample(rng);
        if skipped {
            return Outcome::Skip;
        }

        let gap = left - right;
        if gap.abs() <= self.draw_threshold {
            Outcome::Draw
        } else if gap > 0.0 {
            Outcome::LeftWins
        } else {
            Outcome::RightWins
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn evaluator(noise: f64, draw_threshold: f64, skip_rate: f64) -> SimulatedEvaluator {
        SimulatedEvaluator::new(&EvaluatorConfig {
            noise,
            draw_threshold,
            skip_rate,
        })
        .unwrap()
    }

    #[test]
    fn noiseless_evaluator_follows_appeal() {
        let judge = evaluator(0.0, 0.5, 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(judge.judge(30.0, 20.0, &mut rng), Outcome::LeftWins);
        assert_eq!(judge.judge(20.0, 30.0, &mut rng), Outcome::RightWins);
        assert_eq!(judge.judge(25.0, 25.3, &mut rng), Outcome::Draw);
    }

    #[test]
    fn always_skips_at_full_rate() {
        let judge = evaluator(1.0, 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..20 {
            assert_eq!(judge.judge(40.0, 10.0, &mut rng), Outcome::Skip);
        }
    }

    #[test]
    fn noise_produces_occasional_upsets() {
        let judge = evaluator(3.0, 0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let upsets = (0..2_000)
            .filter(|_| judge.judge(26.0, 25.0, &mut rng) == Outcome::RightWins)
            .count();
        assert!(upsets > 200 && upsets < 1_000, "{upsets}");
    }
}
