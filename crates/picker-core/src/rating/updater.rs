use super::env::RatingEnv;
use super::gaussian::{v_draw, v_win, w_draw, w_win};
use crate::model::{Belief, Verdict};

/// Applies one moment-matching step for a single two-item comparison.
///
/// The update is deterministic and never widens a belief: every returned sigma
/// lies in `[sigma_floor, sigma]` of the corresponding input.
#[derive(Debug, Clone, Copy)]
pub struct BeliefUpdater {
    env: RatingEnv,
}

impl BeliefUpdater {
    pub const fn new(env: RatingEnv) -> Self {
        Self { env }
    }

    pub fn update(&self, left: Belief, right: Belief, verdict: Verdict) -> (Belief, Belief) {
        match verdict {
            Verdict::LeftWins => self.decisive(left, right),
            Verdict::RightWins => {
                let (right, left) = self.decisive(right, left);
                (left, right)
            }
            Verdict::Draw => self.drawn(left, right),
        }
    }

    fn decisive(&self, winner: Belief, loser: Belief) -> (Belief, Belief) {
        let winner = winner.clamped(self.env.sigma_floor);
        let loser = loser.clamped(self.env.sigma_floor);
        let c2 = self.env.difference_variance(winner, loser);
        let c = c2.sqrt();
        let t = (winner.mu - loser.mu) / c;
        let e = self.env.draw_margin() / c;

        let v = v_win(t, e);
        let w = w_win(t, e);
        (
            self.revise(winner, v / c, w / c2),
            self.revise(loser, -v / c, w / c2),
        )
    }

    fn drawn(&self, left: Belief, right: Belief) -> (Belief, Belief) {
        let left = left.clamped(self.env.sigma_floor);
        let right = right.clamped(self.env.sigma_floor);
        let c2 = self.env.difference_variance(left, right);
        let c = c2.sqrt();
        let t = (left.mu - right.mu) / c;
        let e = self.env.draw_margin() / c;

        let v = v_draw(t, e);
        let w = w_draw(t, e);
        (
            self.revise(left, v / c, w / c2),
            self.revise(right, -v / c, w / c2),
        )
    }

    /// `shift` and `shrink` are the per-unit-variance mean and variance factors.
    fn revise(&self, belief: Belief, shift: f64, shrink: f64) -> Belief {
        let variance = belief.variance();
        let mu = belief.mu + variance * shift;
        let retained = (1.0 - variance * shrink).max(0.0);
        let sigma = (belief.sigma * retained.sqrt())
            .max(self.env.sigma_floor)
            .min(belief.sigma);
        Belief::new(mu, sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, tol: f64) -> bool {
        (actual - expected).abs() <= tol
    }

    fn updater() -> BeliefUpdater {
        BeliefUpdater::new(RatingEnv::default())
    }

    #[test]
    fn fresh_win_matches_reference_update() {
        let prior = RatingEnv::default().prior();
        let (winner, loser) = updater().update(prior, prior, Verdict::LeftWins);
        assert!(close(winner.mu, 29.395_575_650_817_9, 1e-6));
        assert!(close(loser.mu, 20.604_424_349_182_1, 1e-6));
        assert!(close(winner.sigma, 7.171_141_464_453_26, 1e-6));
        assert!(close(loser.sigma, winner.sigma, 1e-12));
    }

    #[test]
    fn right_win_mirrors_left_win() {
        let a = Belief::new(28.0, 6.0);
        let b = Belief::new(22.0, 4.0);
        let (b_won, a_lost) = updater().update(b, a, Verdict::LeftWins);
        let (a_lost_r, b_won_r) = updater().update(a, b, Verdict::RightWins);
        assert_eq!(b_won, b_won_r);
        assert_eq!(a_lost, a_lost_r);
    }

    #[test]
    fn fresh_draw_shrinks_without_moving_means() {
        let prior = RatingEnv::default().prior();
        let (a, b) = updater().update(prior, prior, Verdict::Draw);
        assert!(close(a.mu, 25.0, 1e-12) && close(b.mu, 25.0, 1e-12));
        assert!(close(a.sigma, 6.457_235_982_156_57, 1e-6));
        assert!(close(b.sigma, a.sigma, 1e-12));
    }

    #[test]
    fn draw_pulls_means_together() {
        let (a, b) = updater().update(
            Belief::new(30.0, 25.0 / 3.0),
            Belief::new(20.0, 25.0 / 3.0),
            Verdict::Draw,
        );
        assert!(close(a.mu, 26.004_208_590_249_6, 1e-6));
        assert!(close(b.mu, 23.995_791_409_750_4, 1e-6));
        assert!(a.sigma < 25.0 / 3.0 && b.sigma < 25.0 / 3.0);
    }

    #[test]
    fn upsets_move_means_further_than_confirmations() {
        let favourite = Belief::new(30.0, 25.0 / 3.0);
        let underdog = Belief::new(20.0, 25.0 / 3.0);
        let (fav_up, dog_down) = updater().update(favourite, underdog, Verdict::LeftWins);
        let (fav_down, dog_up) = updater().update(favourite, underdog, Verdict::RightWins);

        let confirm_fav = (fav_up.mu - favourite.mu).abs();
        let confirm_dog = (dog_down.mu - underdog.mu).abs();
        let upset_fav = (fav_down.mu - favourite.mu).abs();
        let upset_dog = (dog_up.mu - underdog.mu).abs();
        assert!(upset_fav > confirm_fav);
        assert!(upset_dog > confirm_dog);
        assert!(fav_down.sigma < fav_up.sigma, "upsets are more informative");
    }

    #[test]
    fn sigma_never_grows() {
        let env = RatingEnv::default();
        let updater = BeliefUpdater::new(env);
        let beliefs = [
            Belief::new(25.0, 25.0 / 3.0),
            Belief::new(40.0, 0.5),
            Belief::new(-10.0, 12.0),
            Belief::new(25.0, 1e-9),
            Belief::new(1e4, 3.0),
        ];
        for a in beliefs {
            for b in beliefs {
                for verdict in Verdict::ALL {
                    let (a2, b2) = updater.update(a, b, verdict);
                    assert!(a2.sigma <= a.sigma.max(env.sigma_floor), "{a:?} {b:?} {verdict:?}");
                    assert!(b2.sigma <= b.sigma.max(env.sigma_floor), "{a:?} {b:?} {verdict:?}");
                    assert!(a2.sigma >= env.sigma_floor && b2.sigma >= env.sigma_floor);
                    assert!(a2.mu.is_finite() && b2.mu.is_finite());
                }
            }
        }
    }

    #[test]
    fn floor_level_beliefs_stay_at_the_floor() {
        let env = RatingEnv::default();
        let pinned = Belief::new(25.0, env.sigma_floor);
        for verdict in Verdict::ALL {
            let (a, b) = BeliefUpdater::new(env).update(pinned, pinned, verdict);
            assert_eq!(a.sigma, env.sigma_floor);
            assert_eq!(b.sigma, env.sigma_floor);
        }
    }

    #[test]
    fn update_is_deterministic() {
        let a = Belief::new(26.5, 3.2);
        let b = Belief::new(24.1, 7.9);
        for verdict in Verdict::ALL {
            assert_eq!(updater().update(a, b, verdict), updater().update(a, b, verdict));
        }
    }
}
