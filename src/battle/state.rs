use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Phase of the battle state machine. Exactly one is active per tick.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    Start,
    FirstAttack,
    Menu,
    Animation,
    Escape,
    Lose,
    Result,
    End,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        self == BattlePhase::End
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Escaped,
}

#[derive(Debug, Clone)]
enum RngSource {
    Seeded(StdRng),
    /// Replays a fixed list of raw draws, cycling when exhausted.
    Scripted { outcomes: Vec<u32>, index: usize },
}

/// The single source of randomness for a battle.
///
/// Every draw carries a reason string so a replay can be traced draw by draw
/// with `RUST_LOG=trace`.
#[derive(Debug, Clone)]
pub struct BattleRng {
    source: RngSource,
}

impl BattleRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_os() -> Self {
        Self {
            source: RngSource::Seeded(StdRng::from_os_rng()),
        }
    }

    /// Scripted draws for tests. Each raw value is reduced modulo the range
    /// of the draw that consumes it.
    pub fn new_for_test(outcomes: Vec<u32>) -> Self {
        assert!(!outcomes.is_empty(), "scripted BattleRng needs at least one outcome");
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    /// Uniform integer in `[0, n)`. `n == 0` yields 0 without drawing.
    pub fn below(&mut self, n: u32, reason: &str) -> u32 {
        if n == 0 {
            return 0;
        }
        let value = match &mut self.source {
            RngSource::Seeded(rng) => rng.random_range(0..n),
            RngSource::Scripted { outcomes, index } => {
                let raw = outcomes[*index % outcomes.len()];
                *index += 1;
                raw % n
            }
        };
        trace!(value, n, reason, "rng draw");
        value
    }

    /// Uniform integer in `[0, 100)`.
    pub fn percent(&mut self, reason: &str) -> i32 {
        self.below(100, reason) as i32
    }

    /// Uniform value in `[0, 1)` with a resolution of 1/10000.
    pub fn unit(&mut self, reason: &str) -> f64 {
        self.below(10_000, reason) as f64 / 10_000.0
    }

    /// Uniform index into a list of `len` elements.
    pub fn pick(&mut self, len: usize, reason: &str) -> usize {
        self.below(len as u32, reason) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scripted_draws_cycle() {
        let mut rng = BattleRng::new_for_test(vec![7, 150]);

        assert_eq!(rng.percent("a"), 7);
        assert_eq!(rng.percent("b"), 50);
        assert_eq!(rng.below(5, "c"), 2);
        assert_eq!(rng.unit("d"), 0.015);
    }

    #[test]
    fn test_seeded_rng_is_replayable() {
        let mut first = BattleRng::seeded(42);
        let mut second = BattleRng::seeded(42);

        let a: Vec<u32> = (0..20).map(|_| first.below(1000, "replay")).collect();
        let b: Vec<u32> = (0..20).map(|_| second.below(1000, "replay")).collect();

        assert_eq!(a, b);
        assert!(a.iter().all(|v| *v < 1000));
    }

    #[test]
    fn test_empty_range_does_not_consume() {
        let mut rng = BattleRng::new_for_test(vec![3, 4]);

        assert_eq!(rng.below(0, "empty"), 0);
        assert_eq!(rng.below(10, "next"), 3);
    }
}
