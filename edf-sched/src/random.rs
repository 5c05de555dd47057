/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Randomness source for task timing parameters.
//!
//! The Admission Gate only needs uniformly distributed integers, so the seam
//! is a one-method trait.  [`SplitMix64`] is the production source: seeded,
//! platform independent, and replayable from the seed printed at start-up.

use crate::task::{TaskParams, Tick};

/// Supplier of uniformly distributed 32-bit integers.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;
}

// ── SplitMix64 ────────────────────────────────────────────────────────────────

/// SplitMix64 – a fast, well-distributed deterministic PRNG.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from the wall clock.  Falls back to a fixed constant if the clock
    /// is before the Unix epoch.
    pub fn from_clock() -> (Self, u64) {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5eed_5eed_5eed_5eed);
        (Self::new(seed), seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

impl RandomSource for SplitMix64 {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}

/// Replays a fixed sequence, cycling when exhausted.
#[cfg(test)]
pub(crate) struct ReplaySource {
    values: Vec<u32>,
    pos: usize,
}

#[cfg(test)]
impl ReplaySource {
    pub(crate) fn new(values: Vec<u32>) -> Self {
        Self { values, pos: 0 }
    }

    /// Source that always yields the given `(budget, period)` with the
    /// default `[5, 10]` period range.
    pub(crate) fn fixed(budget: Tick, period: Tick) -> Self {
        assert!((5..=10).contains(&period) && budget >= 1 && (budget - 1) * 4 < period);
        Self::new(vec![(period - 5) as u32, ((budget - 1) * 4) as u32])
    }
}

#[cfg(test)]
impl RandomSource for ReplaySource {
    fn next_u32(&mut self) -> u32 {
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}

// ── Parameter draw ────────────────────────────────────────────────────────────

/// Draw a period uniformly from `[period_min, period_max]` and derive the
/// budget as `1 + rand(period) / 4`.
///
/// The result is not clamped.  This formula keeps `budget <= period`, but the
/// scheduler itself accepts any [`TaskParams`], including infeasible ones.
pub fn draw_task_params<R: RandomSource + ?Sized>(
    rng: &mut R,
    period_min: Tick,
    period_max: Tick,
) -> TaskParams {
    let span = period_max.saturating_sub(period_min) + 1;
    let period = period_min + u64::from(rng.next_u32()) % span;
    let budget = 1 + (u64::from(rng.next_u32()) % period) / 4;
    TaskParams { budget, period }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SplitMix64::new(42);
        let mut b = SplitMix64::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SplitMix64::new(1);
        let mut b = SplitMix64::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn draws_stay_within_default_ranges() {
        let mut rng = SplitMix64::new(7);
        for _ in 0..10_000 {
            let p = draw_task_params(&mut rng, 5, 10);
            assert!((5..=10).contains(&p.period), "period {}", p.period);
            assert!((1..=3).contains(&p.budget), "budget {}", p.budget);
        }
    }

    #[test]
    fn every_period_in_range_is_reachable() {
        let mut rng = SplitMix64::new(99);
        let mut seen = [false; 11];
        for _ in 0..1_000 {
            seen[draw_task_params(&mut rng, 5, 10).period as usize] = true;
        }
        assert!(seen[5..=10].iter().all(|&s| s));
    }

    #[test]
    fn scripted_draw_follows_formula() {
        // period = 5 + 3 % 6 = 8; budget = 1 + (7 % 8) / 4 = 2
        let mut rng = ReplaySource::new(vec![3, 7]);
        assert_eq!(
            draw_task_params(&mut rng, 5, 10),
            TaskParams {
                budget: 2,
                period: 8
            }
        );
    }

    #[test]
    fn fixed_replay_yields_requested_params() {
        let mut rng = ReplaySource::fixed(2, 6);
        for _ in 0..3 {
            assert_eq!(
                draw_task_params(&mut rng, 5, 10),
                TaskParams {
                    budget: 2,
                    period: 6
                }
            );
        }
    }

    #[test]
    fn single_tick_period_is_fully_loaded() {
        // period fixed at 1; budget = 1 + (x % 1) / 4 = 1
        let mut rng = SplitMix64::new(3);
        let p = draw_task_params(&mut rng, 1, 1);
        assert_eq!(p.period, 1);
        assert_eq!(p.budget, 1);
    }
}
