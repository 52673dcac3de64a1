//! Bottom-up folds over a diagram.
//!
//! A fold visits every stored node strictly bottom-up, combining the
//! values of its two successors into the node's own value; the seed values
//! belong to the two terminals. One traversal shape covers path counting,
//! dead-node detection and interval propagation alike.

use num_bigint::BigUint;

/// Fold contract consumed by [`Zdd::evaluate`][crate::zdd::Zdd::evaluate].
///
/// `value` receives each successor's variable index (with `num_vars`
/// standing in for terminals) next to its value, plus the node's own
/// index, and may mutate the evaluator to accumulate statistics.
pub trait Eval {
    type Value: Clone;

    /// Seed value of the rejecting terminal.
    fn value0(&self) -> Self::Value;

    /// Seed value of the accepting terminal.
    fn value1(&self) -> Self::Value;

    /// Combine the successor values into the node's value.
    fn value(
        &mut self,
        index0: usize,
        v0: &Self::Value,
        index1: usize,
        v1: &Self::Value,
        index: usize,
    ) -> Self::Value;
}

/// Counts root-to-terminal-1 paths in double precision.
///
/// Counts beyond 2^53 silently lose precision; use [`ExactPathCounter`]
/// when the exact number matters.
pub struct PathCounter;

impl Eval for PathCounter {
    type Value = f64;

    fn value0(&self) -> f64 {
        0.0
    }

    fn value1(&self) -> f64 {
        1.0
    }

    fn value(&mut self, _index0: usize, v0: &f64, _index1: usize, v1: &f64, _index: usize) -> f64 {
        v0 + v1
    }
}

/// Exact path count with arbitrary precision.
pub struct ExactPathCounter;

impl Eval for ExactPathCounter {
    type Value = BigUint;

    fn value0(&self) -> BigUint {
        BigUint::ZERO
    }

    fn value1(&self) -> BigUint {
        BigUint::from(1u32)
    }

    fn value(
        &mut self,
        _index0: usize,
        v0: &BigUint,
        _index1: usize,
        v1: &BigUint,
        _index: usize,
    ) -> BigUint {
        v0 + v1
    }
}

/// Counts nodes from which terminal-1 is unreachable.
///
/// A node is dead iff neither successor can reach the accepting terminal;
/// reduction removes every dead node.
#[derive(Debug, Default)]
pub struct DeadNodeCounter {
    count: usize,
}

impl DeadNodeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dead nodes seen by the last fold.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Eval for DeadNodeCounter {
    type Value = bool;

    fn value0(&self) -> bool {
        false
    }

    fn value1(&self) -> bool {
        true
    }

    fn value(&mut self, _index0: usize, v0: &bool, _index1: usize, v1: &bool, _index: usize) -> bool {
        if *v0 || *v1 {
            return true;
        }
        self.count += 1;
        false
    }
}
