//! # zdd-rs: Top-Down Zero-Suppressed Decision Diagrams
//!
//! **`zdd-rs`** builds and canonicalizes **Zero-suppressed Decision
//! Diagrams (ZDDs)** — compact DAG representations of large families of
//! finite sets over an ordered variable universe — with a top-down,
//! level-synchronous construction algorithm driven by pluggable per-edge
//! transition automata. It is the substrate for combinatorial enumeration
//! engines: counting and generating constraint-satisfying subsets, simple
//! paths, cycles, and the like.
//!
//! ## How it works
//!
//! A fresh [`Zdd`][crate::zdd::Zdd] of width `n` represents *every* one of
//! the `2^n` subsets. Each [`subset`][crate::zdd::Zdd::subset] run
//! intersects the current family with the language accepted by an
//! [`Automaton`][crate::automaton::Automaton]: the engine walks the
//! diagram level by level, cloning the automaton wherever branches fork
//! and merging states that compare equal, so the working set never exceeds
//! one level's frontier. [`reduce`][crate::zdd::Zdd::reduce] then
//! canonicalizes the result in place (zero-suppression plus per-level
//! deduplication), after which counting, bottom-up folds and solution
//! enumeration are cheap.
//!
//! ## Quick Start
//!
//! ```rust
//! use zdd_rs::automaton::{Automaton, Descent};
//! use zdd_rs::utils::MyHash;
//! use zdd_rs::zdd::Zdd;
//!
//! // Keep only the sets that select at most one variable.
//! #[derive(Debug, Clone, Eq, PartialEq)]
//! struct AtMostOne {
//!     chosen: bool,
//! }
//!
//! impl MyHash for AtMostOne {
//!     fn hash(&self) -> u64 {
//!         self.chosen as u64
//!     }
//! }
//!
//! impl Automaton for AtMostOne {
//!     fn down(&mut self, take: bool, _from: usize, to: usize) -> Descent {
//!         if take {
//!             if self.chosen {
//!                 return Descent::Reject;
//!             }
//!             self.chosen = true;
//!         }
//!         Descent::Resume(to)
//!     }
//! }
//!
//! let mut zdd = Zdd::new(3); // all 8 subsets of {0, 1, 2}
//! zdd.subset(&AtMostOne { chosen: false });
//! zdd.reduce();
//!
//! assert_eq!(zdd.path_count(), 4.0); // {}, {0}, {1}, {2}
//! let sets: Vec<_> = zdd.solutions().collect();
//! assert_eq!(sets.len(), 4);
//! ```
//!
//! ## Core Components
//!
//! - **[`zdd`]**: the diagram engine — construction, reduction, folds,
//!   size and count queries, consistency self-check.
//! - **[`automaton`]**: the transition contract plus the
//!   [`And`][crate::automaton::And] product and the
//!   [`PassThrough`][crate::automaton::PassThrough] identity automaton.
//! - **[`eval`]**: bottom-up fold contract and the built-in counters
//!   (including exact counting via `num-bigint`).
//! - **[`iter`]**: depth-first solution enumeration.
//! - **[`dot`]**: Graphviz visualization.
//!
//! The supporting layers — [`arena`] (per-level bulk storage), [`table`]
//! (pre-sized open-addressing hash table) and [`utils`] (delegated
//! hashing) — bound peak memory to the construction frontier and fail
//! loudly on provisioning mistakes instead of resizing behind your back.

pub mod arena;
pub mod automaton;
pub mod dot;
pub mod eval;
pub mod iter;
pub mod node;
pub mod table;
pub mod utils;
pub mod zdd;
