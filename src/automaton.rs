//! The transition-automaton contract that drives top-down construction.
//!
//! An automaton is a value: it is cloned whenever a diagram branch forks,
//! merged with its equals when branches reconverge, and dropped when its
//! edge resolves. [`Zdd::subset`][crate::zdd::Zdd::subset] intersects the
//! diagram's language with the automaton's.

use crate::node::NodeRef;
use crate::utils::MyHash;
use crate::zdd::Zdd;

/// Verdict of a single transition along one edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Descent {
    /// The edge is pruned: it resolves to terminal-0.
    Reject,
    /// The automaton accepts whatever the remaining levels yield along
    /// the all-excluded completion; equivalent to `Resume(num_vars)`.
    Accept,
    /// Continue at the given level, which must be at least the proposed
    /// target level. Skipped levels are treated as excluded.
    Resume(usize),
}

/// Per-edge transition function.
///
/// `down(take, from, to)` consumes the decision for variable `from`
/// (included when `take`) and fast-forwards through `from+1..to` as
/// excluded; `to` is the level the engine proposes to land on.
///
/// States that compare equal through [`Eq`]/[`MyHash`] are merged during
/// construction, so they must be fully interchangeable for all future
/// transitions. Implementations must be side-effect-free except through
/// their own state.
pub trait Automaton: Clone + Eq + MyHash {
    fn down(&mut self, take: bool, from: usize, to: usize) -> Descent;
}

/// Transition function that additionally observes the fold value computed
/// for the edge's old target by a preceding
/// [`Zdd::eval_and_subset`][crate::zdd::Zdd::eval_and_subset] pass.
pub trait ValueAutomaton<V>: Clone + Eq + MyHash {
    fn down(&mut self, take: bool, from: usize, to: usize, value: &V) -> Descent;
}

fn resume_level(descent: Descent, num_vars: usize) -> Option<usize> {
    match descent {
        Descent::Reject => None,
        Descent::Accept => Some(num_vars),
        Descent::Resume(k) => Some(k),
    }
}

/// Product of two automata: accepts exactly the sets both accept.
///
/// The factors may want to resume at different levels; the laggard is fed
/// forced exclusions until the two agree.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct And<A, B> {
    num_vars: usize,
    a: A,
    b: B,
}

impl<A, B> And<A, B> {
    pub fn new(num_vars: usize, a: A, b: B) -> Self {
        Self { num_vars, a, b }
    }
}

impl<A: MyHash, B: MyHash> MyHash for And<A, B> {
    fn hash(&self) -> u64 {
        self.a.hash().wrapping_mul(31).wrapping_add(self.b.hash())
    }
}

impl<A: Automaton, B: Automaton> Automaton for And<A, B> {
    fn down(&mut self, take: bool, from: usize, to: usize) -> Descent {
        let n = self.num_vars;

        let Some(mut va) = resume_level(self.a.down(take, from, to), n) else {
            return Descent::Reject;
        };
        let Some(mut vb) = resume_level(self.b.down(take, from, va), n) else {
            return Descent::Reject;
        };

        while va != vb {
            if va < vb {
                match resume_level(self.a.down(false, va, vb), n) {
                    Some(v) => va = v,
                    None => return Descent::Reject,
                }
            } else {
                match resume_level(self.b.down(false, vb, va), n) {
                    Some(v) => vb = v,
                    None => return Descent::Reject,
                }
            }
        }

        Descent::Resume(va)
    }
}

/// Identity automaton over an existing diagram: running `subset` with it
/// rebuilds the source's language, so diagram copy funnels through the one
/// audited construction path.
#[derive(Debug, Copy, Clone)]
pub struct PassThrough<'a> {
    src: &'a Zdd,
    f: NodeRef,
}

impl<'a> PassThrough<'a> {
    pub fn new(src: &'a Zdd) -> Self {
        Self { src, f: src.top() }
    }
}

impl PartialEq for PassThrough<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}

impl Eq for PassThrough<'_> {}

impl MyHash for PassThrough<'_> {
    fn hash(&self) -> u64 {
        MyHash::hash(&self.f)
    }
}

impl Automaton for PassThrough<'_> {
    fn down(&mut self, take: bool, from: usize, to: usize) -> Descent {
        let num_vars = self.src.num_vars();
        debug_assert!(from <= self.f.index_or(num_vars));

        if from == self.f.index_or(num_vars) {
            let node = self.src.node(self.f);
            self.f = if take { node.succ1 } else { node.succ0 };
        } else if take {
            // the source has no node here, so the variable is excluded
            return Descent::Reject;
        }

        self.f = self.src.skip_chain(self.f, to);

        if self.f == NodeRef::ZERO {
            return Descent::Reject;
        }
        Descent::Resume(self.f.index_or(num_vars))
    }
}
