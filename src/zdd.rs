//! The diagram engine.
//!
//! A [`Zdd`] owns one record arena per variable level plus a top
//! reference. A fresh diagram of width `n` is the *full* diagram — one
//! node per level chained through both edges, encoding all `2^n` subsets —
//! and every later shape is carved out of it by [`subset`][Zdd::subset]
//! runs with consumer-supplied automata, then canonicalized by
//! [`reduce`][Zdd::reduce].
//!
//! Construction is level-synchronous and top-down: candidates for the next
//! levels carry cloned automaton states and are deduplicated per level by
//! state equality before they are expanded, so peak memory follows the
//! frontier width rather than the diagram size. Each retired level's
//! arena and candidate buffers are released wholesale.

use std::fmt;
use std::mem;

use log::{debug, warn};
use num_bigint::BigUint;

use crate::arena::Arena;
use crate::automaton::{Automaton, Descent, PassThrough, ValueAutomaton};
use crate::eval::{DeadNodeCounter, Eval, ExactPathCounter, PathCounter};
use crate::node::{Node, NodeRef};
use crate::table::ProbeTable;
use crate::utils::MyHash;

pub struct Zdd {
    num_vars: usize,
    levels: Vec<Arena<Node>>,
    top: NodeRef,
}

impl Zdd {
    /// Create the full diagram over `num_vars` variables.
    pub fn new(num_vars: usize) -> Self {
        let mut zdd = Zdd {
            num_vars: 0,
            levels: Vec::new(),
            top: NodeRef::ONE,
        };
        zdd.initialize(num_vars);
        zdd
    }

    /// Reset to the full diagram of the given width: one node per level,
    /// both edges to the next level, representing every subset.
    pub fn initialize(&mut self, num_vars: usize) {
        self.num_vars = num_vars;
        self.levels = (0..num_vars).map(|_| Arena::new()).collect();

        let mut succ = NodeRef::ONE;
        for i in (0..num_vars).rev() {
            let slot = self.levels[i].alloc(Node { succ0: succ, succ1: succ });
            succ = NodeRef::new(i, slot);
        }
        self.top = succ;
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn top(&self) -> NodeRef {
        self.top
    }

    /// Record of a non-terminal node.
    pub fn node(&self, r: NodeRef) -> Node {
        assert!(!r.is_terminal(), "Terminal handles have no record");
        self.levels[r.level()][r.slot()]
    }

    /// Number of nodes stored at the given level.
    pub fn level_size(&self, level: usize) -> usize {
        self.levels[level].len()
    }

    /// Total number of stored (non-terminal) nodes.
    pub fn size(&self) -> usize {
        self.levels.iter().map(Arena::len).sum()
    }

    /// Follow 0-edges from `r` until a level at or below `to` (or a
    /// terminal) is reached.
    pub(crate) fn skip_chain(&self, mut r: NodeRef, to: usize) -> NodeRef {
        while r.level() < to {
            r = self.levels[r.level()][r.slot()].succ0;
        }
        r
    }
}

impl fmt::Debug for Zdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zdd")
            .field("num_vars", &self.num_vars)
            .field("size", &self.size())
            .field("top", &self.top)
            .finish()
    }
}

/// Where a resolved node identity must be written back: the diagram's top
/// slot or one successor slot of an already-placed node.
#[derive(Debug, Copy, Clone)]
enum BackRef {
    Top,
    Succ { level: usize, slot: u32, take: bool },
}

/// A node under construction: the automaton state it carries and the slot
/// to patch once the node's identity is resolved.
struct Candidate<S> {
    state: S,
    backref: BackRef,
}

struct SubsetPass<'a, S, D> {
    num_vars: usize,
    levels: &'a mut Vec<Arena<Node>>,
    top: &'a mut NodeRef,
    /// Per level, per old node: the candidates routed onto that node.
    pending: Vec<Vec<Vec<Candidate<S>>>>,
    /// Nodes built for the level currently being processed.
    fresh: Arena<Node>,
    /// Level currently being processed.
    level: usize,
    down: D,
}

impl<S, D> SubsetPass<'_, S, D>
where
    S: Clone + Eq + MyHash,
    D: FnMut(&mut S, bool, usize, NodeRef) -> Descent,
{
    fn run(mut self, seed: &S) {
        let top = *self.top;
        if top.level() == 0 {
            self.pending[0][top.slot()].push(Candidate {
                state: seed.clone(),
                backref: BackRef::Top,
            });
        } else {
            // levels above the top hold no nodes, so they are excluded
            self.edge(seed.clone(), false, 0, top, BackRef::Top);
        }

        for i in 0..self.num_vars {
            self.level = i;
            let old = mem::take(&mut self.levels[i]);
            let buckets = mem::take(&mut self.pending[i]);
            debug_assert!(self.fresh.is_empty());

            for (slot, bucket) in buckets.into_iter().enumerate() {
                if bucket.is_empty() {
                    continue;
                }
                let old_node = old[slot];

                if bucket.len() == 1 {
                    for Candidate { state, backref } in bucket {
                        let new_slot = self.fresh.alloc(Node {
                            // both slots are written before the level completes
                            succ0: NodeRef::ZERO,
                            succ1: NodeRef::ZERO,
                        });
                        self.patch(backref, NodeRef::new(i, new_slot));
                        self.expand(state, old_node, new_slot);
                    }
                    continue;
                }

                // merge equal states before expanding
                let mut canon = Vec::with_capacity(bucket.len());
                {
                    let mut uniq = ProbeTable::with_capacity(bucket.len());
                    for (ci, cand) in bucket.iter().enumerate() {
                        canon.push(uniq.put(&cand.state, ci as u32) as usize);
                    }
                }

                let mut slots = vec![0u32; bucket.len()];
                for (ci, &c) in canon.iter().enumerate() {
                    if c == ci {
                        slots[ci] = self.fresh.alloc(Node {
                            succ0: NodeRef::ZERO,
                            succ1: NodeRef::ZERO,
                        });
                    }
                }
                for (ci, cand) in bucket.iter().enumerate() {
                    self.patch(cand.backref, NodeRef::new(i, slots[canon[ci]]));
                }
                for (ci, Candidate { state, .. }) in bucket.into_iter().enumerate() {
                    if canon[ci] == ci {
                        self.expand(state, old_node, slots[ci]);
                    }
                    // merged duplicates drop their state here
                }
            }

            self.levels[i].splice(&mut self.fresh);
            debug!("subset: level {}: {} -> {} nodes", i, old.len(), self.levels[i].len());
            // the retired frontier (`old`) and its buckets die here
        }
    }

    /// Materialize the successors of the node just placed at `slot`,
    /// consuming its automaton state.
    fn expand(&mut self, state: S, old: Node, slot: u32) {
        let i = self.level;
        if old.succ0 == NodeRef::ZERO {
            self.fresh[slot as usize].succ0 = NodeRef::ZERO;
            if old.succ1 == NodeRef::ZERO {
                // both edges were already pruned; the automaton is not consulted
                self.fresh[slot as usize].succ1 = NodeRef::ZERO;
                return;
            }
            self.edge(state, true, i, old.succ1, BackRef::Succ { level: i, slot, take: true });
        } else if old.succ1 == NodeRef::ZERO {
            self.fresh[slot as usize].succ1 = NodeRef::ZERO;
            self.edge(state, false, i, old.succ0, BackRef::Succ { level: i, slot, take: false });
        } else {
            // the two branches evolve independently from here on
            let branch = state.clone();
            self.edge(state, false, i, old.succ0, BackRef::Succ { level: i, slot, take: false });
            self.edge(branch, true, i, old.succ1, BackRef::Succ { level: i, slot, take: true });
        }
    }

    /// Route one edge: consult the automaton, walk the old diagram's
    /// 0-chain to the resume level, and either settle the edge on a
    /// terminal or queue a candidate for the reached level.
    fn edge(&mut self, mut state: S, take: bool, from: usize, old_child: NodeRef, dest: BackRef) {
        let resume = match (self.down)(&mut state, take, from, old_child) {
            Descent::Reject => {
                self.write_edge(dest, NodeRef::ZERO);
                return;
            }
            Descent::Accept => self.num_vars,
            Descent::Resume(k) => k,
        };

        let mut target = old_child;
        while target.level() < resume {
            target = self.levels[target.level()][target.slot()].succ0;
        }

        if target.is_terminal() {
            self.write_edge(dest, target);
        } else {
            self.pending[target.level()][target.slot()].push(Candidate { state, backref: dest });
        }
    }

    /// Settle an edge during expansion; the destination node, if any, is
    /// still in the fresh arena.
    fn write_edge(&mut self, dest: BackRef, target: NodeRef) {
        match dest {
            BackRef::Top => *self.top = target,
            BackRef::Succ { level, slot, take } => {
                debug_assert_eq!(level, self.level);
                let node = &mut self.fresh[slot as usize];
                if take {
                    node.succ1 = target;
                } else {
                    node.succ0 = target;
                }
            }
        }
    }

    /// Patch a resolved identity into its predecessor, which was finalized
    /// when its own (strictly shallower) level was processed.
    fn patch(&mut self, backref: BackRef, target: NodeRef) {
        match backref {
            BackRef::Top => *self.top = target,
            BackRef::Succ { level, slot, take } => {
                debug_assert!(level < self.level);
                let node = &mut self.levels[level][slot as usize];
                if take {
                    node.succ1 = target;
                } else {
                    node.succ0 = target;
                }
            }
        }
    }
}

impl Zdd {
    /// Intersect the diagram with the language accepted by `automaton`.
    ///
    /// The result is generally unreduced; call [`reduce`][Zdd::reduce] to
    /// canonicalize it.
    pub fn subset<A: Automaton>(&mut self, automaton: &A) {
        let num_vars = self.num_vars;
        self.do_subset(automaton, move |state: &mut A, take, from, child: NodeRef| {
            state.down(take, from, child.index_or(num_vars))
        });
    }

    /// Fold with `eval`, then run a construction pass in which every
    /// transition observes the fold value of the edge's old target.
    /// Returns the fold's value at the top of the pre-construction
    /// diagram.
    pub fn eval_and_subset<E, A>(&mut self, eval: &mut E, automaton: &A) -> E::Value
    where
        E: Eval,
        A: ValueAutomaton<E::Value>,
    {
        let num_vars = self.num_vars;
        let (vals, v0, v1) = self.run_fold(eval);
        let result = match self.top {
            NodeRef::ZERO => v0.clone(),
            NodeRef::ONE => v1.clone(),
            r => vals[r.level()][r.slot()].clone(),
        };
        self.do_subset(automaton, move |state: &mut A, take, from, child: NodeRef| {
            let value = match child {
                NodeRef::ZERO => &v0,
                NodeRef::ONE => &v1,
                r => &vals[r.level()][r.slot()],
            };
            state.down(take, from, child.index_or(num_vars), value)
        });
        result
    }

    fn do_subset<S, D>(&mut self, seed: &S, down: D)
    where
        S: Clone + Eq + MyHash,
        D: FnMut(&mut S, bool, usize, NodeRef) -> Descent,
    {
        // a wholly terminal diagram has nothing to intersect
        if self.top.is_terminal() {
            return;
        }
        let pending: Vec<Vec<Vec<Candidate<S>>>> = self
            .levels
            .iter()
            .map(|level| (0..level.len()).map(|_| Vec::new()).collect())
            .collect();
        SubsetPass {
            num_vars: self.num_vars,
            levels: &mut self.levels,
            top: &mut self.top,
            pending,
            fresh: Arena::new(),
            level: 0,
            down,
        }
        .run(seed);
    }

    /// Canonicalize in place: substitute finalized successor identities
    /// bottom-up, drop nodes made redundant by zero-suppression, and merge
    /// duplicate `(succ0, succ1)` pairs per level.
    pub fn reduce(&mut self) {
        fn resolve(finals: &[Vec<NodeRef>], r: NodeRef) -> NodeRef {
            if r.is_terminal() {
                r
            } else {
                finals[r.level()][r.slot()]
            }
        }

        let mut finals: Vec<Vec<NodeRef>> = vec![Vec::new(); self.num_vars];
        let mut uniq: ProbeTable<Node, u32> = ProbeTable::new();

        for i in (0..self.num_vars).rev() {
            let old = mem::take(&mut self.levels[i]);
            if old.is_empty() {
                continue;
            }
            uniq.initialize(old.len());
            let mut keep = Arena::new();
            let mut fin = Vec::with_capacity(old.len());

            for node in old.iter() {
                let succ1 = resolve(&finals, node.succ1);
                if succ1 == NodeRef::ZERO {
                    // redundant under zero-suppression: the node stands for
                    // its 0-successor everywhere
                    fin.push(resolve(&finals, node.succ0));
                    continue;
                }
                let canonical = Node { succ0: resolve(&finals, node.succ0), succ1 };
                let next = keep.len() as u32;
                let slot = uniq.put(canonical, next);
                if slot == next {
                    keep.alloc(canonical);
                }
                fin.push(NodeRef::new(i, slot));
            }

            finals[i] = fin;
            debug!("reduce: level {}: {} -> {} nodes", i, old.len(), keep.len());
            self.levels[i].splice(&mut keep);
            // the superseded level (`old`) is released wholesale here
        }

        self.top = resolve(&finals, self.top);
    }

    /// Fold the diagram bottom-up with `eval` and return the top's value.
    pub fn evaluate<E: Eval>(&self, eval: &mut E) -> E::Value {
        let (vals, v0, v1) = self.run_fold(eval);
        match self.top {
            NodeRef::ZERO => v0,
            NodeRef::ONE => v1,
            r => vals[r.level()][r.slot()].clone(),
        }
    }

    fn run_fold<E: Eval>(&self, eval: &mut E) -> (Vec<Vec<E::Value>>, E::Value, E::Value) {
        let num_vars = self.num_vars;
        let v0 = eval.value0();
        let v1 = eval.value1();

        let mut vals: Vec<Vec<E::Value>> = Vec::with_capacity(num_vars);
        vals.resize_with(num_vars, Vec::new);

        for i in (0..num_vars).rev() {
            let level_vals: Vec<E::Value> = self.levels[i]
                .iter()
                .map(|node| {
                    let (i0, a) = Self::child_value(&vals, &v0, &v1, node.succ0, num_vars);
                    let (i1, b) = Self::child_value(&vals, &v0, &v1, node.succ1, num_vars);
                    eval.value(i0, a, i1, b, i)
                })
                .collect();
            vals[i] = level_vals;
        }

        (vals, v0, v1)
    }

    fn child_value<'v, V>(
        vals: &'v [Vec<V>],
        v0: &'v V,
        v1: &'v V,
        r: NodeRef,
        num_vars: usize,
    ) -> (usize, &'v V) {
        match r {
            NodeRef::ZERO => (num_vars, v0),
            NodeRef::ONE => (num_vars, v1),
            r => (r.level(), &vals[r.level()][r.slot()]),
        }
    }

    /// Number of stored nodes from which terminal-1 is unreachable.
    pub fn dead_size(&self) -> usize {
        let mut counter = DeadNodeCounter::new();
        self.evaluate(&mut counter);
        counter.count()
    }

    /// Number of root-to-terminal-1 paths, in double precision.
    pub fn path_count(&self) -> f64 {
        self.evaluate(&mut PathCounter)
    }

    /// Exact number of root-to-terminal-1 paths.
    pub fn path_count_exact(&self) -> BigUint {
        self.evaluate(&mut ExactPathCounter)
    }

    /// Diagnostic consistency check: every node reachable from the top
    /// must be a valid entry of its level, and every stored node must be
    /// reachable from the top. Findings are returned (and logged as
    /// warnings); an empty result means the diagram is consistent. Never
    /// fatal, never used on the hot path.
    pub fn self_test(&self) -> Vec<String> {
        fn valid(zdd: &Zdd, findings: &mut Vec<String>, from: Option<usize>, r: NodeRef) -> bool {
            if r.is_terminal() {
                return false;
            }
            if r.level() >= zdd.num_vars || r.slot() >= zdd.levels[r.level()].len() {
                findings.push(format!("dangling reference {} from level {:?}", r, from));
                return false;
            }
            if let Some(parent) = from {
                if r.level() <= parent {
                    findings.push(format!("level order violated: {} referenced from level {}", r, parent));
                    return false;
                }
            }
            true
        }

        let mut findings = Vec::new();
        let mut marks: Vec<Vec<bool>> = self.levels.iter().map(|level| vec![false; level.len()]).collect();

        let mut stack = Vec::new();
        if valid(self, &mut findings, None, self.top) {
            stack.push(self.top);
        }
        while let Some(r) = stack.pop() {
            if mem::replace(&mut marks[r.level()][r.slot()], true) {
                continue;
            }
            let node = self.node(r);
            for succ in [node.succ0, node.succ1] {
                if valid(self, &mut findings, Some(r.level()), succ) {
                    stack.push(succ);
                }
            }
        }

        for (i, level_marks) in marks.iter().enumerate() {
            for (slot, marked) in level_marks.iter().enumerate() {
                if !marked {
                    findings.push(format!(
                        "node {} is stored but unreachable from the top",
                        NodeRef::new(i, slot as u32)
                    ));
                }
            }
        }

        for finding in &findings {
            warn!("self_test: {}", finding);
        }
        findings
    }
}

impl Clone for Zdd {
    /// Copying funnels through the construction path: a fresh full diagram
    /// filtered by the pass-through automaton, then reduced.
    fn clone(&self) -> Self {
        let mut copy = Zdd::new(self.num_vars);
        copy.subset(&PassThrough::new(self));
        copy.reduce();
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use test_log::test;

    use crate::automaton::And;

    /// Accepts sets where membership of variables `a` and `b` agrees.
    #[derive(Debug, Clone, Eq, PartialEq)]
    struct AgreeTwo {
        a: usize,
        b: usize,
        seen: Option<bool>,
    }

    impl AgreeTwo {
        fn new(a: usize, b: usize) -> Self {
            Self { a, b, seen: None }
        }

        fn apply(&mut self, var: usize, member: bool) -> bool {
            if var == self.a {
                self.seen = Some(member);
            } else if var == self.b && self.seen != Some(member) {
                return false;
            }
            true
        }
    }

    impl MyHash for AgreeTwo {
        fn hash(&self) -> u64 {
            match self.seen {
                None => 0,
                Some(false) => 1,
                Some(true) => 2,
            }
        }
    }

    impl Automaton for AgreeTwo {
        fn down(&mut self, take: bool, from: usize, to: usize) -> Descent {
            if !self.apply(from, take) {
                return Descent::Reject;
            }
            for var in from + 1..to {
                if !self.apply(var, false) {
                    return Descent::Reject;
                }
            }
            Descent::Resume(to)
        }
    }

    /// Accepts sets with at most `limit` members.
    #[derive(Debug, Clone, Eq, PartialEq)]
    struct AtMost {
        limit: usize,
        chosen: usize,
    }

    impl AtMost {
        fn new(limit: usize) -> Self {
            Self { limit, chosen: 0 }
        }
    }

    impl MyHash for AtMost {
        fn hash(&self) -> u64 {
            self.chosen as u64
        }
    }

    impl Automaton for AtMost {
        fn down(&mut self, take: bool, _from: usize, to: usize) -> Descent {
            if take {
                self.chosen += 1;
                if self.chosen > self.limit {
                    return Descent::Reject;
                }
            }
            Descent::Resume(to)
        }
    }

    /// Accepts only sets drawn from the variables below `cutoff`; jumps
    /// straight past the remaining levels once the cutoff is reached.
    #[derive(Debug, Clone, Eq, PartialEq)]
    struct Below {
        cutoff: usize,
    }

    impl MyHash for Below {
        fn hash(&self) -> u64 {
            0
        }
    }

    impl Automaton for Below {
        fn down(&mut self, take: bool, from: usize, to: usize) -> Descent {
            if take && from >= self.cutoff {
                return Descent::Reject;
            }
            if to >= self.cutoff {
                Descent::Accept
            } else {
                Descent::Resume(to)
            }
        }
    }

    fn drain(zdd: &Zdd) -> Vec<Vec<usize>> {
        zdd.solutions().collect()
    }

    fn sorted_solutions(zdd: &Zdd) -> Vec<Vec<usize>> {
        let mut all = drain(zdd);
        all.sort();
        all
    }

    /// Brute-force expectation: all subsets of `0..n` passing `accept`,
    /// sorted.
    fn expected_sets(n: usize, accept: impl Fn(&[usize]) -> bool) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        for mask in 0u32..(1 << n) {
            let set: Vec<usize> = (0..n).filter(|&v| mask & (1 << v) != 0).collect();
            if accept(&set) {
                out.push(set);
            }
        }
        out.sort();
        out
    }

    #[test]
    fn test_full_diagram() {
        let zdd = Zdd::new(3);
        assert_eq!(zdd.size(), 3);
        assert_eq!(zdd.path_count(), 8.0);
        assert_eq!(zdd.dead_size(), 0);
        assert!(zdd.self_test().is_empty());
    }

    #[test]
    fn test_empty_width() {
        let zdd = Zdd::new(0);
        assert_eq!(zdd.size(), 0);
        assert_eq!(zdd.top(), NodeRef::ONE);
        assert_eq!(zdd.path_count(), 1.0);
        assert_eq!(drain(&zdd), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_agree_scenario() {
        // keep exactly the sets where variables 0 and 2 agree
        let mut zdd = Zdd::new(3);
        zdd.subset(&AgreeTwo::new(0, 2));
        zdd.reduce();

        // canonical form: root, one level-1 node per branch of variable 0,
        // and a single level-2 node forcing variable 2 in
        assert_eq!(zdd.size(), 4);
        assert_eq!(zdd.path_count(), 4.0);
        assert_eq!(zdd.dead_size(), 0);
        assert!(zdd.self_test().is_empty());

        // 0-edge-first depth-first order
        let sets = drain(&zdd);
        assert_eq!(sets, vec![vec![], vec![1], vec![0, 2], vec![0, 1, 2]]);
    }

    #[test]
    fn test_subset_matches_brute_force() {
        let n = 5;
        let mut zdd = Zdd::new(n);
        zdd.subset(&AgreeTwo::new(1, 3));
        zdd.reduce();
        assert_eq!(
            sorted_solutions(&zdd),
            expected_sets(n, |set| set.contains(&1) == set.contains(&3))
        );

        let mut zdd = Zdd::new(n);
        zdd.subset(&AtMost::new(2));
        zdd.reduce();
        assert_eq!(sorted_solutions(&zdd), expected_sets(n, |set| set.len() <= 2));
    }

    #[test]
    fn test_chained_subsets() {
        let n = 5;
        let mut zdd = Zdd::new(n);
        zdd.subset(&AgreeTwo::new(0, 4));
        zdd.reduce();
        zdd.subset(&AtMost::new(2));
        zdd.reduce();
        assert_eq!(
            sorted_solutions(&zdd),
            expected_sets(n, |set| set.contains(&0) == set.contains(&4) && set.len() <= 2)
        );
        assert!(zdd.self_test().is_empty());
    }

    #[test]
    fn test_subset_intersection_law() {
        let n = 5;

        let mut sequential = Zdd::new(n);
        sequential.subset(&AgreeTwo::new(0, 2));
        sequential.reduce();
        sequential.subset(&AtMost::new(2));
        sequential.reduce();

        let mut combined = Zdd::new(n);
        combined.subset(&And::new(n, AgreeTwo::new(0, 2), AtMost::new(2)));
        combined.reduce();

        assert_eq!(combined.size(), sequential.size());
        assert_eq!(combined.path_count(), sequential.path_count());
        assert_eq!(drain(&combined), drain(&sequential));
    }

    #[test]
    fn test_intersection_with_mismatched_resume_levels() {
        // `Below` jumps past every level at the cutoff, so the product has
        // to feed the lagging factor forced exclusions until they agree
        let n = 4;
        let mut zdd = Zdd::new(n);
        zdd.subset(&And::new(n, AtMost::new(1), Below { cutoff: 2 }));
        zdd.reduce();
        assert_eq!(
            sorted_solutions(&zdd),
            expected_sets(n, |set| set.len() <= 1 && set.iter().all(|&v| v < 2))
        );

        let mut sequential = Zdd::new(n);
        sequential.subset(&AtMost::new(1));
        sequential.reduce();
        sequential.subset(&Below { cutoff: 2 });
        sequential.reduce();
        assert_eq!(drain(&sequential), drain(&zdd));
        assert_eq!(sequential.size(), zdd.size());
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let mut zdd = Zdd::new(4);
        zdd.subset(&AgreeTwo::new(0, 3));
        zdd.reduce();

        let size = zdd.size();
        let top = zdd.top();
        let sets = drain(&zdd);

        zdd.reduce();
        assert_eq!(zdd.size(), size);
        assert_eq!(zdd.top(), top);
        assert_eq!(drain(&zdd), sets);
    }

    #[test]
    fn test_reduced_form_is_canonical() {
        let mut zdd = Zdd::new(5);
        zdd.subset(&AgreeTwo::new(0, 2));
        zdd.subset(&AtMost::new(3));
        zdd.reduce();

        for i in 0..zdd.num_vars() {
            let mut seen = HashSet::new();
            for slot in 0..zdd.level_size(i) {
                let node = zdd.node(NodeRef::new(i, slot as u32));
                // zero-suppression: no stored node may have a pruned 1-edge
                assert_ne!(node.succ1, NodeRef::ZERO);
                // canonical uniqueness per level
                assert!(seen.insert(node), "duplicate node at level {}", i);
            }
        }
    }

    #[test]
    fn test_rejecting_everything_empties_the_diagram() {
        /// Accepts nothing: even the empty set is rejected at the first edge.
        #[derive(Debug, Clone, Eq, PartialEq)]
        struct Never;

        impl MyHash for Never {
            fn hash(&self) -> u64 {
                0
            }
        }

        impl Automaton for Never {
            fn down(&mut self, _take: bool, _from: usize, _to: usize) -> Descent {
                Descent::Reject
            }
        }

        let mut zdd = Zdd::new(3);
        zdd.subset(&Never);
        // only the dead root survives construction; reduce drops it
        assert_eq!(zdd.size(), 1);
        zdd.reduce();
        assert_eq!(zdd.top(), NodeRef::ZERO);
        assert_eq!(zdd.size(), 0);
        assert_eq!(zdd.path_count(), 0.0);
        assert_eq!(drain(&zdd), Vec::<Vec<usize>>::new());

        // a wholly terminal diagram short-circuits further construction
        zdd.subset(&AtMost::new(1));
        assert_eq!(zdd.top(), NodeRef::ZERO);

        // without an intermediate reduce, the dead root's candidate
        // resolves through the no-automaton shortcut
        let mut zdd = Zdd::new(3);
        zdd.subset(&Never);
        zdd.subset(&AtMost::new(1));
        assert_eq!(zdd.size(), 1);
        zdd.reduce();
        assert_eq!(zdd.top(), NodeRef::ZERO);
    }

    #[test]
    fn test_path_count_agrees_with_iterator() {
        for limit in 0..4 {
            let mut zdd = Zdd::new(6);
            zdd.subset(&AtMost::new(limit));
            zdd.reduce();
            let drained = drain(&zdd).len();
            assert_eq!(zdd.path_count(), drained as f64);
            assert_eq!(zdd.path_count_exact(), BigUint::from(drained));
        }
    }

    #[test]
    fn test_dead_nodes_before_reduce() {
        /// Rejects every edge into a subdiagram with fewer than `min` paths.
        #[derive(Debug, Clone, Eq, PartialEq)]
        struct MinCount {
            min: u64,
        }

        impl MyHash for MinCount {
            fn hash(&self) -> u64 {
                0
            }
        }

        impl ValueAutomaton<f64> for MinCount {
            fn down(&mut self, _take: bool, _from: usize, to: usize, value: &f64) -> Descent {
                if *value < self.min as f64 {
                    Descent::Reject
                } else {
                    Descent::Resume(to)
                }
            }
        }

        let mut zdd = Zdd::new(3);
        let total = zdd.eval_and_subset(&mut PathCounter, &MinCount { min: 2 });
        assert_eq!(total, 8.0);

        // every edge into the accepting terminal (1 path) was pruned, so
        // the surviving chain is dead end to end
        assert_eq!(zdd.dead_size(), 3);
        zdd.reduce();
        assert_eq!(zdd.size(), 0);
        assert_eq!(zdd.path_count(), 0.0);

        // a permissive threshold keeps the language intact
        let mut zdd = Zdd::new(3);
        let total = zdd.eval_and_subset(&mut PathCounter, &MinCount { min: 1 });
        assert_eq!(total, 8.0);
        zdd.reduce();
        assert_eq!(zdd.path_count(), 8.0);
    }

    #[test]
    fn test_clone_goes_through_construction() {
        let mut zdd = Zdd::new(4);
        zdd.subset(&AgreeTwo::new(1, 3));
        // clone before reducing: the copy is canonicalized on the way out
        let copy = zdd.clone();
        zdd.reduce();

        assert_eq!(copy.size(), zdd.size());
        assert_eq!(copy.path_count(), zdd.path_count());
        assert_eq!(drain(&copy), drain(&zdd));
        assert!(copy.self_test().is_empty());
    }

    #[test]
    fn test_initialize_resets() {
        let mut zdd = Zdd::new(4);
        zdd.subset(&AtMost::new(1));
        zdd.reduce();
        zdd.initialize(2);
        assert_eq!(zdd.num_vars(), 2);
        assert_eq!(zdd.size(), 2);
        assert_eq!(zdd.path_count(), 4.0);
    }

    #[test]
    fn test_self_test_reports_unreachable_nodes() {
        let mut zdd = Zdd::new(2);
        // plant a stored node nothing references
        zdd.levels[1].alloc(Node { succ0: NodeRef::ONE, succ1: NodeRef::ONE });

        let findings = zdd.self_test();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("unreachable"));
    }
}
