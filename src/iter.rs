//! Depth-first enumeration of the sets encoded by a diagram.
//!
//! Each item is the selected-variable set of one root-to-terminal-1 path,
//! produced lazily with the 0-edge explored first. The iterator keeps the
//! current path and selection on explicit stacks; backtracking resumes at
//! the deepest node whose 1-edge is still unexplored and not pruned.
//!
//! The number of paths can be exponential in the number of variables, so
//! draining a large diagram deserves caution.

use crate::node::NodeRef;
use crate::zdd::Zdd;

impl Zdd {
    /// Returns an iterator over the selected-variable sets, one per
    /// root-to-terminal-1 path, in 0-edge-first depth-first order.
    ///
    /// The enumeration restarts from the beginning each time a fresh
    /// iterator is acquired.
    pub fn solutions(&self) -> Solutions<'_> {
        Solutions::new(self)
    }
}

/// One entry on the depth-first path: a node and whether its 1-edge has
/// been taken.
#[derive(Debug, Copy, Clone)]
struct Selection {
    node: NodeRef,
    took: bool,
}

/// Iterator over the sets encoded by a [`Zdd`].
///
/// Created by [`Zdd::solutions()`].
pub struct Solutions<'a> {
    zdd: &'a Zdd,
    started: bool,
    done: bool,
    /// Deepest path entry whose 1-edge may still be unexplored.
    cursor: Option<usize>,
    path: Vec<Selection>,
    items: Vec<usize>,
}

impl<'a> Solutions<'a> {
    fn new(zdd: &'a Zdd) -> Self {
        Self {
            zdd,
            started: false,
            done: false,
            cursor: None,
            path: Vec::new(),
            items: Vec::new(),
        }
    }

    fn advance(&mut self, mut f: NodeRef) -> Option<Vec<usize>> {
        loop {
            // descend, preferring the 0-edge
            while f != NodeRef::ZERO {
                if f == NodeRef::ONE {
                    return Some(self.items.clone());
                }
                let node = self.zdd.node(f);
                if node.succ0 != NodeRef::ZERO {
                    self.cursor = Some(self.path.len());
                    self.path.push(Selection { node: f, took: false });
                    f = node.succ0;
                } else {
                    self.path.push(Selection { node: f, took: true });
                    self.items.push(f.level());
                    f = node.succ1;
                }
            }

            // backtrack to the deepest untried, unpruned 1-edge
            let mut resumed = false;
            while let Some(cursor) = self.cursor {
                let sel = self.path[cursor];
                if !sel.took {
                    let succ1 = self.zdd.node(sel.node).succ1;
                    if succ1 != NodeRef::ZERO {
                        self.path[cursor].took = true;
                        let var = sel.node.level();
                        self.path.truncate(cursor + 1);
                        while self.items.last().is_some_and(|&v| v >= var) {
                            self.items.pop();
                        }
                        self.items.push(var);
                        f = succ1;
                        resumed = true;
                        break;
                    }
                }
                self.cursor = cursor.checked_sub(1);
            }

            if !resumed {
                self.done = true;
                self.path.clear();
                self.items.clear();
                return None;
            }
        }
    }
}

impl Iterator for Solutions<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = if self.started {
            // resume as if the yield position were a dead end
            NodeRef::ZERO
        } else {
            self.started = true;
            self.zdd.top()
        };
        self.advance(start)
    }
}
