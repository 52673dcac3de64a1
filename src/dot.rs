//! Graphviz rendering of a diagram.
//!
//! Nodes are grouped by level (`rank=same`), 0-edges are dashed, 1-edges
//! solid, and edges into terminal-0 are omitted entirely — a pruned edge
//! carries no information worth drawing. Render the output with `dot`:
//!
//! ```text
//! dot -Tpng diagram.dot -o diagram.png
//! ```

use std::fmt::Write;

use crate::node::NodeRef;
use crate::zdd::Zdd;

impl Zdd {
    /// Render the diagram in DOT format, labeling each node with its
    /// level index.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with(|level| level.to_string())
    }

    /// Render the diagram in DOT format with a caller-supplied level
    /// labeler; front ends typically map levels back to edge or cell
    /// names.
    pub fn to_dot_with(&self, label: impl Fn(usize) -> String) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        writeln!(out, "digraph {{")?;

        let mut nodes = 0;
        let mut edges_to_one = 0;

        for i in 0..self.num_vars() {
            if self.level_size(i) == 0 {
                continue;
            }

            for slot in 0..self.level_size(i) {
                let r = NodeRef::new(i, slot as u32);
                let node = self.node(r);
                nodes += 1;
                writeln!(out, "  \"{}\" [label=\"{}\"];", r, label(i))?;
                if node.succ0 != NodeRef::ZERO {
                    writeln!(out, "  \"{}\" -> \"{}\" [style=dashed];", r, node.succ0)?;
                    if node.succ0 == NodeRef::ONE {
                        edges_to_one += 1;
                    }
                }
                if node.succ1 != NodeRef::ZERO {
                    writeln!(out, "  \"{}\" -> \"{}\" [style=solid];", r, node.succ1)?;
                    if node.succ1 == NodeRef::ONE {
                        edges_to_one += 1;
                    }
                }
            }

            write!(out, "  {{rank=same")?;
            for slot in 0..self.level_size(i) {
                write!(out, "; \"{}\"", NodeRef::new(i, slot as u32))?;
            }
            writeln!(out, "}}")?;
        }

        if nodes == 0 {
            writeln!(out, "  \"{}\" [shape=square,label=\"{}\"];", self.top(), self.top())?;
        } else if edges_to_one != 0 {
            writeln!(out, "  \"{}\" [shape=square,label=\"1\"];", NodeRef::ONE)?;
        }

        writeln!(out, "}}")?;
        Ok(out)
    }
}
