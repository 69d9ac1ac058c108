//! An `Edge` is a directed edge between `Block`s in a `ControlFlowGraph`.
//!
//! Each edge records how control leaves its head block. The analysis treats
//! all kinds alike, but keeping the kind makes graphs readable when printed.
//!
//! To create a new edge, call `ControlFlowGraph::goto_edge`,
//! `ControlFlowGraph::branch_edge`, `ControlFlowGraph::fallthrough_edge` or
//! `ControlFlowGraph::exception_edge`.

use crate::graph;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum EdgeKind {
    /// Unconditional transfer, `goto` or plain succession.
    Goto,
    /// The taken side of an `if-*` or a `switch` case.
    Branch,
    /// The not-taken side of an `if-*`, or the default of a `switch`.
    Fallthrough,
    /// Control reaching a catch handler.
    Exception,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            EdgeKind::Goto => write!(f, "goto"),
            EdgeKind::Branch => write!(f, "branch"),
            EdgeKind::Fallthrough => write!(f, "fallthrough"),
            EdgeKind::Exception => write!(f, "exception"),
        }
    }
}

/// Edge between IR blocks
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Edge {
    head: usize,
    tail: usize,
    kind: EdgeKind,
}

impl Edge {
    pub(crate) fn new(head: usize, tail: usize, kind: EdgeKind) -> Edge {
        Edge { head, tail, kind }
    }

    /// Retrieve the index of the head `Vertex` for this `Edge`.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Retrieve the index of the tail `Vertex` for this `Edge`.
    pub fn tail(&self) -> usize {
        self.tail
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(0x{:X}->0x{:X}) {}", self.head, self.tail, self.kind)
    }
}

impl graph::Edge for Edge {
    fn head(&self) -> usize {
        self.head
    }

    fn tail(&self) -> usize {
        self.tail
    }
}
