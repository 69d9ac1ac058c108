//! A `ControlFlowGraph` is a directed `Graph` of `Block` and `Edge`.

use crate::ir::*;
use crate::{graph, Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed graph of types `Block` and `Edge`.
///
/// # Entry
/// A `ControlFlowGraph` has an optional, "Entry." Analyses need one to know
/// where the method's parameters flow in, so a graph with blocks but no entry
/// cannot be analyzed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ControlFlowGraph {
    // The internal graph used to store our blocks.
    graph: graph::Graph<Block, Edge>,
    // The next index to use when creating a basic block.
    next_index: usize,
    // An optional entry index for the graph.
    entry: Option<usize>,
}

impl ControlFlowGraph {
    pub fn new() -> ControlFlowGraph {
        ControlFlowGraph {
            graph: graph::Graph::new(),
            next_index: 0,
            entry: None,
        }
    }

    /// Returns the underlying graph
    pub fn graph(&self) -> &graph::Graph<Block, Edge> {
        &self.graph
    }

    /// Sets the entry point for this `ControlFlowGraph` to the given `Block` index.
    pub fn set_entry(&mut self, entry: usize) -> Result<(), Error> {
        if self.graph.has_vertex(entry) {
            self.entry = Some(entry);
            return Ok(());
        }
        Err(Error::GraphVertexNotFound(entry))
    }

    /// Get the entry `Block` index for this `ControlFlowGraph`.
    pub fn entry(&self) -> Option<usize> {
        self.entry
    }

    /// Get a `Block` by index.
    pub fn block(&self, index: usize) -> Result<&Block, Error> {
        self.graph.vertex(index)
    }

    /// Get a mutable reference to a `Block` by index.
    pub fn block_mut(&mut self, index: usize) -> Result<&mut Block, Error> {
        self.graph.vertex_mut(index)
    }

    /// Get every `Block` in this `ControlFlowGraph`.
    pub fn blocks(&self) -> Vec<&Block> {
        self.graph.vertices()
    }

    pub fn num_blocks(&self) -> usize {
        self.graph.num_vertices()
    }

    /// Get an `Edge` by its head and tail `Block` indices.
    pub fn edge(&self, head: usize, tail: usize) -> Result<&Edge, Error> {
        self.graph.edge(head, tail)
    }

    /// Get every `Edge` in this `ControlFlowGraph`.
    pub fn edges(&self) -> Vec<&Edge> {
        self.graph.edges()
    }

    /// Get every incoming edge to a block
    pub fn edges_in(&self, index: usize) -> Result<Vec<&Edge>, Error> {
        self.graph.edges_in(index)
    }

    /// Get every outgoing edge from a block
    pub fn edges_out(&self, index: usize) -> Result<Vec<&Edge>, Error> {
        self.graph.edges_out(index)
    }

    /// Get the indices of every predecessor of a `Block` in this `ControlFlowGraph`.
    pub fn predecessor_indices(&self, index: usize) -> Result<Vec<usize>, Error> {
        self.graph.predecessor_indices(index)
    }

    /// Get the indices of every successor of a `Block` in this `ControlFlowGraph`.
    pub fn successor_indices(&self, index: usize) -> Result<Vec<usize>, Error> {
        self.graph.successor_indices(index)
    }

    /// Creates a new basic block, adds it to the graph, and returns it
    pub fn new_block(&mut self) -> Result<&mut Block, Error> {
        let next_index = self.next_index;
        self.next_index += 1;
        let block = Block::new(next_index);
        self.graph.insert_vertex(block)?;
        self.graph.vertex_mut(next_index)
    }

    fn insert_edge(&mut self, head: usize, tail: usize, kind: EdgeKind) -> Result<(), Error> {
        let edge = Edge::new(head, tail, kind);
        self.graph.insert_edge(edge)
    }

    /// Creates an unconditional edge from one block to another block
    pub fn goto_edge(&mut self, head: usize, tail: usize) -> Result<(), Error> {
        self.insert_edge(head, tail, EdgeKind::Goto)
    }

    /// Creates the taken edge of a branch
    pub fn branch_edge(&mut self, head: usize, tail: usize) -> Result<(), Error> {
        self.insert_edge(head, tail, EdgeKind::Branch)
    }

    /// Creates the not-taken edge of a branch
    pub fn fallthrough_edge(&mut self, head: usize, tail: usize) -> Result<(), Error> {
        self.insert_edge(head, tail, EdgeKind::Fallthrough)
    }

    /// Creates an edge from a block to one of its catch handlers
    pub fn exception_edge(&mut self, head: usize, tail: usize) -> Result<(), Error> {
        self.insert_edge(head, tail, EdgeKind::Exception)
    }

    /// The indices of the blocks reachable from the entry, in reverse post
    /// order.
    pub fn reverse_post_order(&self) -> Result<Vec<usize>, Error> {
        let entry = self.entry.ok_or(Error::ControlFlowGraphEntryNotFound)?;
        self.graph.compute_reverse_post_order(entry)
    }
}

impl Default for ControlFlowGraph {
    fn default() -> ControlFlowGraph {
        ControlFlowGraph::new()
    }
}

impl fmt::Display for ControlFlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for block in self.blocks() {
            writeln!(f, "{}", block)?;
        }
        for edge in self.edges() {
            writeln!(f, "edge {}", edge)?;
        }
        Ok(())
    }
}
