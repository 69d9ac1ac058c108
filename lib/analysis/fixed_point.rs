//! A forward, block-level, worklist fixed point engine.
//!
//! Blocks are visited in reverse post order: the worklist is ordered by each
//! block's position in the reverse post order of the control flow graph, so a
//! block is, where the graph allows it, processed after all of its forward
//! predecessors.
//!
//! The number of block visits is capped. When the cap is hit, the blocks still
//! waiting to be visited and every block reachable from them are given the
//! analysis' fallback state, which must hold for any execution.

use crate::ir;
use crate::Error;
use log::{trace, warn};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

/// A trait which implements a forward, flow-sensitive analysis to a
/// fixed point.
pub trait FixedPointAnalysis<State: Clone + Debug + PartialEq> {
    /// The state flowing into the entry block.
    fn entry_state(&self) -> Result<State, Error>;

    /// The state of a block no path has reached yet.
    fn bottom_state(&self) -> State;

    /// The state given to blocks abandoned when the visit budget runs out.
    fn fallback_state(&self) -> State;

    /// Given an input state for a block, create an output state for this
    /// block.
    fn trans(&self, block: &ir::Block, state: &State) -> Result<State, Error>;

    /// Given two states, join them into one state.
    fn join(&self, state0: State, state1: &State) -> Result<State, Error>;
}

/// Where a block stands in the solver.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BlockStatus {
    /// Never placed on the worklist.
    Unvisited,
    /// On the worklist.
    Pending,
    /// Visited, and not waiting for another visit.
    Stable,
}

/// The states computed by `fixed_point_forward`.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedPoint<State> {
    in_states: BTreeMap<usize, State>,
    out_states: BTreeMap<usize, State>,
    status: BTreeMap<usize, BlockStatus>,
    iterations: usize,
    converged: bool,
}

impl<State> FixedPoint<State> {
    /// The state before the first instruction of a block.
    pub fn in_state(&self, block: usize) -> Option<&State> {
        self.in_states.get(&block)
    }

    /// The state after the last instruction of a block.
    pub fn out_state(&self, block: usize) -> Option<&State> {
        self.out_states.get(&block)
    }

    pub fn in_states(&self) -> &BTreeMap<usize, State> {
        &self.in_states
    }

    pub fn status(&self, block: usize) -> Option<BlockStatus> {
        self.status.get(&block).cloned()
    }

    /// The number of block visits performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// False if the visit budget ran out before a fixed point was reached.
    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// Run `analysis` over `control_flow_graph` until its states stop changing,
/// or until `max_iterations` blocks have been visited.
pub fn fixed_point_forward<Analysis, State>(
    analysis: &Analysis,
    control_flow_graph: &ir::ControlFlowGraph,
    max_iterations: usize,
) -> Result<FixedPoint<State>, Error>
where
    Analysis: FixedPointAnalysis<State>,
    State: Clone + Debug + PartialEq,
{
    let entry = control_flow_graph
        .entry()
        .ok_or(Error::ControlFlowGraphEntryNotFound)?;

    let order = control_flow_graph.reverse_post_order()?;
    let priority: BTreeMap<usize, usize> = order
        .iter()
        .enumerate()
        .map(|(rank, block)| (*block, rank))
        .collect();

    let mut in_states: BTreeMap<usize, State> = BTreeMap::new();
    let mut out_states: BTreeMap<usize, State> = BTreeMap::new();
    let mut status: BTreeMap<usize, BlockStatus> = BTreeMap::new();

    for block in control_flow_graph.blocks() {
        in_states.insert(block.index(), analysis.bottom_state());
        out_states.insert(block.index(), analysis.bottom_state());
        status.insert(block.index(), BlockStatus::Unvisited);
    }

    let entry_state = analysis.entry_state()?;

    // (reverse post order rank, block index)
    let mut queue: BTreeSet<(usize, usize)> = BTreeSet::new();
    queue.insert((priority[&entry], entry));
    status.insert(entry, BlockStatus::Pending);

    let mut iterations = 0;

    while let Some(&next) = queue.iter().next() {
        if iterations >= max_iterations {
            break;
        }
        queue.remove(&next);
        iterations += 1;

        let (_, index) = next;
        let block = control_flow_graph.block(index)?;

        let in_state = {
            let mut in_state = if index == entry {
                entry_state.clone()
            } else {
                analysis.bottom_state()
            };
            for predecessor in control_flow_graph.predecessor_indices(index)? {
                if let Some(state) = out_states.get(&predecessor) {
                    in_state = analysis.join(in_state, state)?;
                }
            }
            in_state
        };

        trace!("fixed point visiting block 0x{:X}", index);

        let out_state = analysis.trans(block, &in_state)?;
        in_states.insert(index, in_state);
        status.insert(index, BlockStatus::Stable);

        if out_states.get(&index) == Some(&out_state) {
            continue;
        }
        out_states.insert(index, out_state);

        for successor in control_flow_graph.successor_indices(index)? {
            // every successor of a reachable block is itself reachable, and
            // therefore has a rank
            let rank = priority
                .get(&successor)
                .ok_or(Error::GraphVertexNotFound(successor))?;
            queue.insert((*rank, successor));
            status.insert(successor, BlockStatus::Pending);
        }
    }

    let converged = queue.is_empty();

    if !converged {
        warn!(
            "fixed point gave up after {} block visits with {} blocks pending",
            iterations,
            queue.len()
        );

        let mut abandoned: FxHashSet<usize> = FxHashSet::default();
        for (_, index) in &queue {
            abandoned.extend(control_flow_graph.graph().reachable_vertices(*index)?);
        }

        for index in abandoned {
            trace!("block 0x{:X} falls back", index);
            in_states.insert(index, analysis.fallback_state());
            out_states.insert(index, analysis.fallback_state());
            status.insert(index, BlockStatus::Stable);
        }
    }

    Ok(FixedPoint {
        in_states,
        out_states,
        status,
        iterations,
        converged,
    })
}
