//! Implements a directed graph.
//!
//! The graph owns its vertices and edges, and keeps successor and predecessor
//! sets per vertex so the solver can walk the control flow graph in either
//! direction without rebuilding adjacency on every visit.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::Error;

pub trait Vertex: Clone + Sync {
    // The index of this vertex.
    fn index(&self) -> usize;
}

pub trait Edge: Clone + Sync {
    /// The index of the head vertex.
    fn head(&self) -> usize;
    /// The index of the tail vertex.
    fn tail(&self) -> usize;
}

/// A directed graph.
///
/// Serializes as a list of vertices and a list of edges; adjacency is rebuilt
/// on deserialization.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(
    into = "SerializedGraph<V, E>",
    try_from = "SerializedGraph<V, E>",
    bound(
        serialize = "V: Serialize, E: Serialize",
        deserialize = "V: Deserialize<'de>, E: Deserialize<'de>"
    )
)]
pub struct Graph<V: Vertex, E: Edge> {
    vertices: BTreeMap<usize, V>,
    edges: BTreeMap<(usize, usize), E>,
    successors: BTreeMap<usize, BTreeSet<usize>>,
    predecessors: BTreeMap<usize, BTreeSet<usize>>,
}

impl<V, E> Graph<V, E>
where
    V: Vertex,
    E: Edge,
{
    pub fn new() -> Graph<V, E> {
        Graph {
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the vertex with the given index exists in this graph
    pub fn has_vertex(&self, index: usize) -> bool {
        self.vertices.contains_key(&index)
    }

    /// Returns true if the edge with the given head and tail index exists in this graph
    pub fn has_edge(&self, head: usize, tail: usize) -> bool {
        self.edges.contains_key(&(head, tail))
    }

    /// Inserts a vertex into the graph.
    /// # Errors
    /// Error if the vertex already exists by index.
    pub fn insert_vertex(&mut self, v: V) -> Result<(), Error> {
        if self.vertices.contains_key(&v.index()) {
            return Err(Error::GraphDuplicateVertex(v.index()));
        }
        self.successors.insert(v.index(), BTreeSet::new());
        self.predecessors.insert(v.index(), BTreeSet::new());
        self.vertices.insert(v.index(), v);
        Ok(())
    }

    /// Inserts an edge into the graph.
    /// # Errors
    /// Error if the edge already exists by indices, or if either end of the
    /// edge is missing.
    pub fn insert_edge(&mut self, edge: E) -> Result<(), Error> {
        let (head, tail) = (edge.head(), edge.tail());
        if self.edges.contains_key(&(head, tail)) {
            return Err(Error::GraphDuplicateEdge(head, tail));
        }
        if !self.vertices.contains_key(&head) {
            return Err(Error::GraphVertexNotFound(head));
        }
        if !self.vertices.contains_key(&tail) {
            return Err(Error::GraphVertexNotFound(tail));
        }

        self.edges.insert((head, tail), edge);
        self.successors.entry(head).or_default().insert(tail);
        self.predecessors.entry(tail).or_default().insert(head);

        Ok(())
    }

    /// Returns the indices of all immediate successors of a vertex from the graph.
    pub fn successor_indices(&self, index: usize) -> Result<Vec<usize>, Error> {
        self.successors
            .get(&index)
            .map(|successors| successors.iter().cloned().collect())
            .ok_or(Error::GraphVertexNotFound(index))
    }

    /// Returns the indices of all immediate predecessors of a vertex from the graph.
    pub fn predecessor_indices(&self, index: usize) -> Result<Vec<usize>, Error> {
        self.predecessors
            .get(&index)
            .map(|predecessors| predecessors.iter().cloned().collect())
            .ok_or(Error::GraphVertexNotFound(index))
    }

    /// Computes the set of vertices reachable from the given index.
    ///
    /// The starting vertex is always part of the result.
    pub fn reachable_vertices(&self, index: usize) -> Result<FxHashSet<usize>, Error> {
        if !self.has_vertex(index) {
            return Err(Error::GraphVertexNotFound(index));
        }

        let mut reachable_vertices: FxHashSet<usize> = FxHashSet::default();
        let mut queue: Vec<usize> = vec![index];

        reachable_vertices.insert(index);

        while let Some(vertex) = queue.pop() {
            for &successor in &self.successors[&vertex] {
                if reachable_vertices.insert(successor) {
                    queue.push(successor)
                }
            }
        }

        Ok(reachable_vertices)
    }

    /// Compute the post order of all vertices reachable from `root`.
    ///
    /// Walks with an explicit stack, so deep graphs do not exhaust the call
    /// stack.
    pub fn compute_post_order(&self, root: usize) -> Result<Vec<usize>, Error> {
        if !self.has_vertex(root) {
            return Err(Error::GraphVertexNotFound(root));
        }

        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut order: Vec<usize> = Vec::new();
        // (vertex, successors of vertex still to walk)
        let mut stack: Vec<(usize, Vec<usize>)> = Vec::new();

        // successors are popped from the back, so store them reversed to
        // walk them in ascending order
        let pending = |index: usize| -> Result<Vec<usize>, Error> {
            let mut successors = self.successor_indices(index)?;
            successors.reverse();
            Ok(successors)
        };

        visited.insert(root);
        stack.push((root, pending(root)?));

        while let Some((vertex, successors)) = stack.last_mut() {
            match successors.pop() {
                Some(successor) => {
                    if visited.insert(successor) {
                        stack.push((successor, pending(successor)?));
                    }
                }
                None => {
                    order.push(*vertex);
                    stack.pop();
                }
            }
        }

        Ok(order)
    }

    /// Compute the reverse post order of all vertices reachable from `root`.
    ///
    /// In a reverse post order every vertex comes before its successors,
    /// back edges excepted.
    pub fn compute_reverse_post_order(&self, root: usize) -> Result<Vec<usize>, Error> {
        let mut order = self.compute_post_order(root)?;
        order.reverse();
        Ok(order)
    }

    /// Returns all vertices in the graph.
    pub fn vertices(&self) -> Vec<&V> {
        self.vertices.values().collect()
    }

    /// Fetches a vertex from the graph by index.
    pub fn vertex(&self, index: usize) -> Result<&V, Error> {
        self.vertices
            .get(&index)
            .ok_or(Error::GraphVertexNotFound(index))
    }

    // Fetches a mutable instance of a vertex.
    pub fn vertex_mut(&mut self, index: usize) -> Result<&mut V, Error> {
        self.vertices
            .get_mut(&index)
            .ok_or(Error::GraphVertexNotFound(index))
    }

    pub fn edge(&self, head: usize, tail: usize) -> Result<&E, Error> {
        self.edges
            .get(&(head, tail))
            .ok_or(Error::GraphEdgeNotFound(head, tail))
    }

    /// Get a reference to every `Edge` in the `Graph`.
    pub fn edges(&self) -> Vec<&E> {
        self.edges.values().collect()
    }

    /// Return all edges out for a vertex
    pub fn edges_out(&self, index: usize) -> Result<Vec<&E>, Error> {
        self.successors
            .get(&index)
            .map(|succs| {
                succs
                    .iter()
                    .map(|succ| &self.edges[&(index, *succ)])
                    .collect()
            })
            .ok_or(Error::GraphVertexNotFound(index))
    }

    /// Return all edges in for a vertex
    pub fn edges_in(&self, index: usize) -> Result<Vec<&E>, Error> {
        self.predecessors
            .get(&index)
            .map(|preds| {
                preds
                    .iter()
                    .map(|pred| &self.edges[&(*pred, index)])
                    .collect()
            })
            .ok_or(Error::GraphVertexNotFound(index))
    }
}

/// The serialized form of a `Graph`.
#[derive(Deserialize, Serialize)]
pub struct SerializedGraph<V, E> {
    vertices: Vec<V>,
    edges: Vec<E>,
}

impl<V, E> From<Graph<V, E>> for SerializedGraph<V, E>
where
    V: Vertex,
    E: Edge,
{
    fn from(graph: Graph<V, E>) -> SerializedGraph<V, E> {
        SerializedGraph {
            vertices: graph.vertices.into_values().collect(),
            edges: graph.edges.into_values().collect(),
        }
    }
}

impl<V, E> TryFrom<SerializedGraph<V, E>> for Graph<V, E>
where
    V: Vertex,
    E: Edge,
{
    type Error = Error;

    fn try_from(serialized: SerializedGraph<V, E>) -> Result<Graph<V, E>, Error> {
        let mut graph = Graph::new();
        for vertex in serialized.vertices {
            graph.insert_vertex(vertex)?;
        }
        for edge in serialized.edges {
            graph.insert_edge(edge)?;
        }
        Ok(graph)
    }
}

impl<V, E> Default for Graph<V, E>
where
    V: Vertex,
    E: Edge,
{
    fn default() -> Graph<V, E> {
        Graph::new()
    }
}
