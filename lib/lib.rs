//! Dexflow: Simple Reflection Analysis over a Dex-shaped register IR.
//!
//! Dexflow answers one question for passes that fold reflection calls: at a
//! given instruction, what does a given register provably hold? The answer is
//! an `AbstractValue`: a specific string literal, a specific `Class` token,
//! a specific reflected field or method, or "some object of type T".
//!
//! The crate is organized in three layers:
//!
//! * `graph` - A generic directed graph.
//! * `ir` - The register IR the analysis consumes: types, instructions, basic
//! blocks, control flow graphs, methods and the class hierarchy.
//! * `analysis` - The fixed point engine and the reflection analysis itself.
//!
//! ```
//! use dexflow::analysis::reflection::{AbstractValue, SimpleReflectionAnalysis};
//! use dexflow::ir;
//!
//! # fn example() -> Result<(), dexflow::Error> {
//! let mut control_flow_graph = ir::ControlFlowGraph::new();
//! let entry = {
//!     let block = control_flow_graph.new_block()?;
//!     block.const_string(ir::reg(0), "foo1");
//!     block.return_object(ir::reg(0));
//!     block.index()
//! };
//! control_flow_graph.set_entry(entry)?;
//!
//! let method = ir::Method::new(
//!     ir::MethodRef::new(
//!         "LIsolate;",
//!         "main",
//!         ir::Proto::new("Ljava/lang/String;", Vec::<ir::DexType>::new()),
//!     ),
//!     ir::AccessFlags::STATIC,
//!     1,
//!     Some(control_flow_graph),
//! );
//!
//! let hierarchy = ir::ClassHierarchy::new();
//! let analysis = SimpleReflectionAnalysis::new(&method, &hierarchy)?;
//!
//! let point = ir::ProgramPoint::new(entry, 1);
//! assert_eq!(
//!     analysis.get_abstract_object(ir::reg(0), point),
//!     Some(&AbstractValue::string("foo1"))
//! );
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use thiserror::Error;

pub mod analysis;
pub mod graph;
pub mod ir;
#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error in the control flow graph: no entry block is set")]
    ControlFlowGraphEntryNotFound,
    #[error("The vertex id {0} does not exist in the graph")]
    GraphVertexNotFound(usize),
    #[error("The edge with head {0} and tail {1} does not exist in the graph")]
    GraphEdgeNotFound(usize, usize),
    #[error("The vertex id {0} already exists in the graph")]
    GraphDuplicateVertex(usize),
    #[error("The edge with head {0} and tail {1} already exists in the graph")]
    GraphDuplicateEdge(usize, usize),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Error {
        Error::Custom(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
