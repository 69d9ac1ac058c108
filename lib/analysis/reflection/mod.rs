//! Simple reflection analysis.
//!
//! For every instruction of a method, computes what each register provably
//! holds before that instruction executes: a specific string, a specific
//! `Class` token, a specific reflected field or method, or an object of some
//! type. Passes which fold reflection calls, like `Class.forName("...")` or
//! `getDeclaredMethod("...")`, query the result with `get_abstract_object`.
//!
//! The analysis is intraprocedural. Callees are not analyzed, except for a
//! handful of `java.lang` methods whose result follows from their arguments.

use crate::analysis::fixed_point::{self, FixedPointAnalysis};
use crate::analysis::options::Options;
use crate::ir::*;
use crate::Error;
use log::debug;
use rustc_hash::FxHashMap;

mod environment;
mod transfer;
mod value;

pub use self::environment::Environment;
pub use self::transfer::{transfer, transfer_block, TransferContext};
pub use self::value::{AbstractObjectKind, AbstractValue};

/// Drives the fixed point engine with environments as states.
struct ReflectionAnalysis<'a> {
    method: &'a Method,
    context: TransferContext<'a>,
}

impl<'a> FixedPointAnalysis<Environment> for ReflectionAnalysis<'a> {
    fn entry_state(&self) -> Result<Environment, Error> {
        let mut environment = Environment::new();
        for (register, dex_type) in self.method.parameter_registers()? {
            let value = if dex_type.is_reference() {
                AbstractValue::ObjectOfType(dex_type)
            } else {
                AbstractValue::Top
            };
            environment.bind(register, value);
        }
        Ok(environment)
    }

    fn bottom_state(&self) -> Environment {
        Environment::bottom()
    }

    fn fallback_state(&self) -> Environment {
        let mut environment = Environment::new();
        for register in self.method.registers() {
            environment.bind(register, AbstractValue::Top);
        }
        environment
    }

    fn trans(&self, block: &Block, state: &Environment) -> Result<Environment, Error> {
        Ok(transfer_block(block, state, &self.context))
    }

    fn join(&self, state0: Environment, state1: &Environment) -> Result<Environment, Error> {
        Ok(state0.merge(state1, self.context.hierarchy()))
    }
}

/// The result of analyzing one method.
///
/// Built once by `new` or `with_options`, read-only afterwards.
#[derive(Clone, Debug)]
pub struct SimpleReflectionAnalysis<'m> {
    method: &'m Method,
    environments: FxHashMap<ProgramPoint, Environment>,
    iterations: usize,
    converged: bool,
}

impl<'m> SimpleReflectionAnalysis<'m> {
    /// Analyze `method` with the default `Options`.
    pub fn new(
        method: &'m Method,
        hierarchy: &ClassHierarchy,
    ) -> Result<SimpleReflectionAnalysis<'m>, Error> {
        SimpleReflectionAnalysis::with_options(method, hierarchy, &Options::default())
    }

    /// Analyze `method`.
    ///
    /// A method without a body gives an empty analysis. A body with blocks
    /// but no entry is an error.
    pub fn with_options(
        method: &'m Method,
        hierarchy: &ClassHierarchy,
        options: &Options,
    ) -> Result<SimpleReflectionAnalysis<'m>, Error> {
        let mut analysis = SimpleReflectionAnalysis {
            method,
            environments: FxHashMap::default(),
            iterations: 0,
            converged: true,
        };

        let code = match method.code() {
            Some(code) if code.num_blocks() > 0 => code,
            _ => {
                debug!("{} has no code to analyze", method.method_ref());
                return Ok(analysis);
            }
        };

        debug!("analyzing {}", method.method_ref());

        let reflection_analysis = ReflectionAnalysis {
            method,
            context: TransferContext::new(hierarchy, options),
        };

        let max_iterations = options
            .max_block_visits()
            .saturating_mul(code.num_blocks());
        let fixed_point =
            fixed_point::fixed_point_forward(&reflection_analysis, code, max_iterations)?;

        for block in code.blocks() {
            let mut environment = fixed_point
                .in_state(block.index())
                .cloned()
                .unwrap_or_else(Environment::bottom);
            for (position, instruction) in block.instructions().iter().enumerate() {
                let next = transfer(instruction, &environment, &reflection_analysis.context);
                analysis
                    .environments
                    .insert(ProgramPoint::new(block.index(), position), environment);
                environment = next;
            }
        }

        analysis.iterations = fixed_point.iterations();
        analysis.converged = fixed_point.converged();

        debug!(
            "analyzed {} in {} block visits",
            method.method_ref(),
            analysis.iterations
        );

        Ok(analysis)
    }

    /// What `register` holds just before the instruction at `point`.
    ///
    /// `None` if `point` is not an instruction of the analyzed method, if no
    /// execution reaches it, or if nothing ever wrote `register` on the way
    /// there.
    pub fn get_abstract_object(
        &self,
        register: Register,
        point: ProgramPoint,
    ) -> Option<&AbstractValue> {
        self.environments
            .get(&point)
            .and_then(|environment| environment.binding(register))
    }

    /// The environment just before the instruction at `point`.
    pub fn environment(&self, point: ProgramPoint) -> Option<&Environment> {
        self.environments.get(&point)
    }

    /// True if the analysis holds no results, as for methods without code.
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    /// False if the visit budget ran out and some results fell back to `Top`.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// The number of block visits the fixed point took.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn method(&self) -> &'m Method {
        self.method
    }
}
