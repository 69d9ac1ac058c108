//! Options which change the behavior of the reflection analysis.

use crate::ir::MethodRef;
use std::default;

/// The per-block visit budget used when none is given.
pub const DEFAULT_MAX_BLOCK_VISITS: usize = 64;

/// Various options that can be passed to the analysis.
#[derive(Clone, Debug)]
pub struct Options {
    max_block_visits: usize,
    resolve_reflection: bool,
    identity_methods: Vec<MethodRef>,
}

impl Options {
    /// Create a new set of Options with the default settings.
    pub fn new() -> Options {
        Options::default()
    }

    /// How many times, on average, the solver may visit each block.
    ///
    /// The solver stops after `max_block_visits` times the number of blocks
    /// visits, and falls back to "unknown" for everything it did not finish.
    pub fn max_block_visits(&self) -> usize {
        self.max_block_visits
    }

    pub fn set_max_block_visits(&mut self, max_block_visits: usize) {
        self.max_block_visits = max_block_visits;
    }

    /// Whether calls into `java.lang.Class`, `java.lang.Object.getClass` and
    /// friends are evaluated when their inputs are known.
    pub fn resolve_reflection(&self) -> bool {
        self.resolve_reflection
    }

    pub fn set_resolve_reflection(&mut self, resolve_reflection: bool) {
        self.resolve_reflection = resolve_reflection;
    }

    /// Add a callee which returns its first argument unchanged.
    pub fn add_identity_method(&mut self, method: MethodRef) {
        self.identity_methods.push(method);
    }

    /// Callees, beyond the built in ones, which return their first argument.
    pub fn identity_methods(&self) -> &[MethodRef] {
        &self.identity_methods
    }
}

impl default::Default for Options {
    fn default() -> Options {
        Options {
            max_block_visits: DEFAULT_MAX_BLOCK_VISITS,
            resolve_reflection: true,
            identity_methods: Vec::new(),
        }
    }
}

/// Create your options with the builder pattern.
///
/// For more details on the options, see `analysis::Options`
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Create a new builder for analysis options.
    pub fn new() -> OptionsBuilder {
        OptionsBuilder {
            options: Options::default(),
        }
    }

    /// Set the per-block visit budget. By default this is 64.
    pub fn max_block_visits(mut self, max_block_visits: usize) -> OptionsBuilder {
        self.options.max_block_visits = max_block_visits;
        self
    }

    /// Set the, "Resolve reflection," option. By default this is true.
    pub fn resolve_reflection(mut self, resolve_reflection: bool) -> OptionsBuilder {
        self.options.resolve_reflection = resolve_reflection;
        self
    }

    pub fn add_identity_method(mut self, method: MethodRef) -> OptionsBuilder {
        self.options.add_identity_method(method);
        self
    }

    pub fn build(self) -> Options {
        self.options
    }
}

impl default::Default for OptionsBuilder {
    fn default() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}
