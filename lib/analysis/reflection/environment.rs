//! Register environments: what every register holds at one program point.

use crate::analysis::reflection::AbstractValue;
use crate::ir::{ClassHierarchy, Register};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A mapping of registers to `AbstractValue`s.
///
/// Registers without a binding hold `Top`. The bottom environment describes
/// a point no execution reaches, and binds nothing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Environment {
    // `None` for the bottom environment.
    bindings: Option<BTreeMap<Register, AbstractValue>>,
}

impl Environment {
    /// An environment with no bindings, where every register is `Top`.
    pub fn new() -> Environment {
        Environment {
            bindings: Some(BTreeMap::new()),
        }
    }

    /// The environment of unreachable points.
    pub fn bottom() -> Environment {
        Environment { bindings: None }
    }

    pub fn is_bottom(&self) -> bool {
        self.bindings.is_none()
    }

    /// The value of a register. `Bottom` in the bottom environment, `Top`
    /// for registers without a binding.
    pub fn get(&self, register: Register) -> AbstractValue {
        match self.bindings {
            None => AbstractValue::Bottom,
            Some(ref bindings) => bindings
                .get(&register)
                .cloned()
                .unwrap_or(AbstractValue::Top),
        }
    }

    /// The value bound to a register, if it has been bound.
    pub fn binding(&self, register: Register) -> Option<&AbstractValue> {
        self.bindings
            .as_ref()
            .and_then(|bindings| bindings.get(&register))
    }

    /// Every explicit binding, in register order.
    pub fn bindings(&self) -> impl Iterator<Item = (&Register, &AbstractValue)> {
        self.bindings.iter().flat_map(|bindings| bindings.iter())
    }

    /// A new environment where `register` holds `value`.
    ///
    /// The bottom environment stays bottom.
    pub fn set(&self, register: Register, value: AbstractValue) -> Environment {
        let mut environment = self.clone();
        environment.bind(register, value);
        environment
    }

    /// Bind `register` to `value` in place.
    pub fn bind(&mut self, register: Register, value: AbstractValue) {
        if let Some(ref mut bindings) = self.bindings {
            bindings.insert(register, value);
        }
    }

    /// Join two environments register by register.
    ///
    /// A register bound on one side only is joined with the `Top` it holds
    /// on the other side.
    pub fn merge(&self, other: &Environment, hierarchy: &ClassHierarchy) -> Environment {
        let (lhs, rhs) = match (&self.bindings, &other.bindings) {
            (None, _) => return other.clone(),
            (_, None) => return self.clone(),
            (Some(lhs), Some(rhs)) => (lhs, rhs),
        };

        let mut bindings = BTreeMap::new();
        for (register, value) in lhs {
            let joined = match rhs.get(register) {
                Some(other_value) => value.join(other_value, hierarchy),
                None => AbstractValue::Top,
            };
            bindings.insert(*register, joined);
        }
        for register in rhs.keys() {
            if !lhs.contains_key(register) {
                bindings.insert(*register, AbstractValue::Top);
            }
        }

        Environment {
            bindings: Some(bindings),
        }
    }

    /// True if every register of `self` is at least as precise as in `other`.
    pub fn leq(&self, other: &Environment, hierarchy: &ClassHierarchy) -> bool {
        let (lhs, rhs) = match (&self.bindings, &other.bindings) {
            (None, _) => return true,
            (_, None) => return false,
            (Some(lhs), Some(rhs)) => (lhs, rhs),
        };

        lhs.keys()
            .chain(rhs.keys())
            .all(|register| self.get(*register).leq(&other.get(*register), hierarchy))
    }
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::new()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bindings = match self.bindings {
            None => return write!(f, "BOTTOM"),
            Some(ref bindings) => bindings,
        };
        let bindings = bindings
            .iter()
            .map(|(register, value)| format!("{} -> {}", register, value))
            .collect::<Vec<String>>();
        write!(f, "{{{}}}", bindings.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::reg;

    #[test]
    fn unbound_registers_are_top() {
        let environment = Environment::new().set(reg(0), AbstractValue::string("foo"));

        assert_eq!(environment.get(reg(0)), AbstractValue::string("foo"));
        assert_eq!(environment.get(reg(1)), AbstractValue::Top);
        assert_eq!(environment.binding(reg(1)), None);
    }

    #[test]
    fn bottom_absorbs_writes() {
        let environment = Environment::bottom().set(reg(0), AbstractValue::string("foo"));

        assert!(environment.is_bottom());
        assert_eq!(environment.get(reg(0)), AbstractValue::Bottom);
        assert_eq!(environment.binding(reg(0)), None);
    }

    #[test]
    fn set_leaves_the_original_untouched() {
        let original = Environment::new().set(reg(0), AbstractValue::string("foo"));
        let updated = original.set(reg(0), AbstractValue::string("bar"));

        assert_eq!(original.get(reg(0)), AbstractValue::string("foo"));
        assert_eq!(updated.get(reg(0)), AbstractValue::string("bar"));
    }

    #[test]
    fn merge() {
        let hierarchy = ClassHierarchy::new();
        let lhs = Environment::new()
            .set(reg(0), AbstractValue::string("foo"))
            .set(reg(1), AbstractValue::string("same"))
            .set(reg(2), AbstractValue::class("LFoo;"));
        let rhs = Environment::new()
            .set(reg(0), AbstractValue::string("bar"))
            .set(reg(1), AbstractValue::string("same"));

        let merged = lhs.merge(&rhs, &hierarchy);
        assert_eq!(
            merged.binding(reg(0)),
            Some(&AbstractValue::object("Ljava/lang/String;"))
        );
        assert_eq!(merged.binding(reg(1)), Some(&AbstractValue::string("same")));
        assert_eq!(merged.binding(reg(2)), Some(&AbstractValue::Top));
        assert_eq!(merged, rhs.merge(&lhs, &hierarchy));

        assert_eq!(lhs.merge(&Environment::bottom(), &hierarchy), lhs);
        assert_eq!(Environment::bottom().merge(&rhs, &hierarchy), rhs);

        assert!(lhs.leq(&merged, &hierarchy));
        assert!(rhs.leq(&merged, &hierarchy));
        assert!(!merged.leq(&lhs, &hierarchy));
        assert!(Environment::bottom().leq(&lhs, &hierarchy));
    }

    #[test]
    fn display() {
        let environment = Environment::new()
            .set(reg(1), AbstractValue::class("LFoo;"))
            .set(reg(0), AbstractValue::string("foo"));

        assert_eq!(
            environment.to_string(),
            "{v0 -> \"foo\", v1 -> CLASS{LFoo;}}"
        );
        assert_eq!(Environment::bottom().to_string(), "BOTTOM");
    }
}
