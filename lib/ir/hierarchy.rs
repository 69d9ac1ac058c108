//! A read-only view of the classes an analysis may reason about.

use crate::ir::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
struct ClassInfo {
    super_class: Option<DexType>,
    access_flags: AccessFlags,
}

/// Superclass links and access flags of known classes.
///
/// Interfaces are not tracked. Array types have `Ljava/lang/Object;` as their
/// only supertype, and `Ljava/lang/Object;` is always known.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClassHierarchy {
    classes: FxHashMap<DexType, ClassInfo>,
}

impl ClassHierarchy {
    /// An empty hierarchy.
    pub fn new() -> ClassHierarchy {
        ClassHierarchy::default()
    }

    /// The hierarchy of the `java.lang` types the reflection analysis
    /// produces on its own: `String`, `Class` and the `reflect` members.
    pub fn with_java_lang() -> ClassHierarchy {
        let mut hierarchy = ClassHierarchy::new();
        let final_class = AccessFlags::PUBLIC | AccessFlags::FINAL;
        let object = DexType::java_lang_object();
        let accessible = DexType::new("Ljava/lang/reflect/AccessibleObject;");
        let executable = DexType::new("Ljava/lang/reflect/Executable;");

        hierarchy.declare(DexType::java_lang_string(), Some(object.clone()), final_class);
        hierarchy.declare(DexType::java_lang_class(), Some(object.clone()), final_class);
        hierarchy.declare(
            accessible.clone(),
            Some(object),
            AccessFlags::PUBLIC,
        );
        hierarchy.declare(
            executable.clone(),
            Some(accessible.clone()),
            AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
        );
        hierarchy.declare(DexType::java_lang_reflect_field(), Some(accessible), final_class);
        hierarchy.declare(DexType::java_lang_reflect_method(), Some(executable), final_class);
        hierarchy
    }

    /// Record a class, its superclass and its access flags.
    ///
    /// Declaring a class twice replaces the earlier declaration.
    pub fn declare<T: Into<DexType>>(
        &mut self,
        class: T,
        super_class: Option<DexType>,
        access_flags: AccessFlags,
    ) {
        self.classes.insert(
            class.into(),
            ClassInfo {
                super_class,
                access_flags,
            },
        );
    }

    pub fn contains(&self, class: &DexType) -> bool {
        class == &DexType::java_lang_object() || self.classes.contains_key(class)
    }

    /// The direct superclass of a type, if known.
    pub fn super_class(&self, class: &DexType) -> Option<&DexType> {
        self.classes
            .get(class)
            .and_then(|info| info.super_class.as_ref())
    }

    /// True when no subclass of `class` can exist: final classes, arrays of
    /// final types and primitive arrays.
    pub fn is_final(&self, class: &DexType) -> bool {
        if let Some(component) = class.component_type() {
            return component.is_primitive() || self.is_final(&component);
        }
        self.classes
            .get(class)
            .map(|info| info.access_flags.contains(AccessFlags::FINAL))
            .unwrap_or(false)
    }

    /// `class` followed by its superclasses, as far as they are known.
    pub fn ancestors(&self, class: &DexType) -> Vec<DexType> {
        self.superclass_chain(class).0
    }

    /// The ancestors of `class`, and whether the declared superclasses loop.
    fn superclass_chain(&self, class: &DexType) -> (Vec<DexType>, bool) {
        let mut ancestors = vec![class.clone()];
        if class.is_array() {
            ancestors.push(DexType::java_lang_object());
            return (ancestors, false);
        }
        let mut current = class;
        while let Some(super_class) = self.super_class(current) {
            if ancestors.contains(super_class) {
                return (ancestors, true);
            }
            ancestors.push(super_class.clone());
            current = super_class;
        }
        (ancestors, false)
    }

    /// True if `class` is `ancestor` or one of its known subclasses.
    pub fn is_subclass(&self, class: &DexType, ancestor: &DexType) -> bool {
        self.ancestors(class).contains(ancestor)
    }

    /// The least upper bound of two types.
    ///
    /// Equal types are their own bound. Otherwise the first type on the
    /// superclass chain of `lhs` which is also on the chain of `rhs`. `None`
    /// when the chains do not meet, or when either chain loops, since a loop
    /// has no first common type.
    pub fn lub(&self, lhs: &DexType, rhs: &DexType) -> Option<DexType> {
        if lhs == rhs {
            return Some(lhs.clone());
        }
        if !lhs.is_reference() || !rhs.is_reference() {
            return None;
        }
        let (lhs_ancestors, lhs_cyclic) = self.superclass_chain(lhs);
        let (rhs_ancestors, rhs_cyclic) = self.superclass_chain(rhs);
        if lhs_cyclic || rhs_cyclic {
            return None;
        }
        lhs_ancestors
            .into_iter()
            .find(|ancestor| rhs_ancestors.contains(ancestor))
    }
}
