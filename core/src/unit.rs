//! The compiled-unit model.
//!
//! A compiled unit is an ordered stream of code elements per method plus the
//! location-tagged type annotations that survived compilation. Branch targets
//! and annotation targets address labels, never raw indices, so inserting
//! code cannot disturb control flow. Units round-trip through JSON; the
//! weaver reads and overwrites that format in place.

use crate::{TagParams, Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A code label. Branch and annotation targets address labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(pub u32);

impl Label {
    /// Create a label from a raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// The call-out operation requested at a rewritten location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalloutOp {
    /// No stack result; raises on invalid input.
    Validate,
    /// Pushes a boolean; never raises for a type/value rejection.
    IsValid,
}

impl fmt::Display for CalloutOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalloutOp::Validate => f.write_str("validate"),
            CalloutOp::IsValid => f.write_str("is_valid"),
        }
    }
}

/// A validation call-out baked into a rewritten stream.
///
/// Carries everything the runtime needs to bind the call site: the operation,
/// the marker type name, and the tag's per-use parameters. The loader
/// allocates one call-site slot per occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalloutRef {
    pub op: CalloutOp,
    pub marker: String,
    pub params: TagParams,
}

/// One instruction of a method body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Push a constant.
    Const(Value),
    /// Push a local variable.
    LoadLocal(u16),
    /// Pop into a local variable.
    StoreLocal(u16),
    /// Duplicate the top of stack.
    Dup,
    /// Swap the top two stack values.
    Swap,
    /// Discard the top of stack.
    Pop,
    /// Pop two booleans, push their conjunction.
    And,
    /// Pop a boolean, push its negation.
    Not,
    /// Unconditional jump.
    Jump(Label),
    /// Pop a boolean, jump when false.
    BranchIfFalse(Label),
    /// Structural cast: fails unless the top of stack is an instance of the
    /// type (null passes). Leaves the value in place.
    Cast(ValueType),
    /// Structural type test: pops a value, pushes whether it is an instance
    /// of the type (false for null).
    TypeTest(ValueType),
    /// Validation call-out. Never present in input units; only the rewriter
    /// emits it.
    Callout(CalloutRef),
    /// Return with no value.
    Return,
    /// Pop the top of stack and return it.
    ReturnValue,
}

/// One element of a method's code stream: a label mark or an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CodeElement {
    Mark(Label),
    Instr(Instruction),
}

/// Retention class of a type annotation. Both classes are scanned identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Retention {
    Visible,
    Invisible,
}

/// What a type annotation is attached to.
///
/// Only `Cast` and `TypeTest` are woven in this version; other target kinds
/// are carried through unchanged and ignored by the scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationTarget {
    /// The label of a cast instruction's type-argument use.
    Cast(Label),
    /// The label of the tested instruction.
    TypeTest(Label),
    /// Any other target kind, named for diagnostics.
    Other(String, Label),
}

impl AnnotationTarget {
    /// The label this target addresses.
    pub fn label(&self) -> Label {
        match self {
            AnnotationTarget::Cast(l) => *l,
            AnnotationTarget::TypeTest(l) => *l,
            AnnotationTarget::Other(_, l) => *l,
        }
    }
}

/// A location-tagged type annotation attached to a method body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAnnotation {
    pub target: AnnotationTarget,
    /// Name of the marker type the annotation references.
    pub marker: String,
    /// Per-use-site tag parameters.
    pub params: TagParams,
    pub retention: Retention,
}

impl TypeAnnotation {
    /// Annotation on a cast instruction.
    pub fn on_cast(label: Label, marker: impl Into<String>) -> Self {
        Self {
            target: AnnotationTarget::Cast(label),
            marker: marker.into(),
            params: TagParams::new(),
            retention: Retention::Visible,
        }
    }

    /// Annotation on a type-test instruction.
    pub fn on_type_test(label: Label, marker: impl Into<String>) -> Self {
        Self {
            target: AnnotationTarget::TypeTest(label),
            marker: marker.into(),
            params: TagParams::new(),
            retention: Retention::Visible,
        }
    }

    /// Set the tag parameters.
    pub fn with_params(mut self, params: TagParams) -> Self {
        self.params = params;
        self
    }

    /// Set the retention class.
    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }
}

/// One method's compiled body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodBody {
    pub name: String,
    pub elements: Vec<CodeElement>,
    pub annotations: Vec<TypeAnnotation>,
}

impl MethodBody {
    /// Create an empty method body.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Append a label mark.
    pub fn mark(mut self, label: Label) -> Self {
        self.elements.push(CodeElement::Mark(label));
        self
    }

    /// Append an instruction.
    pub fn instr(mut self, instruction: Instruction) -> Self {
        self.elements.push(CodeElement::Instr(instruction));
        self
    }

    /// Attach a type annotation.
    pub fn annotate(mut self, annotation: TypeAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Iterate over the instructions, skipping marks.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.elements.iter().filter_map(|e| match e {
            CodeElement::Instr(i) => Some(i),
            CodeElement::Mark(_) => None,
        })
    }
}

/// A compiled unit: a named collection of method bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub name: String,
    pub methods: Vec<MethodBody>,
}

impl CompiledUnit {
    /// Create an empty unit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Add a method body.
    pub fn method(mut self, method: MethodBody) -> Self {
        self.methods.push(method);
        self
    }

    /// Find a method by name.
    pub fn find_method(&self, name: &str) -> Option<&MethodBody> {
        self.methods.iter().find(|m| m.name == name)
    }
}
