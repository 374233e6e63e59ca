//! Type model and the engine's type-checking capability.
//!
//! [`TypeChecker`] is the seam the completion pipeline queries; [`Program`] is the
//! in-memory implementation hosts populate from their own checker.

mod display;
mod program;
mod symbol;

pub use program::Program;
pub use symbol::{Declaration, Symbol, SymbolId, SymbolKind};

use serde::{Deserialize, Serialize};

use crate::NodeId;

/// Read-only type queries answered by the analysis engine.
///
/// Implementations may be slow (they can walk large dependency graphs); callers are
/// expected to query lazily.
pub trait TypeChecker {
    /// Type of the expression rooted at `node`.
    fn type_of_node(&self, node: NodeId) -> Option<Ty>;

    /// Type the surrounding context expects at `node` (e.g. a declared property type).
    fn contextual_type(&self, node: NodeId) -> Option<Ty>;

    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    fn type_of_symbol(&self, id: SymbolId) -> Option<Ty>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Ty {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    String,
    Number,
    Boolean,
    BigInt,
    StringLiteral(String),
    NumberLiteral(String),
    BooleanLiteral(bool),
    EnumMember { enum_name: String, member: String },
    Array(Box<Ty>),
    Promise(Box<Ty>),
    Object(Box<ObjectTy>),
    Union(Vec<Ty>),
    /// Opaque named type the model does not expand (`Date`, `JSX.Element`, ...).
    Named(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTy {
    pub name: Option<String>,
    pub properties: Vec<PropertySig>,
    pub call_signatures: Vec<Signature>,
    pub construct_signatures: Vec<Signature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySig {
    pub name: String,
    pub ty: Ty,
    pub optional: bool,
    pub symbol: Option<SymbolId>,
}

impl PropertySig {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            symbol: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_symbol(mut self, symbol: SymbolId) -> Self {
        self.symbol = Some(symbol);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<Param>,
    pub ret: Ty,
}

impl Signature {
    pub fn new(params: Vec<Param>, ret: Ty) -> Self {
        Self { params, ret }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
    pub optional: bool,
    pub rest: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            rest: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }
}

impl Ty {
    /// Object type with a single call signature.
    pub fn function(params: Vec<Param>, ret: Ty) -> Ty {
        Ty::Object(Box::new(ObjectTy {
            call_signatures: vec![Signature::new(params, ret)],
            ..ObjectTy::default()
        }))
    }

    pub fn object(properties: Vec<PropertySig>) -> Ty {
        Ty::Object(Box::new(ObjectTy {
            properties,
            ..ObjectTy::default()
        }))
    }

    pub fn array(element: Ty) -> Ty {
        Ty::Array(Box::new(element))
    }

    pub fn promise(inner: Ty) -> Ty {
        Ty::Promise(Box::new(inner))
    }

    pub fn string_literal(value: impl Into<String>) -> Ty {
        Ty::StringLiteral(value.into())
    }

    pub fn enum_member(enum_name: impl Into<String>, member: impl Into<String>) -> Ty {
        Ty::EnumMember {
            enum_name: enum_name.into(),
            member: member.into(),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectTy> {
        match self {
            Ty::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn call_signatures(&self) -> &[Signature] {
        self.as_object()
            .map(|obj| obj.call_signatures.as_slice())
            .unwrap_or_default()
    }

    pub fn construct_signatures(&self) -> &[Signature] {
        self.as_object()
            .map(|obj| obj.construct_signatures.as_slice())
            .unwrap_or_default()
    }

    pub fn is_callable(&self) -> bool {
        !self.call_signatures().is_empty()
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Ty::Union(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Ty::StringLiteral(_)
                | Ty::NumberLiteral(_)
                | Ty::BooleanLiteral(_)
                | Ty::EnumMember { .. }
        )
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }

    pub fn is_promise_of_void(&self) -> bool {
        matches!(self, Ty::Promise(inner) if inner.is_void())
    }

    /// Union members, or the type itself for non-unions.
    pub fn members(&self) -> &[Ty] {
        match self {
            Ty::Union(members) => members,
            other => std::slice::from_ref(other),
        }
    }

    /// Replaces literal types with their base primitive, deduplicating union members.
    pub fn widen_literal(&self) -> Ty {
        match self {
            Ty::StringLiteral(_) => Ty::String,
            Ty::NumberLiteral(_) => Ty::Number,
            Ty::BooleanLiteral(_) => Ty::Boolean,
            Ty::EnumMember { enum_name, .. } => Ty::Named(enum_name.clone()),
            Ty::Union(members) => {
                let mut widened: Vec<Ty> = Vec::with_capacity(members.len());
                for member in members {
                    let member = member.widen_literal();
                    if !widened.contains(&member) {
                        widened.push(member);
                    }
                }
                if widened.len() == 1 {
                    widened.pop().unwrap_or(Ty::Never)
                } else {
                    Ty::Union(widened)
                }
            }
            other => other.clone(),
        }
    }
}

/// Coarse assignability check used for ranking.
pub fn ty_accepts(expected: &Ty, actual: &Ty) -> bool {
    if matches!(expected, Ty::Any | Ty::Unknown) || matches!(actual, Ty::Any) {
        return true;
    }
    if matches!(actual, Ty::Never) {
        return true;
    }
    match (expected, actual) {
        (expected, Ty::Union(actual_members)) => {
            actual_members.iter().all(|a| ty_accepts(expected, a))
        }
        (Ty::Union(branches), actual) => branches.iter().any(|t| ty_accepts(t, actual)),
        (Ty::String, Ty::StringLiteral(_))
        | (Ty::Number, Ty::NumberLiteral(_))
        | (Ty::Boolean, Ty::BooleanLiteral(_)) => true,
        (Ty::Named(name), Ty::EnumMember { enum_name, .. }) => name == enum_name,
        (Ty::Array(e), Ty::Array(a)) | (Ty::Promise(e), Ty::Promise(a)) => ty_accepts(e, a),
        (Ty::Object(e), Ty::Object(a)) => e.properties.iter().all(|prop| {
            prop.optional
                || a.properties
                    .iter()
                    .any(|other| other.name == prop.name && ty_accepts(&prop.ty, &other.ty))
        }),
        _ => expected == actual,
    }
}
