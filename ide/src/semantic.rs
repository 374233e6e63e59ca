//! Request-scoped façade over the engine's [`TypeChecker`].
//!
//! Node and symbol queries are memoized for the lifetime of one request; the engine may be
//! slow and several stages ask about the same candidates.

use std::cell::RefCell;
use std::collections::HashMap;

use analyzer::NodeId;
use analyzer::semantic::{PropertySig, Signature, Symbol, SymbolId, Ty, TypeChecker};

pub(crate) struct TypeQueries<'a> {
    checker: &'a dyn TypeChecker,
    node_types: RefCell<HashMap<NodeId, Option<Ty>>>,
    contextual_types: RefCell<HashMap<NodeId, Option<Ty>>>,
    symbol_types: RefCell<HashMap<SymbolId, Option<Ty>>>,
}

impl<'a> TypeQueries<'a> {
    pub(crate) fn new(checker: &'a dyn TypeChecker) -> Self {
        Self {
            checker,
            node_types: RefCell::default(),
            contextual_types: RefCell::default(),
            symbol_types: RefCell::default(),
        }
    }

    pub(crate) fn type_of_node(&self, node: NodeId) -> Option<Ty> {
        memoized(&self.node_types, node, || self.checker.type_of_node(node))
    }

    pub(crate) fn contextual_type(&self, node: NodeId) -> Option<Ty> {
        memoized(&self.contextual_types, node, || {
            self.checker.contextual_type(node)
        })
    }

    pub(crate) fn type_of_symbol(&self, symbol: SymbolId) -> Option<Ty> {
        memoized(&self.symbol_types, symbol, || {
            self.checker.type_of_symbol(symbol)
        })
    }

    pub(crate) fn symbol(&self, symbol: SymbolId) -> Option<&'a Symbol> {
        self.checker.symbol(symbol)
    }

    /// Properties visible on every member of `ty`, in declaration order of the first member.
    pub(crate) fn properties_of(&self, ty: &Ty) -> Vec<PropertySig> {
        match ty {
            Ty::Object(obj) => obj.properties.clone(),
            Ty::Union(members) => {
                let mut objects = members.iter().filter_map(Ty::as_object);
                let Some(first) = objects.next() else {
                    return Vec::new();
                };
                let rest: Vec<_> = objects.collect();
                first
                    .properties
                    .iter()
                    .filter(|prop| {
                        rest.iter()
                            .all(|other| other.properties.iter().any(|p| p.name == prop.name))
                    })
                    .cloned()
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    pub(crate) fn call_signatures(&self, ty: &Ty) -> Vec<Signature> {
        ty.call_signatures().to_vec()
    }

    pub(crate) fn construct_signatures(&self, ty: &Ty) -> Vec<Signature> {
        ty.construct_signatures().to_vec()
    }

    pub(crate) fn is_union(&self, ty: &Ty) -> bool {
        ty.is_union()
    }

    pub(crate) fn widen_literal(&self, ty: &Ty) -> Ty {
        ty.widen_literal()
    }
}

/// Looks `key` up in `cache`, computing and storing it on a miss.
///
/// When the cache is already borrowed (a query re-entered through the engine) the value is
/// computed without caching.
fn memoized<K, F>(cache: &RefCell<HashMap<K, Option<Ty>>>, key: K, compute: F) -> Option<Ty>
where
    K: std::hash::Hash + Eq + Copy,
    F: FnOnce() -> Option<Ty>,
{
    let hit = cache
        .try_borrow()
        .ok()
        .and_then(|cache| cache.get(&key).cloned());
    if let Some(hit) = hit {
        return hit;
    }
    let value = compute();
    if let Ok(mut cache) = cache.try_borrow_mut() {
        cache.insert(key, value.clone());
    }
    value
}
