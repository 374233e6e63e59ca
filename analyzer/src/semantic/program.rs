use std::collections::HashMap;

use super::{Symbol, SymbolId, Ty, TypeChecker};
use crate::NodeId;

/// In-memory [`TypeChecker`] populated by the host.
#[derive(Debug, Clone, Default)]
pub struct Program {
    symbols: Vec<Symbol>,
    symbol_types: HashMap<SymbolId, Ty>,
    node_types: HashMap<NodeId, Ty>,
    contextual_types: HashMap<NodeId, Ty>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbol(&mut self, symbol: Symbol, ty: Option<Ty>) -> SymbolId {
        let id = SymbolId(u32::try_from(self.symbols.len()).unwrap_or(u32::MAX));
        self.symbols.push(symbol);
        if let Some(ty) = ty {
            self.symbol_types.insert(id, ty);
        }
        id
    }

    pub fn set_node_type(&mut self, node: NodeId, ty: Ty) {
        self.node_types.insert(node, ty);
    }

    pub fn set_contextual_type(&mut self, node: NodeId, ty: Ty) {
        self.contextual_types.insert(node, ty);
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(idx, symbol)| (SymbolId(idx as u32), symbol))
    }
}

impl TypeChecker for Program {
    fn type_of_node(&self, node: NodeId) -> Option<Ty> {
        self.node_types.get(&node).cloned()
    }

    fn contextual_type(&self, node: NodeId) -> Option<Ty> {
        self.contextual_types.get(&node).cloned()
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    fn type_of_symbol(&self, id: SymbolId) -> Option<Ty> {
        self.symbol_types.get(&id).cloned()
    }
}
