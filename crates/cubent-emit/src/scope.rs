//! Variable scoping for the Emitter (spec §4.3, §4.4).
//!
//! Grounded on `faxc-sem/src/scope.rs`'s arena-of-ribs shape (`RibId`/`Rib`/
//! `ScopeTree`), re-keyed to plain `String` names and [`CubentType`] instead
//! of the teacher's `Symbol`/`DefId` (Cubent has no interner — the original
//! `original_source/src/compiler.py::Scope` keys on `dict[str, CubentType]`
//! directly). The teacher's `ScopeTree` tracks one mutable `current_rib`
//! cursor with `enter_scope`/`exit_scope`; here the Emitter recurses
//! explicitly for every `DO_IF` block and threads a [`ScopeId`] through the
//! call, so the tree only needs to hand out child scopes, not track a
//! cursor.

use std::collections::HashMap;

use cubent_par::CubentType;

/// Identifies a scope within a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope {
    bindings: HashMap<String, CubentType>,
    parent: Option<ScopeId>,
}

/// An arena of lexical scopes. One tree per top-level function body; a
/// `DO_IF` block gets a fresh child scope of its enclosing scope so that
/// variables it declares don't leak out, while it can still read anything
/// declared further up (spec §4.4).
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    /// Creates a tree with a single root scope and returns its id.
    pub fn new() -> (Self, ScopeId) {
        let tree = ScopeTree { scopes: vec![Scope { bindings: HashMap::new(), parent: None }] };
        (tree, ScopeId(0))
    }

    /// Allocates a new scope whose parent is `parent`.
    pub fn child(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope { bindings: HashMap::new(), parent: Some(parent) });
        ScopeId(self.scopes.len() - 1)
    }

    /// Declares `name` in `scope`. Returns `false` if already declared in
    /// that exact scope (shadowing an outer scope's binding is allowed).
    pub fn declare(&mut self, scope: ScopeId, name: &str, ty: CubentType) -> bool {
        let bindings = &mut self.scopes[scope.0].bindings;
        if bindings.contains_key(name) {
            return false;
        }
        bindings.insert(name.to_string(), ty);
        true
    }

    /// Resolves `name` starting at `scope`, walking up through parents.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<CubentType> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let rib = &self.scopes[id.0];
            if let Some(ty) = rib.bindings.get(name) {
                return Some(*ty);
            }
            current = rib.parent;
        }
        None
    }
}
