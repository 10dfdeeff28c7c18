//! Symbol table and scope management
//!
//! Scopes form a stack: the universe (depth 0) holds predeclared names, the
//! package scope (depth 1) holds top-level declarations and every function,
//! block and clause pushes one more. Symbols of a popped scope are copied
//! into a flat list so the final report can show nested declarations.

use super::types::Type;
use crate::lexer::Position;
use log::trace;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Types of symbols in the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Var,
    Const,
    Func,
    Type,
    Param,
    Field,
    Package,
    Builtin,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SymbolKind::Var => "var",
            SymbolKind::Const => "const",
            SymbolKind::Func => "func",
            SymbolKind::Type => "type",
            SymbolKind::Param => "param",
            SymbolKind::Field => "field",
            SymbolKind::Package => "package",
            SymbolKind::Builtin => "builtin",
        };
        f.write_str(text)
    }
}

/// Symbol entry in the symbol table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub declared_type: Type,
    pub is_mutable: bool,
    pub decl_line: usize,
    pub decl_column: usize,
    /// Filled in by the table on insertion
    pub scope_depth: usize,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, declared_type: Type, position: Position) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_type,
            is_mutable: matches!(kind, SymbolKind::Var | SymbolKind::Param),
            decl_line: position.line,
            decl_column: position.column,
            scope_depth: 0,
        }
    }

    /// Predeclared symbols have no source position
    pub fn predeclared(name: &str, kind: SymbolKind, declared_type: Type) -> Self {
        Self::new(name, kind, declared_type, Position::new(0, 0, 0))
    }

    pub fn declared_at(&self, position: Position) -> bool {
        self.decl_line == position.line && self.decl_column == position.column
    }
}

/// Types of scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Predeclared identifiers
    Universe,
    /// Top-level declarations
    Package,
    /// Parameters and body of a function
    Function,
    /// Blocks, statement headers and case clauses
    Block,
    /// Fields of a struct type
    Type,
}

/// A scope frame: symbols in declaration order plus a name index
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            symbols: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        match self.index.get(name) {
            Some(&i) => self.symbols.get_mut(i),
            None => None,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

/// Main symbol table managing the scope stack
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    /// Symbols of scopes already exited
    retained: Vec<Symbol>,
    retain_nested: bool,
}

impl SymbolTable {
    /// Create a symbol table holding only the universe scope
    pub fn new(retain_nested: bool) -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Universe)],
            retained: Vec::new(),
            retain_nested,
        }
    }

    /// Depth of the innermost scope; the universe is 0
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.scopes.last().map_or(ScopeKind::Universe, |s| s.kind)
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
        trace!("enter {:?} scope at depth {}", kind, self.depth());
    }

    /// Exit the current scope; the universe is never popped
    pub fn exit_scope(&mut self) {
        if self.scopes.len() <= 1 {
            return;
        }
        if let Some(scope) = self.scopes.pop() {
            trace!("exit {:?} scope with {} symbols", scope.kind, scope.symbols.len());
            let nested = self.scopes.len() > 1;
            if !nested || self.retain_nested {
                self.retained.extend(scope.symbols);
            }
        }
    }

    /// Detach every scope opened inside the package scope, so lookups and
    /// `set_type` see package-level bindings as innermost
    pub fn suspend_nested(&mut self) -> Vec<Scope> {
        let keep = self.scopes.len().min(2);
        let nested = self.scopes.split_off(keep);
        if !nested.is_empty() {
            trace!("suspend {} nested scopes", nested.len());
        }
        nested
    }

    /// Reattach scopes detached by `suspend_nested`
    pub fn resume_nested(&mut self, nested: Vec<Scope>) {
        self.scopes.extend(nested);
    }

    /// Add a symbol to the current scope. A name already bound in this
    /// scope is rejected and the existing binding returned.
    pub fn insert(&mut self, mut symbol: Symbol) -> Result<(), Symbol> {
        let depth = self.depth();
        let scope = match self.scopes.last_mut() {
            Some(scope) => scope,
            None => return Ok(()),
        };
        if let Some(existing) = scope.lookup(&symbol.name) {
            return Err(existing.clone());
        }
        symbol.scope_depth = depth;
        scope.index.insert(symbol.name.clone(), scope.symbols.len());
        scope.symbols.push(symbol);
        Ok(())
    }

    /// Record a symbol for the report without binding it in any scope
    pub fn record(&mut self, mut symbol: Symbol, depth: usize) {
        symbol.scope_depth = depth;
        self.retained.push(symbol);
    }

    /// Look up a symbol by name, searching from the innermost scope outwards
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }

    /// Look up a symbol in the innermost scope only
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.lookup(name))
    }

    /// Update the type of the symbol `name` in the current scope, provided it
    /// is the binding declared at `position`
    pub fn set_type(&mut self, name: &str, position: Position, declared_type: Type) {
        if let Some(symbol) = self.scopes.last_mut().and_then(|s| s.lookup_mut(name)) {
            if symbol.declared_at(position) {
                symbol.declared_type = declared_type;
            }
        }
    }

    /// Close every open scope and return all reportable symbols (everything
    /// but the universe) ordered by declaration position
    pub fn finish(mut self) -> Vec<Symbol> {
        while self.scopes.len() > 1 {
            self.exit_scope();
        }
        let mut symbols = self.retained;
        symbols.sort_by_key(|s| (s.decl_line, s.decl_column, s.scope_depth));
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str, line: usize) -> Symbol {
        Symbol::new(name, SymbolKind::Var, Type::Int, Position::new(line, 1, 0))
    }

    #[test]
    fn test_redeclaration_in_same_scope() {
        let mut table = SymbolTable::new(true);
        table.enter_scope(ScopeKind::Package);
        assert!(table.insert(symbol("x", 2)).is_ok());
        let existing = table.insert(symbol("x", 3)).expect_err("duplicate");
        assert_eq!(existing.decl_line, 2);
    }

    #[test]
    fn test_shadowing_in_inner_scope() {
        let mut table = SymbolTable::new(true);
        table.enter_scope(ScopeKind::Package);
        table.insert(symbol("z", 1)).expect("outer");
        table.enter_scope(ScopeKind::Block);
        assert!(table.insert(symbol("z", 2)).is_ok());
        assert_eq!(table.lookup("z").map(|s| s.decl_line), Some(2));
        table.exit_scope();
        assert_eq!(table.lookup("z").map(|s| s.decl_line), Some(1));
    }

    #[test]
    fn test_depths_and_lookup_local() {
        let mut table = SymbolTable::new(true);
        assert_eq!(table.depth(), 0);
        table.enter_scope(ScopeKind::Package);
        table.insert(symbol("a", 1)).expect("insert");
        table.enter_scope(ScopeKind::Function);
        assert!(table.lookup_local("a").is_none());
        assert!(table.lookup("a").is_some());
        assert_eq!(table.depth(), 2);
    }

    #[test]
    fn test_finish_retains_nested_symbols() {
        let mut table = SymbolTable::new(true);
        table.enter_scope(ScopeKind::Package);
        table.insert(symbol("g", 1)).expect("insert");
        table.enter_scope(ScopeKind::Function);
        table.insert(symbol("local", 2)).expect("insert");
        table.exit_scope();

        let symbols = table.finish();
        let entries: Vec<_> = symbols.iter().map(|s| (s.name.as_str(), s.scope_depth)).collect();
        assert_eq!(entries, vec![("g", 1), ("local", 2)]);
    }

    #[test]
    fn test_finish_without_nested_symbols() {
        let mut table = SymbolTable::new(false);
        table.enter_scope(ScopeKind::Package);
        table.insert(symbol("g", 1)).expect("insert");
        table.enter_scope(ScopeKind::Block);
        table.insert(symbol("local", 2)).expect("insert");
        table.exit_scope();

        let names: Vec<_> = table.finish().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["g"]);
    }

    #[test]
    fn test_set_type_only_touches_matching_declaration() {
        let mut table = SymbolTable::new(true);
        table.enter_scope(ScopeKind::Package);
        table.insert(symbol("v", 4)).expect("insert");
        table.set_type("v", Position::new(9, 1, 0), Type::String);
        assert_eq!(table.lookup("v").map(|s| s.declared_type.clone()), Some(Type::Int));
        table.set_type("v", Position::new(4, 1, 0), Type::String);
        assert_eq!(table.lookup("v").map(|s| s.declared_type.clone()), Some(Type::String));
    }

    #[test]
    fn test_suspend_nested_exposes_package_scope() {
        let mut table = SymbolTable::new(true);
        table.enter_scope(ScopeKind::Package);
        table.insert(symbol("v", 1)).expect("insert");
        table.enter_scope(ScopeKind::Function);
        table.insert(symbol("v", 5)).expect("shadow");
        table.enter_scope(ScopeKind::Block);

        let nested = table.suspend_nested();
        assert_eq!(nested.len(), 2);
        assert_eq!(table.depth(), 1);
        table.set_type("v", Position::new(1, 1, 0), Type::String);
        assert_eq!(table.lookup("v").map(|s| s.decl_line), Some(1));

        table.resume_nested(nested);
        assert_eq!(table.depth(), 3);
        assert_eq!(table.lookup("v").map(|s| s.decl_line), Some(5));
        table.exit_scope();
        table.exit_scope();
        assert_eq!(table.lookup("v").map(|s| s.declared_type.clone()), Some(Type::String));
    }

    #[test]
    fn test_const_is_immutable() {
        let constant = Symbol::new("PI", SymbolKind::Const, Type::Float64, Position::new(2, 7, 0));
        assert!(!constant.is_mutable);
        assert!(symbol("x", 1).is_mutable);
    }
}
