//! Main semantic analyzer
//!
//! Analysis runs in two passes over a `Program`:
//! - hoisting registers every package-level name and resolves type
//!   definitions, signatures and method sets, so declarations may refer to
//!   each other regardless of order;
//! - the walk checks initializers and function bodies statement by
//!   statement, pushing a scope for every block, header and case clause.
//!   A package-level initializer referring to a later one checks that one
//!   first, so inferred global types never depend on declaration order.
//!
//! Statement and expression rules live in `statements.rs` and
//! `expressions.rs`; this module holds the shared state, type resolution
//! and the assignability relation.

use super::builtins;
use super::error::SemanticError;
use super::symbols::{ScopeKind, Symbol, SymbolKind, SymbolTable};
use super::types::{FuncType, Type};
use crate::ast::{
    ConstDecl, Decl, Expr, FuncDecl, FuncSig, Ident, MethodSpec, Program, TypeDecl, TypeDef, TypeExpr,
    BinaryOp, UnaryOp, VarDecl,
};
use crate::lexer::Position;
use log::{debug, trace};
use std::collections::HashMap;

/// Result of semantic analysis
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Package-level symbols plus, when retained, nested ones
    pub symbol_table: Vec<Symbol>,
    /// Errors ordered by position
    pub errors: Vec<SemanticError>,
}

/// Configuration for semantic analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Maximum number of errors collected per phase
    pub max_errors: Option<usize>,
    /// Keep symbols of nested scopes in the final table
    pub retain_nested_symbols: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_errors: Some(100),
            retain_nested_symbols: true,
        }
    }
}

/// A method declared on a package-level type
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub sig: FuncType,
    pub pointer_receiver: bool,
}

/// Constructs `break`, `continue` and `fallthrough` may refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Breakable {
    Loop,
    Switch,
}

/// A package-level `var` or `const` spec awaiting its initializer check
#[derive(Debug, Clone)]
struct GlobalSpec {
    names: Vec<Ident>,
    ty: Option<TypeExpr>,
    values: Vec<Expr>,
    kind: SymbolKind,
}

#[derive(Debug, Clone)]
enum GlobalInit {
    Pending(GlobalSpec),
    InProgress,
    Done,
}

/// Main semantic analyzer
pub struct SemanticAnalyzer {
    config: AnalyzerConfig,
    pub(super) symbols: SymbolTable,
    /// Definitions of named types, possibly naming another named type
    pub(super) types: HashMap<String, Type>,
    pub(super) methods: HashMap<String, Vec<Method>>,
    /// Resolved type expressions keyed by their start position
    resolved: HashMap<Position, Type>,
    /// Values of integer constants keyed by declaration line and column
    pub(super) const_values: HashMap<(usize, usize), i64>,
    /// Result types of the function being walked
    pub(super) current_results: Option<Vec<Type>>,
    pub(super) breakables: Vec<Breakable>,
    /// Package-level specs keyed by the line and column of their first name
    globals: HashMap<(usize, usize), GlobalInit>,
    /// Spec key of every package-level variable and constant name
    global_owners: HashMap<(usize, usize), (usize, usize)>,
    errors: Vec<SemanticError>,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnalyzer {
    /// Create a new semantic analyzer with default configuration
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create a new semantic analyzer with custom configuration
    pub fn with_config(config: AnalyzerConfig) -> Self {
        let mut symbols = SymbolTable::new(config.retain_nested_symbols);
        for symbol in builtins::universe() {
            let inserted = symbols.insert(symbol).is_ok();
            debug_assert!(inserted, "duplicate universe name");
        }
        Self {
            config,
            symbols,
            types: builtins::predeclared_types().into_iter().collect(),
            methods: HashMap::new(),
            resolved: HashMap::new(),
            const_values: HashMap::new(),
            current_results: None,
            breakables: Vec::new(),
            globals: HashMap::new(),
            global_owners: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Perform complete semantic analysis on a program
    pub fn analyze(&mut self, program: &Program) -> AnalysisResult {
        self.symbols.enter_scope(ScopeKind::Package);

        self.hoist(program);
        self.walk(program);

        let table = std::mem::replace(&mut self.symbols, SymbolTable::new(self.config.retain_nested_symbols));
        let mut symbol_table = table.finish();
        for symbol in symbol_table.iter_mut() {
            if symbol.kind == SymbolKind::Type {
                if let Some(def) = self.types.get(&symbol.name) {
                    symbol.declared_type = self.underlying(def);
                }
            }
        }

        let mut errors = std::mem::take(&mut self.errors);
        errors.sort_by_key(|e| (e.line(), e.column()));
        if let Some(max_errors) = self.config.max_errors {
            errors.truncate(max_errors);
        }
        debug!(
            "semantic analysis finished: {} symbols, {} errors",
            symbol_table.len(),
            errors.len()
        );

        AnalysisResult { symbol_table, errors }
    }

    /// Add a semantic error. The cap is applied once all errors are sorted.
    pub(super) fn add_error(&mut self, error: SemanticError) {
        trace!("semantic error: {}", error);
        self.errors.push(error);
    }

    /// Bind a symbol in the current scope, reporting a redeclaration.
    /// The blank identifier is never bound.
    pub(super) fn declare(&mut self, symbol: Symbol, position: Position) -> bool {
        if symbol.name == "_" {
            return false;
        }
        let name = symbol.name.clone();
        match self.symbols.insert(symbol) {
            Ok(()) => true,
            Err(_) => {
                self.add_error(SemanticError::Redeclared { name, position });
                false
            }
        }
    }

    // ---------------------------------------------------------------------
    // Hoisting
    // ---------------------------------------------------------------------

    fn hoist(&mut self, program: &Program) {
        for import in &program.imports {
            let symbol = Symbol::new(
                import.package_name(),
                SymbolKind::Package,
                Type::Package(import.path.clone()),
                import.span.start,
            );
            self.declare(symbol, import.span.start);
        }

        // Names first, in source order, so redeclarations are reported at
        // the later declaration whatever its kind
        let mut type_decls = Vec::new();
        for decl in &program.decls {
            match decl {
                Decl::Type(decl) => {
                    let symbol = Self::symbol_for(&decl.name, SymbolKind::Type, Type::Named(decl.name.name.clone()));
                    if self.declare(symbol, decl.name.span.start) {
                        type_decls.push(decl);
                    }
                }
                Decl::Func(decl) => {
                    let symbol = Self::symbol_for(&decl.name, SymbolKind::Func, Type::Func(FuncType::default()));
                    self.declare(symbol, decl.name.span.start);
                }
                Decl::Var(decl) => {
                    self.hoist_names(&decl.names, SymbolKind::Var);
                    self.register_global(&decl.names, decl.ty.as_ref(), &decl.values, SymbolKind::Var);
                }
                Decl::Const(decl) => {
                    self.hoist_names(&decl.names, SymbolKind::Const);
                    self.register_global(&decl.names, decl.ty.as_ref(), &decl.values, SymbolKind::Const);
                }
                Decl::Method(_) => {}
            }
        }

        for decl in &program.decls {
            if let Decl::Const(decl) = decl {
                self.record_const_values(&decl.names, &decl.values);
            }
        }

        for decl in &type_decls {
            let def = self.resolve_type_def(decl);
            self.types.insert(decl.name.name.clone(), def);
        }
        for decl in &type_decls {
            let name = &decl.name.name;
            if self.is_recursive(name) {
                self.add_error(SemanticError::invalid(
                    format!("invalid recursive type {}", name),
                    decl.name.span.start,
                ));
                self.types.insert(name.clone(), Type::Error);
            }
        }

        for decl in &program.decls {
            match decl {
                Decl::Func(decl) => {
                    let sig = self.resolve_signature(&decl.sig);
                    self.check_main_signature(decl, &sig, &program.package);
                    self.symbols.set_type(&decl.name.name, decl.name.span.start, Type::Func(sig));
                }
                Decl::Method(decl) => self.hoist_method(decl),
                Decl::Var(VarDecl { names, ty: Some(ty), .. }) | Decl::Const(ConstDecl { names, ty: Some(ty), .. }) => {
                    let declared = self.resolve_type(ty);
                    for name in names {
                        self.symbols.set_type(&name.name, name.span.start, declared.clone());
                    }
                }
                _ => {}
            }
        }

        debug!(
            "hoisted {} declarations, {} named types",
            program.decls.len(),
            type_decls.len()
        );
    }

    fn symbol_for(ident: &Ident, kind: SymbolKind, ty: Type) -> Symbol {
        Symbol::new(ident.name.clone(), kind, ty, ident.span.start)
    }

    /// Package-level variables start with a provisional `Error` type until
    /// their initializer is checked
    fn hoist_names(&mut self, names: &[Ident], kind: SymbolKind) {
        for name in names {
            self.declare(Self::symbol_for(name, kind, Type::Error), name.span.start);
        }
    }

    fn register_global(&mut self, names: &[Ident], ty: Option<&TypeExpr>, values: &[Expr], kind: SymbolKind) {
        let Some(first) = names.first() else { return };
        let key = (first.span.start.line, first.span.start.column);
        for name in names {
            self.global_owners
                .insert((name.span.start.line, name.span.start.column), key);
        }
        let spec = GlobalSpec {
            names: names.to_vec(),
            ty: ty.cloned(),
            values: values.to_vec(),
            kind,
        };
        self.globals.insert(key, GlobalInit::Pending(spec));
    }

    /// Check the initializer of the package-level spec declaring the symbol
    /// at `line:column`, unless it is already checked. The check runs in
    /// package scope wherever the reference sits. A spec reached again while
    /// its own initializer is being checked is an initialization cycle.
    pub(super) fn resolve_global(&mut self, name: &str, line: usize, column: usize, position: Position) {
        let Some(&key) = self.global_owners.get(&(line, column)) else {
            return;
        };
        match self.globals.insert(key, GlobalInit::InProgress) {
            Some(GlobalInit::Pending(spec)) => {
                trace!("checking initializer of {} on demand", name);
                let nested = self.symbols.suspend_nested();
                self.check_value_spec(&spec.names, spec.ty.as_ref(), &spec.values, spec.kind, true);
                self.symbols.resume_nested(nested);
                self.globals.insert(key, GlobalInit::Done);
            }
            Some(GlobalInit::InProgress) => {
                self.add_error(SemanticError::invalid(format!("initialization cycle for {}", name), position));
            }
            Some(GlobalInit::Done) => {
                self.globals.insert(key, GlobalInit::Done);
            }
            None => {
                self.globals.remove(&key);
            }
        }
    }

    pub(super) fn record_const_values(&mut self, names: &[Ident], values: &[Expr]) {
        if names.len() != values.len() {
            return;
        }
        for (name, value) in names.iter().zip(values) {
            if let Some(v) = self.const_int(value) {
                self.const_values.insert((name.span.start.line, name.span.start.column), v);
            }
        }
    }

    fn resolve_type_def(&mut self, decl: &TypeDecl) -> Type {
        match &decl.def {
            TypeDef::Struct { fields } => {
                self.symbols.enter_scope(ScopeKind::Type);
                let mut resolved = Vec::with_capacity(fields.len());
                for field in fields {
                    let ty = self.resolve_type(&field.ty);
                    let symbol = Self::symbol_for(&field.name, SymbolKind::Field, ty.clone());
                    if self.declare(symbol, field.name.span.start) {
                        resolved.push((field.name.name.clone(), ty));
                    }
                }
                self.symbols.exit_scope();
                Type::Struct {
                    name: decl.name.name.clone(),
                    fields: resolved,
                }
            }
            TypeDef::Interface { methods } => Type::Interface {
                name: decl.name.name.clone(),
                methods: self.resolve_method_specs(methods),
            },
            TypeDef::Alias { target } => self.resolve_type(target),
        }
    }

    fn resolve_method_specs(&mut self, specs: &[MethodSpec]) -> Vec<(String, FuncType)> {
        let mut methods: Vec<(String, FuncType)> = Vec::with_capacity(specs.len());
        for spec in specs {
            let sig = self.resolve_signature(&spec.sig);
            if methods.iter().any(|(name, _)| *name == spec.name.name) {
                self.add_error(SemanticError::Redeclared {
                    name: spec.name.name.clone(),
                    position: spec.name.span.start,
                });
                continue;
            }
            methods.push((spec.name.name.clone(), sig));
        }
        methods
    }

    /// A type containing itself other than through an indirection
    fn is_recursive(&self, name: &str) -> bool {
        let mut visiting = Vec::new();
        match self.types.get(name) {
            Some(def) => self.contains_directly(def, name, &mut visiting),
            None => false,
        }
    }

    fn contains_directly(&self, ty: &Type, target: &str, visiting: &mut Vec<String>) -> bool {
        match ty {
            Type::Named(name) if name == target => true,
            Type::Named(name) => {
                if visiting.iter().any(|v| v == name) {
                    return false;
                }
                visiting.push(name.clone());
                match self.types.get(name) {
                    Some(def) => self.contains_directly(def, target, visiting),
                    None => false,
                }
            }
            Type::Struct { fields, .. } => fields.iter().any(|(_, t)| self.contains_directly(t, target, visiting)),
            Type::Array { elem, .. } => self.contains_directly(elem, target, visiting),
            _ => false,
        }
    }

    fn hoist_method(&mut self, decl: &FuncDecl) {
        let receiver = match &decl.receiver {
            Some(receiver) => receiver,
            None => return,
        };
        // Reports an undefined receiver type once; the walk hits the cache
        let receiver_type = self.resolve_type(&receiver.ty);
        let sig = self.resolve_signature(&decl.sig);
        let base = match receiver.base_type() {
            Some(base) => base,
            None => return,
        };
        if receiver_type.is_error() {
            return;
        }
        let local = self
            .symbols
            .lookup(&base.name)
            .map_or(false, |s| s.kind == SymbolKind::Type && s.scope_depth == 1);
        if !local {
            self.add_error(SemanticError::invalid(
                format!("cannot define new methods on non-local type {}", base.name),
                base.span.start,
            ));
            return;
        }

        let method = &decl.name;
        if let Type::Struct { fields, .. } = self.underlying(&Type::Named(base.name.clone())) {
            if fields.iter().any(|(field, _)| *field == method.name) {
                self.add_error(SemanticError::invalid(
                    format!("field and method with the same name {}", method.name),
                    method.span.start,
                ));
                return;
            }
        }
        let duplicate = self
            .methods
            .get(&base.name)
            .map_or(false, |set| set.iter().any(|m| m.name == method.name));
        if duplicate {
            self.add_error(SemanticError::Redeclared {
                name: format!("{}.{}", base.name, method.name),
                position: method.span.start,
            });
            return;
        }
        self.methods.entry(base.name.clone()).or_default().push(Method {
            name: method.name.clone(),
            sig: sig.clone(),
            pointer_receiver: receiver.is_pointer(),
        });

        let symbol = Symbol::new(
            format!("{}.{}", base.name, method.name),
            SymbolKind::Func,
            Type::Func(sig),
            method.span.start,
        );
        self.symbols.record(symbol, 1);
    }

    fn check_main_signature(&mut self, decl: &FuncDecl, sig: &FuncType, package: &Ident) {
        if package.name == "main" && decl.name.name == "main" && (!sig.params.is_empty() || !sig.results.is_empty()) {
            self.add_error(SemanticError::invalid(
                "func main must have no arguments and no return values",
                decl.name.span.start,
            ));
        }
    }

    // ---------------------------------------------------------------------
    // Walk
    // ---------------------------------------------------------------------

    fn walk(&mut self, program: &Program) {
        for decl in &program.decls {
            let first = match decl {
                Decl::Var(VarDecl { names, .. }) | Decl::Const(ConstDecl { names, .. }) => names.first(),
                _ => None,
            };
            if let Some(name) = first {
                let start = name.span.start;
                self.resolve_global(&name.name, start.line, start.column, start);
            }
        }
        for decl in &program.decls {
            if let Decl::Func(decl) | Decl::Method(decl) = decl {
                self.check_function(decl);
            }
        }
    }

    fn check_function(&mut self, decl: &FuncDecl) {
        trace!("checking function {}", decl.name.name);
        let sig = self.resolve_signature(&decl.sig);

        // Parameters and the body's top-level statements share one scope
        self.symbols.enter_scope(ScopeKind::Function);
        if let Some(receiver) = &decl.receiver {
            let ty = self.resolve_type(&receiver.ty);
            let symbol = Self::symbol_for(&receiver.name, SymbolKind::Param, ty);
            self.declare(symbol, receiver.name.span.start);
        }
        for (param, ty) in decl.sig.params.iter().zip(&sig.params) {
            if let Some(name) = &param.name {
                let symbol = Self::symbol_for(name, SymbolKind::Param, ty.clone());
                self.declare(symbol, name.span.start);
            }
        }

        let saved = self.current_results.replace(sig.results.clone());
        let saved_breakables = std::mem::take(&mut self.breakables);
        self.check_statements(&decl.body.stmts);
        self.breakables = saved_breakables;
        self.current_results = saved;

        self.symbols.exit_scope();
    }

    // ---------------------------------------------------------------------
    // Type resolution
    // ---------------------------------------------------------------------

    /// Resolve a type expression, reporting unknown names once per occurrence
    pub(super) fn resolve_type(&mut self, expr: &TypeExpr) -> Type {
        let key = expr.span().start;
        if let Some(ty) = self.resolved.get(&key) {
            return ty.clone();
        }
        let ty = self.resolve_type_uncached(expr);
        self.resolved.insert(key, ty.clone());
        ty
    }

    fn resolve_type_uncached(&mut self, expr: &TypeExpr) -> Type {
        match expr {
            TypeExpr::Named(ident) => match self.symbols.lookup(&ident.name) {
                Some(symbol) if symbol.kind == SymbolKind::Type => symbol.declared_type.clone(),
                Some(_) => {
                    self.add_error(SemanticError::invalid(
                        format!("{} is not a type", ident.name),
                        ident.span.start,
                    ));
                    Type::Error
                }
                None => {
                    self.add_error(SemanticError::UndefinedType {
                        name: ident.name.clone(),
                        position: ident.span.start,
                    });
                    Type::Error
                }
            },
            TypeExpr::Slice { elem, .. } => {
                let elem = self.resolve_type(elem);
                if elem.is_error() {
                    return Type::Error;
                }
                Type::slice_of(elem)
            }
            TypeExpr::Array { len, elem, .. } => {
                let len_value = self.const_int(len);
                let elem = self.resolve_type(elem);
                let len_value = match len_value {
                    Some(n) if n >= 0 => n,
                    Some(n) => {
                        self.add_error(SemanticError::invalid(
                            format!("invalid array length {}", n),
                            len.position(),
                        ));
                        return Type::Error;
                    }
                    None => {
                        let ty = self.check_expr(len);
                        if !ty.is_error() {
                            self.add_error(SemanticError::invalid(
                                format!("array length {} must be constant", describe(len, &ty)),
                                len.position(),
                            ));
                        }
                        return Type::Error;
                    }
                };
                if elem.is_error() {
                    return Type::Error;
                }
                Type::Array {
                    elem: Box::new(elem),
                    len: len_value,
                }
            }
            TypeExpr::Map { key, value, .. } => {
                let key_type = self.resolve_type(key);
                let value = self.resolve_type(value);
                if key_type.is_error() || value.is_error() {
                    return Type::Error;
                }
                if !self.comparable(&key_type) {
                    self.add_error(SemanticError::invalid(
                        format!("invalid map key type {}", key_type),
                        key.span().start,
                    ));
                    return Type::Error;
                }
                Type::Map {
                    key: Box::new(key_type),
                    value: Box::new(value),
                }
            }
            TypeExpr::Pointer { elem, .. } => {
                let elem = self.resolve_type(elem);
                if elem.is_error() {
                    return Type::Error;
                }
                Type::pointer_to(elem)
            }
            TypeExpr::Func { sig, .. } => Type::Func(self.resolve_signature(sig)),
            TypeExpr::Interface { methods, .. } => Type::Interface {
                name: String::new(),
                methods: self.resolve_method_specs(methods),
            },
        }
    }

    /// Resolve a signature; a variadic tail `...T` becomes `[]T`
    pub(super) fn resolve_signature(&mut self, sig: &FuncSig) -> FuncType {
        let params = sig
            .params
            .iter()
            .map(|param| {
                let ty = self.resolve_type(&param.ty);
                if param.variadic && !ty.is_error() {
                    Type::slice_of(ty)
                } else {
                    ty
                }
            })
            .collect();
        let results = sig.results.iter().map(|ty| self.resolve_type(ty)).collect();
        FuncType::new(params, results, sig.is_variadic())
    }

    /// Follow named types to their structural definition
    pub(super) fn underlying(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        for _ in 0..=self.types.len() {
            match current {
                Type::Named(ref name) => match self.types.get(name) {
                    Some(def) => current = def.clone(),
                    None => return Type::Error,
                },
                other => return other,
            }
        }
        Type::Error
    }

    // ---------------------------------------------------------------------
    // Type relations
    // ---------------------------------------------------------------------

    pub(super) fn comparable(&self, ty: &Type) -> bool {
        match self.underlying(ty) {
            Type::Slice(_) | Type::Map { .. } | Type::Func(_) => false,
            Type::Struct { fields, .. } => fields.iter().all(|(_, t)| self.comparable(t)),
            Type::Array { elem, .. } => self.comparable(&elem),
            _ => true,
        }
    }

    /// Whether a value of type `value` may be assigned to a location of
    /// type `target`
    pub(super) fn assignable(&self, value: &Type, target: &Type) -> bool {
        if value.is_error() || target.is_error() {
            return true;
        }
        if identical(value, target) {
            return true;
        }
        if matches!(value, Type::Void | Type::Tuple(_) | Type::Package(_)) {
            return false;
        }

        let target_underlying = self.underlying(target);
        match value {
            Type::UntypedNil => return target_underlying.is_nilable(),
            Type::UntypedInt => {
                if matches!(target_underlying, Type::Int | Type::Float64) {
                    return true;
                }
            }
            Type::UntypedFloat => {
                if matches!(target_underlying, Type::Float64) {
                    return true;
                }
            }
            _ => {}
        }

        if let Type::Interface { methods, .. } = &target_underlying {
            return self.implements(&value.default_type(), methods);
        }
        if value.is_untyped() {
            return false;
        }

        let value_named = matches!(value, Type::Named(_));
        let target_named = matches!(target, Type::Named(_));
        (!value_named || !target_named) && identical(&self.underlying(value), &target_underlying)
    }

    /// Whether the method set of `ty` covers every listed method
    pub(super) fn implements(&self, ty: &Type, required: &[(String, FuncType)]) -> bool {
        required.iter().all(|(name, sig)| {
            self.method_set_entry(ty, name)
                .map_or(false, |found| funcs_identical(&found, sig))
        })
    }

    /// Method `name` in the method set of `ty`: value receivers for `T`,
    /// all receivers for `*T`, declared methods for interfaces
    fn method_set_entry(&self, ty: &Type, name: &str) -> Option<FuncType> {
        let (base, through_pointer) = match ty {
            Type::Pointer(elem) => (elem.as_ref(), true),
            other => (other, false),
        };
        if let Type::Named(type_name) = base {
            if let Some(method) = self
                .methods
                .get(type_name)
                .and_then(|set| set.iter().find(|m| m.name == name))
            {
                return (through_pointer || !method.pointer_receiver).then(|| method.sig.clone());
            }
        }
        if through_pointer {
            return None;
        }
        match self.underlying(base) {
            Type::Interface { methods, .. } => methods.into_iter().find(|(n, _)| n == name).map(|(_, sig)| sig),
            _ => None,
        }
    }

    /// Common operand type of a binary operation, if any
    pub(super) fn unify(&self, left: &Type, right: &Type) -> Option<Type> {
        match (left.is_untyped(), right.is_untyped()) {
            (true, true) => match (left, right) {
                (Type::UntypedNil, Type::UntypedNil) => Some(Type::UntypedNil),
                (Type::UntypedNil, _) | (_, Type::UntypedNil) => None,
                (Type::UntypedFloat, _) | (_, Type::UntypedFloat) => Some(Type::UntypedFloat),
                _ => Some(Type::UntypedInt),
            },
            (true, false) => self.assignable(left, right).then(|| right.clone()),
            (false, true) => self.assignable(right, left).then(|| left.clone()),
            (false, false) => identical(left, right).then(|| left.clone()),
        }
    }

    /// Evaluate an integer constant expression
    pub(super) fn const_int(&self, expr: &Expr) -> Option<i64> {
        match expr {
            Expr::IntLit { value, .. } => *value,
            Expr::Paren { inner, .. } => self.const_int(inner),
            Expr::Unary { op: UnaryOp::Negate, operand, .. } => self.const_int(operand)?.checked_neg(),
            Expr::Unary { op: UnaryOp::Plus, operand, .. } => self.const_int(operand),
            Expr::Binary { op, left, right, .. } => {
                let l = self.const_int(left)?;
                let r = self.const_int(right)?;
                match op {
                    BinaryOp::Add => l.checked_add(r),
                    BinaryOp::Subtract => l.checked_sub(r),
                    BinaryOp::Multiply => l.checked_mul(r),
                    BinaryOp::Divide => l.checked_div(r),
                    BinaryOp::Modulo => l.checked_rem(r),
                    BinaryOp::LeftShift => u32::try_from(r).ok().and_then(|r| l.checked_shl(r)),
                    BinaryOp::RightShift => u32::try_from(r).ok().and_then(|r| l.checked_shr(r)),
                    BinaryOp::BitwiseAnd => Some(l & r),
                    BinaryOp::BitwiseOr => Some(l | r),
                    BinaryOp::BitwiseXor => Some(l ^ r),
                    BinaryOp::AndNot => Some(l & !r),
                    _ => None,
                }
            }
            Expr::Ident(ident) => {
                let symbol = self.symbols.lookup(&ident.name)?;
                if symbol.kind != SymbolKind::Const {
                    return None;
                }
                self.const_values.get(&(symbol.decl_line, symbol.decl_column)).copied()
            }
            _ => None,
        }
    }
}

/// Structural type identity; named types are identical only to themselves
pub(super) fn identical(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Interface { methods: m1, .. }, Type::Interface { methods: m2, .. }) => {
            m1.len() == m2.len()
                && m1
                    .iter()
                    .all(|(name, sig)| m2.iter().any(|(n, s)| n == name && funcs_identical(sig, s)))
        }
        (Type::Slice(x), Type::Slice(y)) | (Type::Pointer(x), Type::Pointer(y)) => identical(x, y),
        (Type::Array { elem: x, len: n }, Type::Array { elem: y, len: m }) => n == m && identical(x, y),
        (Type::Map { key: k1, value: v1 }, Type::Map { key: k2, value: v2 }) => identical(k1, k2) && identical(v1, v2),
        (Type::Func(f), Type::Func(g)) => funcs_identical(f, g),
        (Type::Tuple(xs), Type::Tuple(ys)) => xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| identical(x, y)),
        _ => a == b,
    }
}

pub(super) fn funcs_identical(f: &FuncType, g: &FuncType) -> bool {
    f.variadic == g.variadic
        && f.params.len() == g.params.len()
        && f.results.len() == g.results.len()
        && f.params.iter().zip(&g.params).all(|(x, y)| identical(x, y))
        && f.results.iter().zip(&g.results).all(|(x, y)| identical(x, y))
}

/// Operand description used in messages: `x (value of type int)`
pub(super) fn describe(expr: &Expr, ty: &Type) -> String {
    match ty {
        Type::UntypedNil => "nil".to_string(),
        t if t.is_untyped() => format!("{} ({} constant)", expr, t),
        t => format!("{} (value of type {})", expr, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn analyze(source: &str) -> AnalysisResult {
        let mut parser = Parser::new(source);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "syntax errors: {:?}", parser.errors());
        SemanticAnalyzer::new().analyze(&program)
    }

    fn messages(source: &str) -> Vec<String> {
        analyze(source).errors.iter().map(|e| e.to_string()).collect()
    }

    fn symbol<'a>(result: &'a AnalysisResult, name: &str) -> &'a Symbol {
        result
            .symbol_table
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("no symbol {}", name))
    }

    #[test]
    fn test_analyzer_config() {
        let config = AnalyzerConfig {
            max_errors: Some(1),
            retain_nested_symbols: false,
        };
        let analyzer = SemanticAnalyzer::with_config(config.clone());
        assert_eq!(analyzer.config(), &config);
        assert_eq!(AnalyzerConfig::default().max_errors, Some(100));
    }

    #[test]
    fn test_max_errors_caps_collection() {
        let mut parser = Parser::new("package main\nfunc main() { a = 1; b = 2; c = 3 }\n");
        let program = parser.parse_program();
        let config = AnalyzerConfig {
            max_errors: Some(2),
            ..AnalyzerConfig::default()
        };
        let result = SemanticAnalyzer::with_config(config).analyze(&program);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_max_errors_keeps_earliest_by_position() {
        // Globals are walked before function bodies
        let source = "package main\nfunc main() { x := missing; _ = x }\nvar g int = \"s\"\n";
        let mut parser = Parser::new(source);
        let program = parser.parse_program();
        let config = AnalyzerConfig {
            max_errors: Some(1),
            ..AnalyzerConfig::default()
        };
        let result = SemanticAnalyzer::with_config(config).analyze(&program);
        let errors: Vec<_> = result.errors.iter().map(|e| (e.line(), e.to_string())).collect();
        assert_eq!(errors, vec![(2, "undeclared identifier: missing".to_string())]);
        assert_eq!(messages(source).len(), 2);
    }

    #[test]
    fn test_inferred_globals_resolve_in_dependency_order() {
        let errors = messages("package main\nvar a = b\nvar b = 1\nfunc main() { var s string = a; s = s }\n");
        assert_eq!(
            errors,
            vec!["cannot use a (value of type int) as string value in variable declaration"]
        );

        let result = analyze(
            "package main\n\
             var total = scale * base\n\
             const scale = 2.5\n\
             var base float64 = 4\n",
        );
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(symbol(&result, "total").declared_type, Type::Float64);
        assert_eq!(symbol(&result, "scale").declared_type, Type::UntypedFloat);
    }

    #[test]
    fn test_global_initializer_ignores_locals_at_reference() {
        let result = analyze(
            "package main\n\
             func main() { b := \"local\"; var n int = a; n = n; _ = b }\n\
             var a = b\n\
             var b = 1\n",
        );
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(symbol(&result, "a").declared_type, Type::Int);
    }

    #[test]
    fn test_initialization_cycle() {
        assert_eq!(messages("package main\nvar a = b\nvar b = a\n"), vec!["initialization cycle for a"]);
        assert_eq!(messages("package main\nvar x = x + 1\n"), vec!["initialization cycle for x"]);
        let result = analyze("package main\nvar a = b\nvar b = a\n");
        assert_eq!(result.errors[0].line(), 3);
        assert_eq!(symbol(&result, "b").declared_type, Type::Error);
    }

    #[test]
    fn test_forward_references_resolve() {
        let errors = messages(
            "package main\n\
             func main() { p := NewPoint(1, 2); total = total + p.X }\n\
             var total int\n\
             func NewPoint(x, y int) Point { return Point{X: x, Y: y} }\n\
             type Point struct { X, Y int }\n",
        );
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_type_symbols_report_definition() {
        let result = analyze("package main\ntype Point struct { X int; Y int }\n");
        let point = symbol(&result, "Point");
        assert_eq!(point.kind, SymbolKind::Type);
        assert_eq!(point.declared_type.to_string(), "struct{X int; Y int}");
        assert_eq!(point.scope_depth, 1);
    }

    #[test]
    fn test_recursive_type() {
        let errors = messages("package main\ntype Node struct { next Node }\ntype List struct { head *List }\n");
        assert_eq!(errors, vec!["invalid recursive type Node"]);
    }

    #[test]
    fn test_undefined_type_reported_once() {
        let errors = messages("package main\nfunc f(a Thing) Thing { return a }\n");
        assert_eq!(errors, vec!["undefined type: Thing", "undefined type: Thing"]);
    }

    #[test]
    fn test_duplicate_fields_and_methods() {
        let errors = messages(
            "package main\n\
             type P struct { X int; X string }\n\
             func (p P) Len() int { return 1 }\n\
             func (p *P) Len() int { return 2 }\n",
        );
        assert_eq!(errors, vec!["redeclared in this scope: X", "redeclared in this scope: P.Len"]);
    }

    #[test]
    fn test_methods_on_non_local_types() {
        let errors = messages("package main\nfunc (n int) Double() int { return n * 2 }\n");
        assert_eq!(errors, vec!["cannot define new methods on non-local type int"]);
    }

    #[test]
    fn test_method_symbols_are_recorded() {
        let result = analyze(
            "package main\ntype C struct { r float64 }\nfunc (c C) Area() float64 { return c.r * c.r }\n",
        );
        let area = symbol(&result, "C.Area");
        assert_eq!(area.kind, SymbolKind::Func);
        assert_eq!(area.declared_type.to_string(), "func() float64");
    }

    #[test]
    fn test_interface_satisfaction() {
        let source = "package main\n\
             type Shape interface { Area() float64 }\n\
             type Sq struct { s float64 }\n\
             func (q Sq) Area() float64 { return q.s * q.s }\n\
             type Circle struct { r float64 }\n\
             func (c *Circle) Area() float64 { return c.r }\n\
             func main() {\n\
             var a Shape = Sq{2.0}\n\
             var b Shape = &Circle{1.0}\n\
             var c Shape = Circle{1.0}\n\
             }\n";
        let errors = messages(source);
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert!(errors[0].starts_with("cannot use Circle{...}"), "{}", errors[0]);
    }

    #[test]
    fn test_assignability_rules() {
        let analyzer = SemanticAnalyzer::new();
        assert!(analyzer.assignable(&Type::UntypedInt, &Type::Float64));
        assert!(!analyzer.assignable(&Type::UntypedFloat, &Type::Int));
        assert!(analyzer.assignable(&Type::UntypedNil, &Type::slice_of(Type::Int)));
        assert!(!analyzer.assignable(&Type::UntypedNil, &Type::String));
        assert!(analyzer.assignable(&Type::String, &builtins::any_type()));
        assert!(!analyzer.assignable(&Type::Int, &Type::Float64));
        assert!(analyzer.assignable(&Type::Error, &Type::Int));
    }

    #[test]
    fn test_const_int_evaluation() {
        let mut parser = Parser::new("package main\nconst N = 4\nvar grid [N * 2]int\n");
        let program = parser.parse_program();
        let result = SemanticAnalyzer::new().analyze(&program);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(symbol(&result, "grid").declared_type.to_string(), "[8]int");
    }

    #[test]
    fn test_main_signature() {
        let errors = messages("package main\nfunc main() int { return 0 }\n");
        assert_eq!(errors, vec!["func main must have no arguments and no return values"]);
    }

    #[test]
    fn test_redeclared_across_kinds() {
        let errors = messages("package main\nvar f = 1\nfunc f() {}\n");
        assert_eq!(errors, vec!["redeclared in this scope: f"]);
        let result = analyze("package main\nvar f = 1\nfunc f() {}\n");
        assert_eq!(result.errors[0].line(), 3);
    }
}
