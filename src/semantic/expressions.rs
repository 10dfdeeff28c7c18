//! Expression typing
//!
//! `check_expr` yields the type of a single value; `check_expr_multi`
//! also lets through the `Tuple` of a multi-value call and the `Void` of a
//! call without results. A sub-expression whose mistake was reported is
//! typed `Error`, and every rule accepts `Error` operands silently.

use super::analyzer::{describe, identical, SemanticAnalyzer};
use super::builtins;
use super::error::SemanticError;
use super::symbols::SymbolKind;
use super::types::{FuncType, Type};
use crate::ast::{BinaryOp, Element, Expr, Ident, UnaryOp};
use crate::lexer::Position;

impl SemanticAnalyzer {
    /// Type of an expression used as a single value
    pub(super) fn check_expr(&mut self, expr: &Expr) -> Type {
        match self.check_expr_multi(expr) {
            Type::Tuple(_) => {
                self.add_error(SemanticError::MultipleValueInSingleValueContext {
                    call: expr.to_string(),
                    position: expr.position(),
                });
                Type::Error
            }
            Type::Void => {
                self.add_error(SemanticError::NoValueUsedAsValue {
                    call: expr.to_string(),
                    position: expr.position(),
                });
                Type::Error
            }
            ty => ty,
        }
    }

    pub(super) fn check_expr_multi(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Ident(ident) => self.check_ident(ident),
            Expr::IntLit { value: Some(_), .. } => Type::UntypedInt,
            // Overflow was reported by the lexer
            Expr::IntLit { value: None, .. } => Type::Error,
            Expr::FloatLit { .. } => Type::UntypedFloat,
            Expr::StringLit { .. } => Type::String,
            Expr::BoolLit { .. } => Type::Bool,
            Expr::Paren { inner, .. } => self.check_expr_multi(inner),
            Expr::Binary { op, left, right, span } => {
                let left_type = self.check_expr(left);
                let right_type = self.check_expr(right);
                if left_type.is_error() || right_type.is_error() {
                    return Type::Error;
                }
                self.binary_result(*op, left, right, &left_type, &right_type, span.start)
            }
            Expr::Unary { op, operand, span } => self.check_unary(*op, operand, span.start),
            Expr::Call { callee, args, spread, span } => self.check_call(callee, args, *spread, span.start),
            Expr::Index { target, index, .. } => self.check_index_access(target, index).0,
            Expr::FieldAccess { target, field, .. } => self.check_selector(target, field),
            Expr::CompositeLit { ty: Some(ty), elements, span } => {
                let ty = self.resolve_type(ty);
                self.check_composite(&ty, elements, span.start)
            }
            Expr::CompositeLit { ty: None, elements, span } => {
                self.add_error(SemanticError::invalid("missing type in composite literal", span.start));
                self.check_composite(&Type::Error, elements, span.start)
            }
        }
    }

    fn check_ident(&mut self, ident: &Ident) -> Type {
        if ident.is_blank() {
            self.add_error(SemanticError::invalid("cannot use _ as value", ident.span.start));
            return Type::Error;
        }
        let global = self.symbols.lookup(&ident.name).and_then(|symbol| {
            let package_level = symbol.scope_depth == 1 && matches!(symbol.kind, SymbolKind::Var | SymbolKind::Const);
            package_level.then(|| (symbol.decl_line, symbol.decl_column))
        });
        if let Some((line, column)) = global {
            self.resolve_global(&ident.name, line, column, ident.span.start);
        }

        let (kind, ty) = match self.symbols.lookup(&ident.name) {
            Some(symbol) => (symbol.kind, symbol.declared_type.clone()),
            None => {
                self.add_error(SemanticError::Undeclared {
                    name: ident.name.clone(),
                    position: ident.span.start,
                });
                return Type::Error;
            }
        };
        let message = match kind {
            SymbolKind::Var | SymbolKind::Param | SymbolKind::Const | SymbolKind::Func | SymbolKind::Field => {
                return ty
            }
            SymbolKind::Type => format!("{} (type) is not an expression", ident.name),
            SymbolKind::Package => format!("use of package {} without selector", ident.name),
            SymbolKind::Builtin => format!("{} (built-in function) must be called", ident.name),
        };
        self.add_error(SemanticError::invalid(message, ident.span.start));
        Type::Error
    }

    /// Result type of `left op right` given both operand types
    pub(super) fn binary_result(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        left_type: &Type,
        right_type: &Type,
        position: Position,
    ) -> Type {
        if matches!(op, BinaryOp::LeftShift | BinaryOp::RightShift) {
            return self.shift_result(op, left, right, left_type, right_type, position);
        }

        let operand = match self.unify(left_type, right_type) {
            Some(ty) => ty,
            None => {
                self.add_error(SemanticError::TypeMismatch {
                    op: op.symbol().to_string(),
                    left: left_type.to_string(),
                    right: right_type.to_string(),
                    position,
                });
                return Type::Error;
            }
        };

        let underlying = self.underlying(&operand);
        let nil_operand = *left_type == Type::UntypedNil || *right_type == Type::UntypedNil;
        let defined = match op {
            BinaryOp::Add => underlying.is_numeric() || underlying == Type::String,
            BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => underlying.is_numeric(),
            BinaryOp::BitwiseAnd
            | BinaryOp::BitwiseOr
            | BinaryOp::BitwiseXor
            | BinaryOp::AndNot => underlying.is_integer(),
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => underlying == Type::Bool,
            BinaryOp::Equal | BinaryOp::NotEqual => {
                operand != Type::UntypedNil && (nil_operand || self.comparable(&operand))
            }
            _ => underlying.is_numeric() || underlying == Type::String,
        };
        if !defined {
            let (culprit, culprit_type) = if *left_type == Type::UntypedNil {
                (right, right_type)
            } else {
                (left, left_type)
            };
            self.add_error(SemanticError::OperatorNotDefined {
                op: op.symbol().to_string(),
                operand: describe(culprit, culprit_type),
                position,
            });
            return Type::Error;
        }

        if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && self.is_constant_zero(right) {
            self.add_error(SemanticError::invalid("invalid operation: division by zero", right.position()));
            return Type::Error;
        }

        if op.is_equality() || op.is_ordering() {
            Type::Bool
        } else {
            operand
        }
    }

    /// Divisor known to be zero: an integer constant or a zero float literal
    fn is_constant_zero(&self, expr: &Expr) -> bool {
        match expr.unparen() {
            Expr::FloatLit { value, .. } => *value == 0.0,
            Expr::Unary { op: UnaryOp::Negate | UnaryOp::Plus, operand, .. } => self.is_constant_zero(operand),
            other => self.const_int(other) == Some(0),
        }
    }

    fn shift_result(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        left_type: &Type,
        right_type: &Type,
        position: Position,
    ) -> Type {
        if !self.underlying(left_type).is_integer() {
            self.add_error(SemanticError::OperatorNotDefined {
                op: op.symbol().to_string(),
                operand: describe(left, left_type),
                position,
            });
            return Type::Error;
        }
        if !self.underlying(right_type).is_integer() {
            self.add_error(SemanticError::invalid(
                format!("invalid shift count {}", describe(right, right_type)),
                right.position(),
            ));
            return Type::Error;
        }
        match (left_type, right_type.is_untyped()) {
            (Type::UntypedInt, true) => Type::UntypedInt,
            (Type::UntypedInt, false) => Type::Int,
            (ty, _) => ty.clone(),
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, position: Position) -> Type {
        let ty = self.check_expr(operand);
        if ty.is_error() {
            return Type::Error;
        }
        match op {
            UnaryOp::AddressOf => {
                let inner = operand.unparen();
                if matches!(inner, Expr::CompositeLit { .. }) || self.is_addressable(inner) {
                    Type::pointer_to(ty)
                } else {
                    self.add_error(SemanticError::invalid(
                        format!("invalid operation: cannot take address of {}", describe(operand, &ty)),
                        position,
                    ));
                    Type::Error
                }
            }
            UnaryOp::Dereference => match self.underlying(&ty) {
                Type::Pointer(elem) => *elem,
                _ => {
                    self.add_error(SemanticError::invalid(
                        format!("invalid operation: cannot indirect {}", describe(operand, &ty)),
                        position,
                    ));
                    Type::Error
                }
            },
            _ => {
                let underlying = self.underlying(&ty);
                let defined = match op {
                    UnaryOp::Not => underlying == Type::Bool,
                    UnaryOp::BitwiseNot => underlying.is_integer(),
                    _ => underlying.is_numeric(),
                };
                if !defined {
                    self.add_error(SemanticError::OperatorNotDefined {
                        op: op.symbol().to_string(),
                        operand: describe(operand, &ty),
                        position,
                    });
                    return Type::Error;
                }
                ty
            }
        }
    }

    fn is_addressable(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Ident(ident) => self
                .symbols
                .lookup(&ident.name)
                .map_or(false, |s| matches!(s.kind, SymbolKind::Var | SymbolKind::Param)),
            Expr::Paren { inner, .. } => self.is_addressable(inner),
            Expr::FieldAccess { .. } | Expr::Index { .. } => true,
            Expr::Unary { op: UnaryOp::Dereference, .. } => true,
            _ => false,
        }
    }

    // ---------------------------------------------------------------------
    // Calls
    // ---------------------------------------------------------------------

    fn check_call(&mut self, callee: &Expr, args: &[Expr], spread: bool, position: Position) -> Type {
        if let Expr::Ident(ident) = callee.unparen() {
            let special = self
                .symbols
                .lookup(&ident.name)
                .map(|s| (s.kind, s.declared_type.clone()));
            match special {
                Some((SymbolKind::Builtin, _)) => return self.check_builtin(&ident.name, args, spread, position),
                Some((SymbolKind::Type, target)) => return self.check_conversion(&target, args, spread, position),
                _ => {}
            }
        }

        let callee_type = self.check_expr(callee);
        if callee_type.is_error() {
            for arg in args {
                self.check_expr_multi(arg);
            }
            return Type::Error;
        }
        match self.underlying(&callee_type) {
            Type::Func(sig) => {
                self.check_arguments(&sig, callee, args, spread, position);
                sig.result_type()
            }
            _ => {
                self.add_error(SemanticError::NotAFunction {
                    expr: describe(callee, &callee_type),
                    position: callee.position(),
                });
                for arg in args {
                    self.check_expr_multi(arg);
                }
                Type::Error
            }
        }
    }

    fn check_arguments(&mut self, sig: &FuncType, callee: &Expr, args: &[Expr], spread: bool, position: Position) {
        let callee_name = callee.to_string();

        // `f(g())` passes every result of `g`
        let actual: Vec<(Type, &Expr)> = if args.len() == 1 && !spread {
            match self.check_expr_multi(&args[0]) {
                Type::Tuple(types) => types.into_iter().map(|t| (t, &args[0])).collect(),
                Type::Void => {
                    self.add_error(SemanticError::NoValueUsedAsValue {
                        call: args[0].to_string(),
                        position: args[0].position(),
                    });
                    vec![(Type::Error, &args[0])]
                }
                ty => vec![(ty, &args[0])],
            }
        } else {
            args.iter().map(|arg| (self.check_expr(arg), arg)).collect()
        };

        let params = &sig.params;
        let expected: Vec<Type> = if spread {
            if !sig.variadic {
                self.add_error(SemanticError::invalid(
                    format!("cannot use ... in call to non-variadic {}", callee_name),
                    position,
                ));
                return;
            }
            params.clone()
        } else if let Some(elem) = sig.variadic_elem() {
            let fixed = params.len() - 1;
            if actual.len() < fixed {
                self.add_error(SemanticError::NotEnoughArguments {
                    callee: callee_name,
                    position,
                });
                return;
            }
            params[..fixed]
                .iter()
                .cloned()
                .chain(std::iter::repeat(elem.clone()).take(actual.len() - fixed))
                .collect()
        } else {
            params.clone()
        };

        if actual.len() < expected.len() {
            self.add_error(SemanticError::NotEnoughArguments {
                callee: callee_name,
                position,
            });
            return;
        }
        if actual.len() > expected.len() {
            self.add_error(SemanticError::TooManyArguments {
                callee: callee_name,
                position,
            });
            return;
        }
        for ((ty, arg), param) in actual.iter().zip(&expected) {
            if !self.assignable(ty, param) {
                self.add_error(SemanticError::CannotUse {
                    value: describe(arg, ty),
                    target: format!("{} value", param),
                    context: format!("argument to {}", callee_name),
                    position: arg.position(),
                });
            }
        }
    }

    fn check_builtin(&mut self, name: &str, args: &[Expr], spread: bool, position: Position) -> Type {
        let types: Vec<Type> = args.iter().map(|arg| self.check_expr(arg)).collect();
        if spread && name != "append" {
            self.add_error(SemanticError::invalid(
                format!("invalid use of ... with built-in {}", name),
                position,
            ));
            return Type::Error;
        }

        let (min, max) = match name {
            "len" | "cap" | "panic" => (1, Some(1)),
            "delete" => (2, Some(2)),
            "append" => (1, None),
            _ => (0, None),
        };
        if types.len() < min {
            self.add_error(SemanticError::NotEnoughArguments {
                callee: name.to_string(),
                position,
            });
            return Type::Error;
        }
        if max.map_or(false, |max| types.len() > max) {
            self.add_error(SemanticError::TooManyArguments {
                callee: name.to_string(),
                position,
            });
            return Type::Error;
        }

        match name {
            "len" | "cap" => {
                let ty = &types[0];
                let accepted = match self.underlying(ty) {
                    Type::Slice(_) | Type::Array { .. } | Type::Error => true,
                    Type::String | Type::Map { .. } => name == "len",
                    _ => false,
                };
                if !accepted {
                    self.add_error(SemanticError::invalid(
                        format!("invalid argument: {} for built-in {}", describe(&args[0], ty), name),
                        args[0].position(),
                    ));
                }
                Type::Int
            }
            "append" => self.check_append(args, &types, spread),
            "delete" => {
                match self.underlying(&types[0]) {
                    Type::Map { key, .. } => {
                        if !self.assignable(&types[1], &key) {
                            self.add_error(SemanticError::CannotUse {
                                value: describe(&args[1], &types[1]),
                                target: format!("{} value", key),
                                context: "argument to delete".to_string(),
                                position: args[1].position(),
                            });
                        }
                    }
                    Type::Error => {}
                    _ => self.add_error(SemanticError::invalid(
                        format!("invalid argument: {} is not a map", describe(&args[0], &types[0])),
                        args[0].position(),
                    )),
                }
                Type::Void
            }
            // panic, print, println
            _ => Type::Void,
        }
    }

    fn check_append(&mut self, args: &[Expr], types: &[Type], spread: bool) -> Type {
        let slice = &types[0];
        if slice.is_error() {
            return Type::Error;
        }
        if *slice == Type::UntypedNil {
            self.add_error(SemanticError::invalid(
                "first argument to append must be a typed slice; have untyped nil",
                args[0].position(),
            ));
            return Type::Error;
        }
        let elem = match self.underlying(slice) {
            Type::Slice(elem) => *elem,
            _ => {
                self.add_error(SemanticError::invalid(
                    format!("invalid argument: {} is not a slice", describe(&args[0], slice)),
                    args[0].position(),
                ));
                return Type::Error;
            }
        };

        let expected = if spread {
            if args.len() != 2 {
                self.add_error(SemanticError::invalid(
                    "can only use ... with final argument in list",
                    args[0].position(),
                ));
                return slice.clone();
            }
            slice.clone()
        } else {
            elem
        };
        for (arg, ty) in args.iter().zip(types).skip(1) {
            if !self.assignable(ty, &expected) {
                self.add_error(SemanticError::CannotUse {
                    value: describe(arg, ty),
                    target: format!("{} value", expected),
                    context: "argument to append".to_string(),
                    position: arg.position(),
                });
            }
        }
        slice.clone()
    }

    fn check_conversion(&mut self, target: &Type, args: &[Expr], spread: bool, position: Position) -> Type {
        if spread {
            self.add_error(SemanticError::invalid(
                format!("invalid use of ... in conversion to {}", target),
                position,
            ));
        }
        match args {
            [] => self.add_error(SemanticError::invalid(
                format!("missing argument in conversion to {}", target),
                position,
            )),
            [arg] => {
                let ty = self.check_expr(arg);
                if !ty.is_error() && !self.convertible(&ty, target) {
                    self.add_error(SemanticError::CannotConvert {
                        from: describe(arg, &ty),
                        to: target.to_string(),
                        position: arg.position(),
                    });
                }
            }
            _ => {
                for arg in args {
                    self.check_expr(arg);
                }
                self.add_error(SemanticError::invalid(
                    format!("too many arguments in conversion to {}", target),
                    position,
                ));
            }
        }
        target.clone()
    }

    fn convertible(&self, value: &Type, target: &Type) -> bool {
        if self.assignable(value, target) {
            return true;
        }
        let from = self.underlying(value);
        let to = self.underlying(target);
        (from.is_numeric() && to.is_numeric()) || (from == Type::String && to == Type::String) || identical(&from, &to)
    }

    // ---------------------------------------------------------------------
    // Selectors and indexing
    // ---------------------------------------------------------------------

    fn check_selector(&mut self, target: &Expr, field: &Ident) -> Type {
        if let Expr::Ident(ident) = target.unparen() {
            let package = self
                .symbols
                .lookup(&ident.name)
                .filter(|s| s.kind == SymbolKind::Package)
                .map(|s| s.declared_type.clone());
            if let Some(Type::Package(path)) = package {
                if path != "fmt" {
                    // Other packages are not resolved
                    return Type::Error;
                }
                return match builtins::fmt_member(&field.name) {
                    Some(sig) => Type::Func(sig),
                    None => {
                        self.add_error(SemanticError::UndefinedMember {
                            package: ident.name.clone(),
                            name: field.name.clone(),
                            position: field.span.start,
                        });
                        Type::Error
                    }
                };
            }
        }

        let ty = self.check_expr(target);
        if ty.is_error() {
            return Type::Error;
        }
        match self.member_type(&ty, &field.name) {
            Some(member) => member,
            None => {
                self.add_error(SemanticError::NoFieldOrMethod {
                    ty: ty.to_string(),
                    name: field.name.clone(),
                    position: field.span.start,
                });
                Type::Error
            }
        }
    }

    /// Field or method `name` of `ty`, looking through one pointer
    fn member_type(&self, ty: &Type, name: &str) -> Option<Type> {
        let base = match self.underlying(ty) {
            Type::Pointer(elem) => *elem,
            _ => ty.clone(),
        };
        if let Type::Struct { fields, .. } = self.underlying(&base) {
            if let Some((_, field)) = fields.iter().find(|(n, _)| n == name) {
                return Some(field.clone());
            }
        }
        if let Type::Named(type_name) = &base {
            if let Some(method) = self.methods.get(type_name).and_then(|set| set.iter().find(|m| m.name == name)) {
                return Some(Type::Func(method.sig.clone()));
            }
        }
        match self.underlying(&base) {
            Type::Interface { methods, .. } => methods
                .into_iter()
                .find(|(n, _)| n == name)
                .map(|(_, sig)| Type::Func(sig)),
            _ => None,
        }
    }

    /// Element type of `target[index]` and the underlying type of `target`
    pub(super) fn check_index_access(&mut self, target: &Expr, index: &Expr) -> (Type, Type) {
        let target_type = self.check_expr(target);
        let container = self.underlying(&target_type);
        let element = match &container {
            Type::Error => {
                self.check_expr(index);
                Type::Error
            }
            Type::Map { key, value } => {
                let index_type = self.check_expr(index);
                if !self.assignable(&index_type, key) {
                    self.add_error(SemanticError::CannotUse {
                        value: describe(index, &index_type),
                        target: format!("{} value", key),
                        context: "map index".to_string(),
                        position: index.position(),
                    });
                }
                (**value).clone()
            }
            Type::Slice(elem) => {
                self.check_int_index(index, None);
                (**elem).clone()
            }
            Type::Array { elem, len } => {
                self.check_int_index(index, Some(*len));
                (**elem).clone()
            }
            // Bytes are modelled as int
            Type::String => {
                self.check_int_index(index, None);
                Type::Int
            }
            Type::Pointer(inner) => match self.underlying(inner) {
                Type::Array { elem, len } => {
                    self.check_int_index(index, Some(len));
                    *elem
                }
                _ => return self.cannot_index(target, &target_type, index),
            },
            _ => return self.cannot_index(target, &target_type, index),
        };
        (element, container)
    }

    fn cannot_index(&mut self, target: &Expr, target_type: &Type, index: &Expr) -> (Type, Type) {
        self.check_expr(index);
        self.add_error(SemanticError::CannotIndex {
            ty: describe(target, target_type),
            position: target.position(),
        });
        (Type::Error, Type::Error)
    }

    fn check_int_index(&mut self, index: &Expr, len: Option<i64>) {
        let ty = self.check_expr(index);
        if ty.is_error() {
            return;
        }
        if !self.underlying(&ty).is_integer() {
            self.add_error(SemanticError::InvalidIndexType {
                ty: describe(index, &ty),
                position: index.position(),
            });
            return;
        }
        match (self.const_int(index), len) {
            (Some(v), _) if v < 0 => self.add_error(SemanticError::invalid(
                format!("invalid argument: index {} (constant of type int) must not be negative", v),
                index.position(),
            )),
            (Some(v), Some(len)) if v >= len => self.add_error(SemanticError::invalid(
                format!("invalid argument: index {} out of bounds [0:{}]", v, len),
                index.position(),
            )),
            _ => {}
        }
    }

    // ---------------------------------------------------------------------
    // Composite literals
    // ---------------------------------------------------------------------

    /// Check the elements of a literal of type `ty` and return `ty`
    pub(super) fn check_composite(&mut self, ty: &Type, elements: &[Element], position: Position) -> Type {
        match self.underlying(ty) {
            Type::Struct { fields, .. } => self.check_struct_literal(ty, &fields, elements, position),
            Type::Slice(elem) => self.check_array_elements(&elem, None, elements),
            Type::Array { elem, len } => self.check_array_elements(&elem, Some(len), elements),
            Type::Map { key, value } => self.check_map_elements(&key, &value, elements),
            Type::Error => {
                self.check_values_loosely(elements);
                return Type::Error;
            }
            _ => {
                self.add_error(SemanticError::invalid(
                    format!("invalid composite literal type {}", ty),
                    position,
                ));
                self.check_values_loosely(elements);
                return Type::Error;
            }
        }
        ty.clone()
    }

    fn check_values_loosely(&mut self, elements: &[Element]) {
        for element in elements {
            self.check_element(&element.value, &Type::Error, "", true);
        }
    }

    fn check_struct_literal(
        &mut self,
        ty: &Type,
        fields: &[(String, Type)],
        elements: &[Element],
        position: Position,
    ) {
        let keyed = match elements.first() {
            Some(element) => element.key.is_some(),
            None => return,
        };
        if elements.iter().any(|e| e.key.is_some() != keyed) {
            self.add_error(SemanticError::invalid(
                "mixture of field:value and value elements in struct literal",
                position,
            ));
            self.check_values_loosely(elements);
            return;
        }

        if !keyed {
            for (element, (_, field_type)) in elements.iter().zip(fields) {
                self.check_element(&element.value, field_type, "struct literal", false);
            }
            if elements.len() < fields.len() {
                self.add_error(SemanticError::invalid(
                    format!("too few values in struct literal of type {}", ty),
                    position,
                ));
            } else if elements.len() > fields.len() {
                self.add_error(SemanticError::invalid(
                    format!("too many values in struct literal of type {}", ty),
                    elements[fields.len()].value.position(),
                ));
                self.check_values_loosely(&elements[fields.len()..]);
            }
            return;
        }

        let mut seen: Vec<&str> = Vec::new();
        for element in elements {
            let name = match &element.key {
                Some(Expr::Ident(ident)) => ident,
                Some(other) => {
                    self.add_error(SemanticError::invalid(
                        format!("invalid field name {} in struct literal", other),
                        other.position(),
                    ));
                    self.check_element(&element.value, &Type::Error, "", false);
                    continue;
                }
                None => continue,
            };
            if seen.contains(&name.name.as_str()) {
                self.add_error(SemanticError::invalid(
                    format!("duplicate field name {} in struct literal", name.name),
                    name.span.start,
                ));
                continue;
            }
            seen.push(&name.name);
            match fields.iter().find(|(field, _)| *field == name.name) {
                Some((_, field_type)) => self.check_element(&element.value, field_type, "struct literal", false),
                None => {
                    self.add_error(SemanticError::invalid(
                        format!("unknown field {} in struct literal of type {}", name.name, ty),
                        name.span.start,
                    ));
                    self.check_element(&element.value, &Type::Error, "", false);
                }
            }
        }
    }

    fn check_array_elements(&mut self, elem: &Type, len: Option<i64>, elements: &[Element]) {
        let mut index: i64 = 0;
        for element in elements {
            if let Some(key) = &element.key {
                match self.const_int(key) {
                    Some(k) if k >= 0 => index = k,
                    _ => {
                        let ty = self.check_expr(key);
                        if !ty.is_error() {
                            self.add_error(SemanticError::invalid(
                                format!("index {} must be integer constant", key),
                                key.position(),
                            ));
                        }
                    }
                }
            }
            if let Some(len) = len {
                if index >= len {
                    self.add_error(SemanticError::invalid(
                        format!("array index {} out of bounds [0:{}]", index, len),
                        element.value.position(),
                    ));
                }
            }
            self.check_element(&element.value, elem, "array or slice literal", true);
            index += 1;
        }
    }

    fn check_map_elements(&mut self, key_type: &Type, value_type: &Type, elements: &[Element]) {
        let mut seen: Vec<String> = Vec::new();
        for element in elements {
            match &element.key {
                Some(key) => {
                    self.check_element(key, key_type, "map literal", true);
                    if matches!(key, Expr::IntLit { .. } | Expr::StringLit { .. }) {
                        let text = key.to_string();
                        if seen.contains(&text) {
                            self.add_error(SemanticError::invalid(
                                format!("duplicate key {} in map literal", text),
                                key.position(),
                            ));
                        } else {
                            seen.push(text);
                        }
                    }
                }
                None => self.add_error(SemanticError::invalid(
                    "missing key in map literal",
                    element.value.position(),
                )),
            }
            self.check_element(&element.value, value_type, "map literal", true);
        }
    }

    /// Check one literal element against the type its position expects.
    /// Elided literals `{...}` take that type, or its base for `*T`.
    fn check_element(&mut self, value: &Expr, expected: &Type, context: &str, allow_elided: bool) {
        if let Expr::CompositeLit { ty: None, elements, span } = value {
            if !allow_elided {
                self.add_error(SemanticError::invalid("missing type in composite literal", span.start));
                self.check_composite(&Type::Error, elements, span.start);
                return;
            }
            match self.underlying(expected) {
                Type::Pointer(inner) => self.check_composite(&inner, elements, span.start),
                _ => self.check_composite(expected, elements, span.start),
            };
            return;
        }

        let ty = self.check_expr(value);
        if !self.assignable(&ty, expected) {
            self.add_error(SemanticError::CannotUse {
                value: describe(value, &ty),
                target: format!("{} value", expected),
                context: context.to_string(),
                position: value.position(),
            });
        }
    }
}
