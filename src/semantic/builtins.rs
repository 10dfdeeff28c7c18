//! Predeclared identifiers and the known standard-library members

use super::symbols::{Symbol, SymbolKind};
use super::types::{FuncType, Type};

/// Names callable as built-in functions
pub const BUILTIN_FUNCTIONS: &[&str] = &["append", "cap", "delete", "len", "panic", "print", "println"];

/// The empty interface spelled `any`
pub fn any_type() -> Type {
    Type::Interface {
        name: "any".to_string(),
        methods: Vec::new(),
    }
}

/// Underlying definition of the predeclared `error` interface
pub fn error_interface() -> Type {
    Type::Interface {
        name: "error".to_string(),
        methods: vec![("Error".to_string(), FuncType::new(vec![], vec![Type::String], false))],
    }
}

/// Symbols bound in the universe scope
pub fn universe() -> Vec<Symbol> {
    let mut symbols = vec![
        Symbol::predeclared("int", SymbolKind::Type, Type::Int),
        Symbol::predeclared("float64", SymbolKind::Type, Type::Float64),
        Symbol::predeclared("string", SymbolKind::Type, Type::String),
        Symbol::predeclared("bool", SymbolKind::Type, Type::Bool),
        Symbol::predeclared("any", SymbolKind::Type, any_type()),
        Symbol::predeclared("error", SymbolKind::Type, Type::Named("error".to_string())),
        Symbol::predeclared("nil", SymbolKind::Const, Type::UntypedNil),
    ];
    symbols.extend(
        BUILTIN_FUNCTIONS
            .iter()
            .map(|name| Symbol::predeclared(name, SymbolKind::Builtin, Type::Error)),
    );
    symbols
}

/// Named types whose definition lives in the universe
pub fn predeclared_types() -> Vec<(String, Type)> {
    vec![("error".to_string(), error_interface())]
}

/// Signature of a member of package `fmt`
pub fn fmt_member(name: &str) -> Option<FuncType> {
    let values = Type::slice_of(any_type());
    let count_and_error = vec![Type::Int, Type::Named("error".to_string())];
    let sig = match name {
        "Println" | "Print" | "Scan" | "Scanln" => FuncType::new(vec![values], count_and_error, true),
        "Printf" | "Scanf" => FuncType::new(vec![Type::String, values], count_and_error, true),
        "Sprintf" => FuncType::new(vec![Type::String, values], vec![Type::String], true),
        "Sprint" | "Sprintln" => FuncType::new(vec![values], vec![Type::String], true),
        "Errorf" => FuncType::new(
            vec![Type::String, values],
            vec![Type::Named("error".to_string())],
            true,
        ),
        _ => return None,
    };
    Some(sig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::symbols::SymbolTable;

    #[test]
    fn test_universe_contents() {
        let names: Vec<_> = universe().into_iter().map(|s| s.name).collect();
        for expected in ["int", "float64", "string", "bool", "any", "error", "nil", "len", "append", "panic"] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_universe_names_are_unique() {
        let mut table = SymbolTable::new(true);
        for symbol in universe() {
            let name = symbol.name.clone();
            assert!(table.insert(symbol).is_ok(), "duplicate universe name {}", name);
        }
    }

    #[test]
    fn test_fmt_members() {
        let printf = fmt_member("Printf").expect("Printf");
        assert_eq!(printf.to_string(), "func(string, ...any) (int, error)");
        assert_eq!(fmt_member("Sprint").map(|s| s.result_type()), Some(Type::String));
        assert!(fmt_member("Fprintf").is_none());
    }
}
