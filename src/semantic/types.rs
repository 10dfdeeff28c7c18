//! Semantic types
//!
//! Named types are referenced by name and resolved through the analyzer's
//! side table, so a type graph never contains cycles. `Error` marks
//! expressions whose mistakes were already reported.

use serde::{Serialize, Serializer};
use std::fmt;

/// Signature of a function, method or function-typed value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncType {
    pub params: Vec<Type>,
    pub results: Vec<Type>,
    /// The last parameter is `...T`, stored as `[]T`
    pub variadic: bool,
}

impl FuncType {
    pub fn new(params: Vec<Type>, results: Vec<Type>, variadic: bool) -> Self {
        Self {
            params,
            results,
            variadic,
        }
    }

    /// Type of a call's value: nothing, a single type or a tuple
    pub fn result_type(&self) -> Type {
        match self.results.len() {
            0 => Type::Void,
            1 => self.results[0].clone(),
            _ => Type::Tuple(self.results.clone()),
        }
    }

    /// Element type of the variadic tail
    pub fn variadic_elem(&self) -> Option<&Type> {
        if !self.variadic {
            return None;
        }
        match self.params.last() {
            Some(Type::Slice(elem)) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match param {
                Type::Slice(elem) if self.variadic && i == last => write!(f, "...{}", elem)?,
                other => write!(f, "{}", other)?,
            }
        }
        write!(f, ")")?;
        match self.results.len() {
            0 => Ok(()),
            1 => write!(f, " {}", self.results[0]),
            _ => write!(f, " {}", Type::Tuple(self.results.clone())),
        }
    }
}

/// Types of the Go subset
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float64,
    String,
    Bool,
    /// Integer constant not yet given a type
    UntypedInt,
    /// Floating-point constant not yet given a type
    UntypedFloat,
    /// `nil`
    UntypedNil,
    /// Result of a call to a function without results
    Void,
    Struct {
        name: String,
        fields: Vec<(String, Type)>,
    },
    Interface {
        name: String,
        methods: Vec<(String, FuncType)>,
    },
    Array {
        elem: Box<Type>,
        len: i64,
    },
    Slice(Box<Type>),
    Map {
        key: Box<Type>,
        value: Box<Type>,
    },
    Pointer(Box<Type>),
    Func(FuncType),
    /// A declared type, resolved through the type table
    Named(String),
    /// Results of a multi-value call
    Tuple(Vec<Type>),
    /// An imported package name
    Package(String),
    Error,
}

impl Type {
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::UntypedInt | Type::UntypedFloat | Type::UntypedNil)
    }

    /// Type an untyped constant takes when nothing else decides it
    pub fn default_type(&self) -> Type {
        match self {
            Type::UntypedInt => Type::Int,
            Type::UntypedFloat => Type::Float64,
            other => other.clone(),
        }
    }

    /// Whether `nil` converts to values of this (underlying) type
    pub fn is_nilable(&self) -> bool {
        matches!(
            self,
            Type::Pointer(_) | Type::Slice(_) | Type::Map { .. } | Type::Func(_) | Type::Interface { .. }
        )
    }

    /// Numeric underlying types, typed or untyped
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float64 | Type::UntypedInt | Type::UntypedFloat)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int | Type::UntypedInt)
    }

    pub fn slice_of(elem: Type) -> Type {
        Type::Slice(Box::new(elem))
    }

    pub fn pointer_to(elem: Type) -> Type {
        Type::Pointer(Box::new(elem))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float64 => write!(f, "float64"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::UntypedInt => write!(f, "untyped int"),
            Type::UntypedFloat => write!(f, "untyped float"),
            Type::UntypedNil => write!(f, "untyped nil"),
            Type::Void => write!(f, "no value"),
            Type::Struct { fields, .. } => {
                write!(f, "struct{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{} {}", name, ty)?;
                }
                write!(f, "}}")
            }
            Type::Interface { name, methods } => {
                if name == "any" {
                    return write!(f, "any");
                }
                write!(f, "interface{{")?;
                for (i, (method, sig)) in methods.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    // `func(...)` minus the keyword
                    write!(f, "{}{}", method, &sig.to_string()[4..])?;
                }
                write!(f, "}}")
            }
            Type::Array { elem, len } => write!(f, "[{}]{}", len, elem),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Type::Pointer(elem) => write!(f, "*{}", elem),
            Type::Func(sig) => write!(f, "{}", sig),
            Type::Named(name) => write!(f, "{}", name),
            Type::Tuple(types) => {
                write!(f, "(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ")")
            }
            Type::Package(path) => write!(f, "package {}", path),
            Type::Error => write!(f, "invalid type"),
        }
    }
}

/// Types serialize as their Go spelling
impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let map = Type::Map {
            key: Box::new(Type::String),
            value: Box::new(Type::slice_of(Type::Named("Point".into()))),
        };
        assert_eq!(map.to_string(), "map[string][]Point");
        assert_eq!(Type::Array { elem: Box::new(Type::Int), len: 3 }.to_string(), "[3]int");
        assert_eq!(Type::pointer_to(Type::Named("P".into())).to_string(), "*P");
    }

    #[test]
    fn test_func_display() {
        let sig = FuncType::new(
            vec![Type::String, Type::slice_of(Type::Int)],
            vec![Type::Int, Type::Named("error".into())],
            true,
        );
        assert_eq!(sig.to_string(), "func(string, ...int) (int, error)");
        assert_eq!(FuncType::default().to_string(), "func()");
    }

    #[test]
    fn test_interface_display() {
        let shape = Type::Interface {
            name: "Shape".into(),
            methods: vec![("Area".into(), FuncType::new(vec![], vec![Type::Float64], false))],
        };
        assert_eq!(shape.to_string(), "interface{Area() float64}");
    }

    #[test]
    fn test_default_type() {
        assert_eq!(Type::UntypedInt.default_type(), Type::Int);
        assert_eq!(Type::UntypedFloat.default_type(), Type::Float64);
        assert_eq!(Type::String.default_type(), Type::String);
    }

    #[test]
    fn test_result_type() {
        assert_eq!(FuncType::default().result_type(), Type::Void);
        let pair = FuncType::new(vec![], vec![Type::Int, Type::Bool], false);
        assert_eq!(pair.result_type(), Type::Tuple(vec![Type::Int, Type::Bool]));
    }

    #[test]
    fn test_serializes_as_spelling() {
        let json = serde_json::to_string(&Type::slice_of(Type::Float64)).expect("serialize");
        assert_eq!(json, "\"[]float64\"");
    }
}
