//! The type model shared by the parser and the semantic analyzer.
//!
//! Equality is structural with two relaxations:
//!
//! - a `void` element type (what an empty literal produces) matches any
//!   element type inside an array, set or map;
//! - a type-name reference equals the template it names.
//!
//! Function types compare their return type and parameter types in order.
//! Parameter names are not part of a function's type.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Float,
    Bool,
    Str,
    Null,
    Void,
    Infer,
}

impl Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Str => "str",
            Primitive::Null => "null",
            Primitive::Void => "void",
            Primitive::Infer => "infer",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub enum Type {
    Primitive(Primitive),
    Array(Box<Type>),
    Set(Box<Type>),
    Map { key: Box<Type>, value: Box<Type> },
    Function(FunctionType),
    /// An unresolved reference to a declared template.
    TypeName(String),
    Template(TemplateType),
}

#[derive(Debug, Clone)]
pub struct FunctionType {
    pub return_type: Box<Type>,
    pub params: Vec<(String, Type)>,
}

/// A template as seen by the analyzer: attributes and method signatures in
/// declaration order.
#[derive(Debug, Clone)]
pub struct TemplateType {
    pub name: String,
    pub attributes: Vec<(String, Type)>,
    pub methods: Vec<(String, FunctionType)>,
}

impl FunctionType {
    pub fn new(return_type: Type, params: Vec<(String, Type)>) -> Self {
        FunctionType {
            return_type: Box::new(return_type),
            params,
        }
    }
}

/// Parameter names are part of a signature.
impl PartialEq for FunctionType {
    fn eq(&self, other: &Self) -> bool {
        self.return_type == other.return_type && self.params == other.params
    }
}

impl TemplateType {
    pub fn attribute(&self, name: &str) -> Option<&Type> {
        self.attributes
            .iter()
            .find(|(attribute, _)| attribute == name)
            .map(|(_, ty)| ty)
    }

    pub fn method(&self, name: &str) -> Option<&FunctionType> {
        self.methods
            .iter()
            .find(|(method, _)| method == name)
            .map(|(_, ty)| ty)
    }
}

fn element_eq(a: &Type, b: &Type) -> bool {
    a.is_void() || b.is_void() || a == b
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => element_eq(a, b),
            (Type::Set(a), Type::Set(b)) => element_eq(a, b),
            (
                Type::Map { key: ak, value: av },
                Type::Map { key: bk, value: bv },
            ) => element_eq(ak, bk) && element_eq(av, bv),
            (Type::Function(a), Type::Function(b)) => a == b,
            (Type::TypeName(a), Type::TypeName(b)) => a == b,
            (Type::Template(a), Type::Template(b)) => a.name == b.name,
            (Type::TypeName(a), Type::Template(b)) | (Type::Template(b), Type::TypeName(a)) => {
                *a == b.name
            }
            _ => false,
        }
    }
}

impl Type {
    pub fn int() -> Self {
        Type::Primitive(Primitive::Int)
    }

    pub fn float() -> Self {
        Type::Primitive(Primitive::Float)
    }

    pub fn bool() -> Self {
        Type::Primitive(Primitive::Bool)
    }

    pub fn str() -> Self {
        Type::Primitive(Primitive::Str)
    }

    pub fn null() -> Self {
        Type::Primitive(Primitive::Null)
    }

    pub fn void() -> Self {
        Type::Primitive(Primitive::Void)
    }

    pub fn infer() -> Self {
        Type::Primitive(Primitive::Infer)
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn set(element: Type) -> Self {
        Type::Set(Box::new(element))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn function(return_type: Type, params: Vec<(String, Type)>) -> Self {
        Type::Function(FunctionType::new(return_type, params))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Void))
    }

    pub fn is_infer(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Infer))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Type::Primitive(Primitive::Int) | Type::Primitive(Primitive::Float)
        )
    }

    /// Primitives and sets can be set elements and map keys.
    pub fn is_hashable(&self) -> bool {
        matches!(self, Type::Primitive(_) | Type::Set(_))
    }

    /// Looks up a built-in or declared method on a receiver type.
    ///
    /// Sets and maps have fixed method tables, templates expose their
    /// declared methods. Every other type has none.
    pub fn method(&self, name: &str) -> Option<FunctionType> {
        match self {
            Type::Set(element) => {
                let element = element.as_ref().clone();
                let this = self.clone();
                let signature = match name {
                    "add" => FunctionType::new(this, vec![("element".to_string(), element)]),
                    "remove" => FunctionType::new(this, vec![("element".to_string(), element)]),
                    "clear" => FunctionType::new(this, vec![]),
                    "contains" => {
                        FunctionType::new(Type::bool(), vec![("element".to_string(), element)])
                    }
                    "size" => FunctionType::new(Type::int(), vec![]),
                    _ => return None,
                };
                Some(signature)
            }
            Type::Map { key, value } => {
                let key = key.as_ref().clone();
                let value = value.as_ref().clone();
                let this = self.clone();
                let signature = match name {
                    "get" => FunctionType::new(value, vec![("key".to_string(), key)]),
                    "put" => FunctionType::new(
                        this,
                        vec![("key".to_string(), key), ("value".to_string(), value)],
                    ),
                    "remove" => FunctionType::new(this, vec![("key".to_string(), key)]),
                    "clear" => FunctionType::new(this, vec![]),
                    "contains" => FunctionType::new(Type::bool(), vec![("key".to_string(), key)]),
                    "size" => FunctionType::new(Type::int(), vec![]),
                    _ => return None,
                };
                Some(signature)
            }
            Type::Template(template) => template.method(name).cloned(),
            _ => None,
        }
    }

    /// Looks up a plain member. Only templates have members: attributes
    /// first, then methods as function values.
    pub fn member(&self, name: &str) -> Option<Type> {
        match self {
            Type::Template(template) => template
                .attribute(name)
                .cloned()
                .or_else(|| template.method(name).cloned().map(Type::Function)),
            _ => None,
        }
    }

    /// Whether this receiver kind supports member access and method calls at all.
    pub fn has_members(&self) -> bool {
        matches!(self, Type::Set(_) | Type::Map { .. } | Type::Template(_))
    }

    /// Every type-name reference nested anywhere in this type.
    pub fn referenced_names(&self) -> Vec<&str> {
        match self {
            Type::Primitive(_) | Type::Template(_) => vec![],
            Type::Array(element) | Type::Set(element) => element.referenced_names(),
            Type::Map { key, value } => {
                let mut names = key.referenced_names();
                names.extend(value.referenced_names());
                names
            }
            Type::Function(function) => {
                let mut names = function.return_type.referenced_names();
                for (_, param) in &function.params {
                    names.extend(param.referenced_names());
                }
                names
            }
            Type::TypeName(name) => vec![name.as_str()],
        }
    }
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self
            .params
            .iter()
            .map(|(name, ty)| format!("{} {}", ty, name))
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "func<{}, [{}]>", self.return_type, params)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Primitive(primitive) => write!(f, "{}", primitive),
            Type::Array(element) => write!(f, "{}[]", element),
            Type::Set(element) => write!(f, "{}{{}}", element),
            Type::Map { key, value } => write!(f, "{}{{{}}}", value, key),
            Type::Function(function) => write!(f, "{}", function),
            Type::TypeName(name) => write!(f, "{}", name),
            Type::Template(template) => write!(f, "{}", template.name),
        }
    }
}
