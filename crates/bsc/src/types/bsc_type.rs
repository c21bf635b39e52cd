//! Types attached to symbol table entries

use std::collections::BTreeMap;
use std::fmt;

/// Type of a symbol table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BscType {
    /// Unknown or intentionally untyped
    Dynamic,
    Boolean,
    Integer,
    LongInteger,
    Float,
    Double,
    String,
    Object,
    Invalid,
    Void,

    /// Named or anonymous function
    Function(Box<FunctionType>),

    /// Interface declaration
    Interface(InterfaceType),

    /// Class or otherwise unresolved named type
    Custom(String),

    /// Enum declaration
    Enum(String),

    /// `dim` array
    Array(Box<BscType>),

    /// Leading segment of a namespace name
    Namespace(String),
}

impl BscType {
    /// Type named after `as` in a declaration. Unknown names become custom
    /// types and are resolved by later passes.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "dynamic" => BscType::Dynamic,
            "boolean" => BscType::Boolean,
            "integer" => BscType::Integer,
            "longinteger" => BscType::LongInteger,
            "float" => BscType::Float,
            "double" => BscType::Double,
            "string" => BscType::String,
            "object" => BscType::Object,
            "invalid" => BscType::Invalid,
            "void" => BscType::Void,
            "function" => BscType::Function(Box::new(FunctionType::default())),
            _ => BscType::Custom(name.to_string()),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, BscType::Dynamic)
    }

    /// Function type, when this is one
    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            BscType::Function(func) => Some(func),
            _ => None,
        }
    }
}

impl fmt::Display for BscType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BscType::Dynamic => write!(f, "dynamic"),
            BscType::Boolean => write!(f, "boolean"),
            BscType::Integer => write!(f, "integer"),
            BscType::LongInteger => write!(f, "longinteger"),
            BscType::Float => write!(f, "float"),
            BscType::Double => write!(f, "double"),
            BscType::String => write!(f, "string"),
            BscType::Object => write!(f, "object"),
            BscType::Invalid => write!(f, "invalid"),
            BscType::Void => write!(f, "void"),
            BscType::Function(func) => write!(f, "{}", func),
            BscType::Interface(iface) => write!(f, "{}", iface),
            BscType::Custom(name) => write!(f, "{}", name),
            BscType::Enum(name) => write!(f, "enum {}", name),
            BscType::Array(element) => write!(f, "array of {}", element),
            BscType::Namespace(name) => write!(f, "namespace {}", name),
        }
    }
}

/// Signature of a `sub` or `function`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    /// Name the function is reachable by; the flattened name for namespaced functions
    pub name: Option<String>,
    pub params: Vec<(String, BscType)>,
    pub return_type: BscType,
    pub is_sub: bool,
}

impl FunctionType {
    pub fn new(return_type: BscType, is_sub: bool) -> Self {
        Self {
            name: None,
            params: Vec::new(),
            return_type,
            is_sub,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }
}

impl Default for FunctionType {
    fn default() -> Self {
        Self::new(BscType::Dynamic, false)
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_sub { "sub" } else { "function" };
        write!(f, "{}", keyword)?;
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(name, ty)| format!("{} as {}", name, ty))
            .collect();
        write!(f, "({}) as {}", params.join(", "), self.return_type)
    }
}

/// Interface with its member types, keyed by lower-cased member name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceType {
    pub members: BTreeMap<String, BscType>,
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self
            .members
            .iter()
            .map(|(name, ty)| format!("{}: {}", name, ty))
            .collect();
        write!(f, "interface {{{}}}", members.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(BscType::from_name("Integer"), BscType::Integer);
        assert_eq!(BscType::from_name("VOID"), BscType::Void);
        assert_eq!(BscType::from_name("Person"), BscType::Custom("Person".to_string()));
    }

    #[test]
    fn test_function_display() {
        let mut func = FunctionType::new(BscType::String, false);
        func.set_name("Alpha_greet");
        func.params.push(("name".to_string(), BscType::String));
        assert_eq!(func.to_string(), "function Alpha_greet(name as string) as string");
    }

    #[test]
    fn test_empty_interface_display() {
        assert_eq!(InterfaceType::default().to_string(), "interface {}");
    }
}
