//! Function signatures - the generator's input model
//!
//! A signature describes one host function as the symbol manifest reports
//! it: name, optional owning-module qualifier, ordered arguments, optional
//! return type, optional declared error type and whether it is async.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Host type of an argument or return value
///
/// Parsed leniently from the spellings symbol tools emit (`i64`, `Int`,
/// `Vec<str>`, `[String]`, `Option<f64>`, `Double?`). Anything else becomes
/// `Unsupported` and is rejected at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    /// Passed through as a foreign reference
    Object,
    Str,
    Int64,
    Int32,
    Float64,
    Bool,
    Unit,
    List(Box<TypeTag>),
    Optional(Box<TypeTag>),
    Unsupported(String),
}

impl TypeTag {
    /// Whether every component of this type has a conversion
    pub fn is_supported(&self) -> bool {
        match self {
            Self::List(inner) | Self::Optional(inner) => inner.is_supported(),
            Self::Unsupported(_) => false,
            _ => true,
        }
    }

    /// The Rust type the glue converts to, with runtime items under `runtime`
    pub fn rust_type(&self, runtime: &str) -> String {
        match self {
            Self::Object => format!("{runtime}::ForeignRef"),
            Self::Str => "::std::string::String".to_string(),
            Self::Int64 => "i64".to_string(),
            Self::Int32 => "i32".to_string(),
            Self::Float64 => "f64".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Unit => "()".to_string(),
            Self::List(inner) => format!("::std::vec::Vec<{}>", inner.rust_type(runtime)),
            Self::Optional(inner) => format!("::std::option::Option<{}>", inner.rust_type(runtime)),
            Self::Unsupported(text) => text.clone(),
        }
    }

    fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(inner) = text.strip_suffix('?') {
            return Self::Optional(Box::new(Self::parse(inner)));
        }
        if let Some(inner) = unwrap_generic(text, &["list[", "List[", "Vec<", "Array<", "["]) {
            return Self::List(Box::new(Self::parse(inner)));
        }
        if let Some(inner) = unwrap_generic(text, &["optional[", "Optional[", "Option<"]) {
            return Self::Optional(Box::new(Self::parse(inner)));
        }

        match text {
            "object" | "ForeignRef" | "PyObject" => Self::Object,
            "str" | "String" => Self::Str,
            "i64" | "int" | "Int" | "Int64" => Self::Int64,
            "i32" | "Int32" => Self::Int32,
            "f64" | "float" | "Double" | "Float64" => Self::Float64,
            "bool" | "Bool" => Self::Bool,
            "()" | "None" | "Void" | "unit" => Self::Unit,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

/// `Vec<T>` → `T` for any of `openers`, matching the closing bracket
fn unwrap_generic<'a>(text: &'a str, openers: &[&str]) -> Option<&'a str> {
    openers.iter().find_map(|opener| {
        let close = if opener.ends_with('<') { '>' } else { ']' };
        text.strip_prefix(opener)?.strip_suffix(close)
    })
}

impl FromStr for TypeTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for TypeTag {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Str => f.write_str("str"),
            Self::Int64 => f.write_str("i64"),
            Self::Int32 => f.write_str("i32"),
            Self::Float64 => f.write_str("f64"),
            Self::Bool => f.write_str("bool"),
            Self::Unit => f.write_str("()"),
            Self::List(inner) => write!(f, "list[{inner}]"),
            Self::Optional(inner) => write!(f, "optional[{inner}]"),
            Self::Unsupported(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// External label; `None` for positional-only arguments
    #[serde(default)]
    pub label: Option<String>,

    #[serde(rename = "type")]
    pub ty: TypeTag,

    /// Mutable / by-reference argument
    #[serde(default)]
    pub by_reference: bool,
}

impl Argument {
    pub fn positional(ty: TypeTag) -> Self {
        Self { label: None, ty, by_reference: false }
    }

    pub fn labeled(label: impl Into<String>, ty: TypeTag) -> Self {
        Self { label: Some(label.into()), ty, by_reference: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,

    /// Owning module; prefixes the call path when present
    #[serde(default)]
    pub module: Option<String>,

    #[serde(default)]
    pub arguments: Vec<Argument>,

    #[serde(default)]
    pub returns: Option<TypeTag>,

    /// Declared error type; must implement `Display`
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default, rename = "async")]
    pub is_async: bool,

    #[serde(default)]
    pub doc: Option<String>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            arguments: Vec::new(),
            returns: None,
            error: None,
            is_async: false,
            doc: None,
        }
    }

    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_returns(mut self, returns: TypeTag) -> Self {
        self.returns = Some(returns);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// Path the glue calls the host function through
    pub fn call_path(&self) -> String {
        match &self.module {
            Some(module) => format!("{module}::{}", self.name),
            None => self.name.clone(),
        }
    }
}
