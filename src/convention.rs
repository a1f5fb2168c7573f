//! Calling-convention selection and signature validation
//!
//! Selection is strict and order-sensitive:
//! 1. no arguments           → `NoArguments`
//! 2. exactly one argument   → `SinglePositional`
//! 3. all arguments unlabeled → `FastPositional`
//! 4. otherwise              → `FastPositionalKeywords`
//!
//! Validation runs before selection; a function that fails it is rejected as
//! a whole and no glue is emitted for its module.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;

use crate::errors::{GenError, Result};
use crate::signature::FunctionSignature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallingConvention {
    NoArguments,
    SinglePositional,
    FastPositional,
    FastPositionalKeywords,
}

impl CallingConvention {
    /// Apply the selection rule; performs no validation
    pub fn classify(signature: &FunctionSignature) -> Self {
        match signature.arguments.as_slice() {
            [] => Self::NoArguments,
            [_] => Self::SinglePositional,
            args if args.iter().all(|arg| arg.label.is_none()) => Self::FastPositional,
            _ => Self::FastPositionalKeywords,
        }
    }

    /// Validate `signature` and select its convention
    pub fn select(signature: &FunctionSignature) -> Result<Self> {
        validate(signature)?;

        match Self::classify(signature) {
            Self::FastPositionalKeywords => Err(GenError::unsupported(
                &signature.name,
                "labeled arguments need keyword-argument glue, which is not supported",
            )),
            convention => Ok(convention),
        }
    }

    /// Variant name of `MethodImpl` in the runtime
    pub fn method_impl(self) -> &'static str {
        match self {
            Self::NoArguments => "NoArguments",
            Self::SinglePositional => "SinglePositional",
            Self::FastPositional => "FastPositional",
            Self::FastPositionalKeywords => "FastPositionalKeywords",
        }
    }
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoArguments => "no-arguments",
            Self::SinglePositional => "single-positional",
            Self::FastPositional => "fast-positional",
            Self::FastPositionalKeywords => "fast-positional-keywords",
        })
    }
}

fn validate(signature: &FunctionSignature) -> Result<()> {
    let name = &signature.name;

    if !is_identifier(name) {
        return Err(GenError::invalid(name, "name is not a Rust identifier"));
    }
    if let Some(module) = &signature.module {
        if !is_path(module) {
            return Err(GenError::invalid(name, format!("module `{module}` is not a Rust path")));
        }
    }
    if let Some(error) = &signature.error {
        if !is_path(error) {
            return Err(GenError::invalid(name, format!("error type `{error}` is not a Rust path")));
        }
    }

    if signature.is_async {
        return Err(GenError::unsupported(name, "async functions cannot be exposed"));
    }

    for (index, argument) in signature.arguments.iter().enumerate() {
        if argument.by_reference {
            return Err(GenError::unsupported(
                name,
                format!("argument {index} is passed by mutable reference"),
            ));
        }
        if !argument.ty.is_supported() {
            return Err(GenError::unsupported(
                name,
                format!("argument {index} has unsupported type `{}`", argument.ty),
            ));
        }
    }

    if let Some(returns) = &signature.returns {
        if !returns.is_supported() {
            return Err(GenError::unsupported(name, format!("unsupported return type `{returns}`")));
        }
    }

    Ok(())
}

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false",
        "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
        "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while",
    ]
    .into_iter()
    .collect()
});

/// `[A-Za-z_][A-Za-z0-9_]*`, excluding `_` alone and keywords
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && text != "_"
        && !KEYWORDS.contains(text)
}

/// `a::b::C`, optionally rooted with `::` or `crate::`
pub fn is_path(text: &str) -> bool {
    let text = text.strip_prefix("::").unwrap_or(text);
    let text = text.strip_prefix("crate::").unwrap_or(text);
    !text.is_empty() && text.split("::").all(is_identifier)
}
