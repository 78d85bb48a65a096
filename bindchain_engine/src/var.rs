//! Query variables.

use std::{fmt, sync::Arc};

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// Leading character of variables allocated by the engine itself (`?.0`, `?.1`, ...).
pub const ALLOC_VAR_MARKER: char = '.';

/// Leading character of anonymous variables standing in for blank nodes in patterns.
pub const ANON_VAR_MARKER: char = '?';

/// A query variable. Variables compare by name only.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Var(Arc<str>);

impl Var {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Var(name.into())
    }

    /// Parses `?x`, `$x` or a bare `x`. Only one leading sigil is stripped, so
    /// `??0` names the anonymous variable `?0`.
    pub fn parse(text: &str) -> Result<Self, VarError> {
        let name = text
            .strip_prefix('?')
            .or_else(|| text.strip_prefix('$'))
            .unwrap_or(text);
        if name.is_empty() {
            return Err(VarError::Empty {
                text: text.to_string(),
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(VarError::Whitespace {
                name: name.to_string(),
            });
        }
        Ok(Var::new(name))
    }

    /// An engine-allocated variable; always a system variable.
    pub fn alloc(index: usize) -> Self {
        Var(format!("{}{}", ALLOC_VAR_MARKER, index).into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// System variables are internal to query evaluation and never shown to users.
    pub fn is_system(&self) -> bool {
        self.0.starts_with(ALLOC_VAR_MARKER) || self.0.starts_with(ANON_VAR_MARKER)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum VarError {
    #[error("Variable [{text}] has an empty name")]
    #[diagnostic(help("Write variables as ?name or $name."))]
    Empty { text: String },

    #[error("Variable name [{name}] contains whitespace")]
    Whitespace { name: String },
}
