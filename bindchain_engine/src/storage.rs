//! Per-frame storage of local assignments.
//!
//! A frame delegates everything that concerns its own entries to a
//! [`FrameStorage`]; the chain walk itself lives in [`crate::frame`].

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::{term::Term, var::Var};

/// Local entries of one frame. Implementations hold each variable at most once.
pub trait FrameStorage: fmt::Debug + Send + Sync {
    fn get(&self, var: &Var) -> Option<&Term>;

    fn contains(&self, var: &Var) -> bool {
        self.get(var).is_some()
    }

    /// Stores `value` for `var`, replacing a value already held for the same variable.
    fn insert(&mut self, var: Var, value: Term) -> Result<(), BindingError>;

    /// Local variables in insertion order.
    fn vars(&self) -> Box<dyn Iterator<Item = &Var> + '_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage-specific validity rule, run before `insert` when checking is on.
    fn validate(&self, var: &Var, _value: &Term) -> Result<(), BindingError> {
        if var.name().is_empty() {
            return Err(BindingError::InvalidVariable {
                name: var.name().to_string(),
            });
        }
        Ok(())
    }
}

/// Storage for frames taking any number of assignments.
///
/// Frames rarely hold more than a handful of variables, so entries sit in a
/// vector and lookups scan it.
#[derive(Debug, Clone, Default)]
pub struct MultiStorage {
    entries: Vec<(Var, Term)>,
}

impl MultiStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameStorage for MultiStorage {
    fn get(&self, var: &Var) -> Option<&Term> {
        self.entries
            .iter()
            .find(|(v, _)| v == var)
            .map(|(_, value)| value)
    }

    fn insert(&mut self, var: Var, value: Term) -> Result<(), BindingError> {
        if let Some(slot) = self.entries.iter_mut().find(|(v, _)| *v == var) {
            slot.1 = value;
        } else {
            self.entries.push((var, value));
        }
        Ok(())
    }

    fn vars(&self) -> Box<dyn Iterator<Item = &Var> + '_> {
        Box::new(self.entries.iter().map(|(v, _)| v))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Storage for frames holding exactly one assignment, as produced by a single
/// `BIND` or triple-pattern extension.
#[derive(Debug, Clone, Default)]
pub struct SingleStorage {
    entry: Option<(Var, Term)>,
}

impl SingleStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_slot(&self, var: &Var) -> Result<(), BindingError> {
        match &self.entry {
            Some((occupant, _)) if occupant != var => Err(BindingError::FrameFull {
                var: var.clone(),
                occupant: occupant.clone(),
            }),
            _ => Ok(()),
        }
    }
}

impl FrameStorage for SingleStorage {
    fn get(&self, var: &Var) -> Option<&Term> {
        match &self.entry {
            Some((v, value)) if v == var => Some(value),
            _ => None,
        }
    }

    fn insert(&mut self, var: Var, value: Term) -> Result<(), BindingError> {
        self.check_slot(&var)?;
        self.entry = Some((var, value));
        Ok(())
    }

    fn vars(&self) -> Box<dyn Iterator<Item = &Var> + '_> {
        Box::new(self.entry.iter().map(|(v, _)| v))
    }

    fn len(&self) -> usize {
        usize::from(self.entry.is_some())
    }

    fn validate(&self, var: &Var, _value: &Term) -> Result<(), BindingError> {
        if var.name().is_empty() {
            return Err(BindingError::InvalidVariable {
                name: var.name().to_string(),
            });
        }
        self.check_slot(var)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum BindingError {
    #[error("Cannot bind {var}: single-assignment frame already holds {occupant}")]
    #[diagnostic(help(
        "Single-assignment frames take one variable; extend the chain with a new frame instead."
    ))]
    FrameFull { var: Var, occupant: Var },

    #[error("Invalid variable [{name}]")]
    #[diagnostic(help("Variables need a non-empty name."))]
    InvalidVariable { name: String },
}
