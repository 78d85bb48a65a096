//! Chained variable bindings for query evaluation.
//!
//! A binding maps query variables to terms and represents one row of partial or
//! complete results. Bindings are built as chains of [`frame::Frame`]s, each
//! layering new assignments over a shared parent.

pub mod frame;
pub mod output;
pub mod policy;
pub mod storage;
pub mod term;
pub mod var;

pub use frame::{same, Binding, Frame};
pub use policy::CheckPolicy;
pub use storage::{BindingError, FrameStorage, MultiStorage, SingleStorage};
pub use term::Term;
pub use var::Var;
