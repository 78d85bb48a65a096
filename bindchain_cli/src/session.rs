//! State of an interactive shell: the chain built so far and the frame being
//! populated on top of it.

use std::{fmt::Write, mem, sync::Arc};

use bindchain_engine::{
    output::{export_tsv, projection, ResultRow},
    Binding, BindingError, CheckPolicy, Frame, Var,
};
use miette::Diagnostic;
use thiserror::Error;

use crate::command::Command;

pub const HELP: &str = "\
?x = TERM     bind ?x in the frame being built (TERM may be UNDEF)
get ?x        look ?x up along the chain
size | vars   count or list the assignments along the chain
show          render the chain, newest frame first
json | tsv    print the chain as a flattened result row
tree          show every sealed frame from the root down
extend        seal the current frame and build on top of it
branch        seal the current frame and start a sibling
reset         drop everything and start a new root
check on|off  checking for new chains
unique on|off duplicate-variable warnings for new chains
quit";

pub struct Session {
    policy: CheckPolicy,
    // Sealed frames, root first. Frames only hold weak links to their
    // children, so the session keeps them alive for `tree`.
    sealed: Vec<Arc<Frame>>,
    base: Option<Arc<Frame>>,
    pending: Frame,
}

impl Session {
    pub fn new(policy: CheckPolicy) -> Self {
        Self {
            policy,
            sealed: Vec::new(),
            base: None,
            pending: Frame::root_with_policy(policy),
        }
    }

    pub fn pending(&self) -> &Frame {
        &self.pending
    }

    pub fn depth(&self) -> usize {
        self.pending.depth()
    }

    /// Runs one command; returns the text to print, if any.
    pub fn execute(&mut self, command: Command) -> Result<Option<String>, SessionError> {
        let output = match command {
            Command::Bind { var, value } => {
                self.pending.add(var, value)?;
                None
            }
            Command::Get(var) => Some(match self.pending.get(&var) {
                Some(value) => value.to_string(),
                None => format!("{} is unbound", var),
            }),
            Command::Size => Some(self.pending.size().to_string()),
            Command::Vars => Some(
                self.pending
                    .vars()
                    .map(Var::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Command::Show => Some(self.pending.to_string()),
            Command::Json => {
                let row = ResultRow::flatten(&self.pending);
                Some(serde_json::to_string_pretty(&row)?)
            }
            Command::Tsv => {
                let row = ResultRow::flatten(&self.pending);
                let vars = projection(std::slice::from_ref(&row));
                Some(export_tsv(&vars, &[row]).trim_end().to_string())
            }
            Command::Tree => Some(self.render_tree()),
            Command::Extend => {
                let sealed = self.seal_pending();
                self.pending = Frame::extend(&sealed);
                self.base = Some(sealed);
                None
            }
            Command::Branch => {
                let base = self.base.clone().ok_or(SessionError::BranchAtRoot)?;
                self.seal_pending();
                self.pending = Frame::extend(&base);
                None
            }
            Command::Reset => {
                *self = Session::new(self.policy);
                None
            }
            Command::Check(on) => {
                self.policy.checking = on;
                Some(format!("checking {} for new chains", on_off(on)))
            }
            Command::Unique(on) => {
                self.policy.unique_names = on;
                Some(format!(
                    "duplicate-variable warnings {} for new chains",
                    on_off(on)
                ))
            }
            Command::Help => Some(HELP.to_string()),
            Command::Quit => None,
        };
        Ok(output)
    }

    fn seal_pending(&mut self) -> Arc<Frame> {
        let placeholder = Frame::root_with_policy(self.policy);
        let sealed = mem::replace(&mut self.pending, placeholder).seal();
        self.sealed.push(Arc::clone(&sealed));
        sealed
    }

    fn render_tree(&self) -> String {
        let mut out = String::new();
        match self.sealed.first() {
            Some(root) => render_frame(root, 0, &mut out),
            None => out.push_str("(nothing sealed yet)\n"),
        }
        write!(
            out,
            "building at depth {}: {}",
            self.pending.depth(),
            describe(&self.pending)
        )
        .unwrap();
        out
    }
}

fn render_frame(frame: &Frame, indent: usize, out: &mut String) {
    writeln!(out, "{}{}", "  ".repeat(indent), describe(frame)).unwrap();
    for child in frame.children() {
        render_frame(&child, indent + 1, out);
    }
}

fn describe(frame: &Frame) -> String {
    let local = frame.display_local().to_string();
    if local.is_empty() {
        "(empty)".to_string()
    } else {
        local
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Binding(#[from] BindingError),

    #[error("Cannot branch from the root frame")]
    #[diagnostic(help("Use `extend` first; branches are siblings on top of a sealed frame."))]
    BranchAtRoot,

    #[error("Could not render JSON")]
    Json(#[from] serde_json::Error),
}
