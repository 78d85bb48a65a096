//! Parsing of shell input lines.

use bindchain_engine::{
    term::TermParseError,
    var::VarError,
    Term, Var,
};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `?x = TERM`, or `?x = UNDEF` for an add without a value.
    Bind { var: Var, value: Option<Term> },
    Get(Var),
    Size,
    Vars,
    Show,
    Json,
    Tsv,
    Tree,
    Extend,
    Branch,
    Reset,
    Check(bool),
    Unique(bool),
    Help,
    Quit,
}

/// A trimmed slice of the input line and where it starts.
#[derive(Debug, Clone, Copy)]
struct Part<'a> {
    start: usize,
    text: &'a str,
}

impl<'a> Part<'a> {
    fn of(line: &'a str, start: usize, end: usize) -> Self {
        let raw = &line[start..end];
        let lead = raw.len() - raw.trim_start().len();
        Part {
            start: start + lead,
            text: raw.trim(),
        }
    }

    fn span(&self) -> SourceSpan {
        (self.start, self.text.len()).into()
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let whole = Part::of(line, 0, line.len());
    if whole.text.starts_with(&['?', '$'][..]) {
        if let Some(eq) = line.find('=') {
            return parse_bind(line, eq);
        }
    }

    let name_end = whole
        .text
        .find(char::is_whitespace)
        .map_or(line.len(), |idx| whole.start + idx);
    let name = Part::of(line, whole.start, name_end);
    let arg = Part::of(line, name_end, line.len());

    let no_arg = |command: Command| {
        if arg.is_empty() {
            Ok(command)
        } else {
            Err(CommandError::UnexpectedArgument {
                span: arg.span(),
                command: name.text.to_string(),
            })
        }
    };

    match name.text {
        "get" => Ok(Command::Get(parse_var(name, arg, "get")?)),
        "size" => no_arg(Command::Size),
        "vars" => no_arg(Command::Vars),
        "show" => no_arg(Command::Show),
        "json" => no_arg(Command::Json),
        "tsv" => no_arg(Command::Tsv),
        "tree" => no_arg(Command::Tree),
        "extend" => no_arg(Command::Extend),
        "branch" => no_arg(Command::Branch),
        "reset" => no_arg(Command::Reset),
        "help" => no_arg(Command::Help),
        "quit" | "exit" => no_arg(Command::Quit),
        "check" => Ok(Command::Check(parse_switch(name, arg, "check")?)),
        "unique" => Ok(Command::Unique(parse_switch(name, arg, "unique")?)),
        _ => Err(CommandError::UnknownCommand {
            span: name.span(),
            name: name.text.to_string(),
        }),
    }
}

fn parse_bind(line: &str, eq: usize) -> Result<Command, CommandError> {
    let var_part = Part::of(line, 0, eq);
    let value_part = Part::of(line, eq + 1, line.len());
    let var = Var::parse(var_part.text).map_err(|source| CommandError::InvalidVariable {
        span: var_part.span(),
        source,
    })?;
    if value_part.is_empty() {
        return Err(CommandError::MissingArgument {
            span: (eq, 1).into(),
            command: "=",
            expected: "a term or UNDEF",
        });
    }
    let value = if value_part.text == "UNDEF" {
        None
    } else {
        let term = value_part.text.parse::<Term>().map_err(|source| {
            let offset = source.offset().min(value_part.text.len().saturating_sub(1));
            CommandError::InvalidTerm {
                span: (value_part.start + offset, 1).into(),
                source,
            }
        })?;
        Some(term)
    };
    Ok(Command::Bind { var, value })
}

fn parse_var(name: Part<'_>, arg: Part<'_>, command: &'static str) -> Result<Var, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            span: name.span(),
            command,
            expected: "a variable",
        });
    }
    Var::parse(arg.text).map_err(|source| CommandError::InvalidVariable {
        span: arg.span(),
        source,
    })
}

fn parse_switch(
    name: Part<'_>,
    arg: Part<'_>,
    command: &'static str,
) -> Result<bool, CommandError> {
    match arg.text {
        "on" => Ok(true),
        "off" => Ok(false),
        "" => Err(CommandError::MissingArgument {
            span: name.span(),
            command,
            expected: "on or off",
        }),
        _ => Err(CommandError::InvalidSwitch { span: arg.span() }),
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CommandError {
    #[error("Unknown command [{name}]")]
    #[diagnostic(help("Type `help` for a list of commands."))]
    UnknownCommand {
        #[label = "Not a command"]
        span: SourceSpan,
        name: String,
    },

    #[error("Missing argument")]
    MissingArgument {
        #[label = "[{command}] expects {expected}"]
        span: SourceSpan,
        command: &'static str,
        expected: &'static str,
    },

    #[error("Unexpected argument")]
    UnexpectedArgument {
        #[label = "[{command}] takes no arguments"]
        span: SourceSpan,
        command: String,
    },

    #[error("Invalid variable")]
    InvalidVariable {
        #[label = "{source}"]
        span: SourceSpan,
        #[source]
        #[diagnostic_source]
        source: VarError,
    },

    #[error("Invalid term")]
    InvalidTerm {
        #[label = "{source}"]
        span: SourceSpan,
        #[source]
        #[diagnostic_source]
        source: TermParseError,
    },

    #[error("Expected on or off")]
    InvalidSwitch {
        #[label = "Not a switch"]
        span: SourceSpan,
    },
}
