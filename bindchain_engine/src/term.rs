//! Values bound to variables.
//!
//! A [`Term`] is an immutable RDF term. Bindings treat it as opaque: they only
//! clone it, compare it for equality and print it.

use std::{fmt, str::FromStr, sync::Arc};

use miette::Diagnostic;
use thiserror::Error;

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(Arc<str>),
    BlankNode(Arc<str>),
    Literal(Literal),
}

/// A literal. `datatype` is `None` for plain (`xsd:string`) and language-tagged literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub lexical: Arc<str>,
    pub datatype: Option<Arc<str>>,
    pub lang: Option<Arc<str>>,
}

impl Term {
    pub fn iri(iri: impl Into<Arc<str>>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank(label: impl Into<Arc<str>>) -> Self {
        Term::BlankNode(label.into())
    }

    pub fn literal(lexical: impl Into<Arc<str>>) -> Self {
        Term::Literal(Literal {
            lexical: lexical.into(),
            datatype: None,
            lang: None,
        })
    }

    pub fn typed(lexical: impl Into<Arc<str>>, datatype: impl Into<Arc<str>>) -> Self {
        let datatype = datatype.into();
        Term::Literal(Literal {
            lexical: lexical.into(),
            datatype: (&*datatype != XSD_STRING).then_some(datatype),
            lang: None,
        })
    }

    pub fn lang(lexical: impl Into<Arc<str>>, lang: impl Into<Arc<str>>) -> Self {
        Term::Literal(Literal {
            lexical: lexical.into(),
            datatype: None,
            lang: Some(lang.into()),
        })
    }

    pub fn integer(value: i64) -> Self {
        Term::typed(value.to_string(), XSD_INTEGER)
    }

    /// The IRI, blank node label or literal lexical form.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::BlankNode(label) => label,
            Term::Literal(lit) => &lit.lexical,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(label) => write!(f, "_:{}", label),
            Term::Literal(lit) => {
                f.write_str("\"")?;
                for chr in lit.lexical.chars() {
                    match chr {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")?;
                if let Some(lang) = &lit.lang {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl FromStr for Term {
    type Err = TermParseError;

    /// Parses the N-Triples term syntax, plus bare integers, decimals and booleans.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.is_empty() {
            return Err(TermParseError::Empty);
        }
        let (term, consumed) = if let Some(rest) = text.strip_prefix('<') {
            let end = rest.find('>').ok_or(TermParseError::Unterminated {
                offset: 0,
                what: "IRI",
            })?;
            (Term::iri(&rest[..end]), end + 2)
        } else if let Some(label) = text.strip_prefix("_:") {
            if label.is_empty() {
                return Err(TermParseError::EmptyLabel { offset: 2 });
            }
            let end = label.find(char::is_whitespace).unwrap_or(label.len());
            (Term::blank(&label[..end]), end + 2)
        } else if text.starts_with('"') {
            parse_literal(text)?
        } else {
            (parse_bare(text)?, text.len())
        };
        if consumed < text.len() {
            return Err(TermParseError::TrailingInput { offset: consumed });
        }
        Ok(term)
    }
}

fn parse_literal(text: &str) -> Result<(Term, usize), TermParseError> {
    let mut lexical = String::new();
    let mut chars = text.char_indices().skip(1);
    let mut close = None;
    while let Some((idx, chr)) = chars.next() {
        match chr {
            '"' => {
                close = Some(idx);
                break;
            }
            '\\' => {
                let (esc_idx, esc) = chars.next().ok_or(TermParseError::Unterminated {
                    offset: 0,
                    what: "string literal",
                })?;
                lexical.push(match esc {
                    '"' => '"',
                    '\\' => '\\',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    found => {
                        return Err(TermParseError::InvalidEscape {
                            offset: esc_idx,
                            found,
                        })
                    }
                });
            }
            c => lexical.push(c),
        }
    }
    let close = close.ok_or(TermParseError::Unterminated {
        offset: 0,
        what: "string literal",
    })?;
    let suffix_start = close + 1;
    let suffix = &text[suffix_start..];
    if let Some(lang) = suffix.strip_prefix('@') {
        let end = lang.find(char::is_whitespace).unwrap_or(lang.len());
        if end == 0 {
            return Err(TermParseError::EmptyLabel {
                offset: suffix_start + 1,
            });
        }
        Ok((Term::lang(lexical, &lang[..end]), suffix_start + 1 + end))
    } else if let Some(dt) = suffix.strip_prefix("^^<") {
        let end = dt.find('>').ok_or(TermParseError::Unterminated {
            offset: suffix_start + 2,
            what: "datatype IRI",
        })?;
        Ok((Term::typed(lexical, &dt[..end]), suffix_start + 3 + end + 1))
    } else {
        Ok((Term::literal(lexical), suffix_start))
    }
}

fn parse_bare(text: &str) -> Result<Term, TermParseError> {
    match text {
        "true" | "false" => return Ok(Term::typed(text, XSD_BOOLEAN)),
        _ => {}
    }
    let digits = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match fraction {
        None if all_digits(whole) => Ok(Term::typed(text, XSD_INTEGER)),
        Some(fraction) if all_digits(fraction) && (whole.is_empty() || all_digits(whole)) => {
            Ok(Term::typed(text, XSD_DECIMAL))
        }
        _ => Err(TermParseError::Unrecognized { offset: 0 }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TermParseError {
    #[error("Expected a term")]
    Empty,

    #[error("Unterminated {what}")]
    Unterminated { offset: usize, what: &'static str },

    #[error("Invalid escape sequence \\{found}")]
    #[diagnostic(help("Supported escapes are \\\" \\\\ \\n \\r \\t."))]
    InvalidEscape { offset: usize, found: char },

    #[error("Unexpected input after term")]
    TrailingInput { offset: usize },

    #[error("Empty label")]
    EmptyLabel { offset: usize },

    #[error("Not a term")]
    #[diagnostic(help(
        "Terms are <iri>, _:label, \"literal\", \"literal\"@lang, \"literal\"^^<datatype>, numbers or booleans."
    ))]
    Unrecognized { offset: usize },
}

impl TermParseError {
    /// Byte offset into the parsed text where the problem starts.
    pub fn offset(&self) -> usize {
        match self {
            TermParseError::Empty => 0,
            TermParseError::Unterminated { offset, .. }
            | TermParseError::InvalidEscape { offset, .. }
            | TermParseError::TrailingInput { offset }
            | TermParseError::EmptyLabel { offset }
            | TermParseError::Unrecognized { offset } => *offset,
        }
    }
}
