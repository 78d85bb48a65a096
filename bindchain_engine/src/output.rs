use serde::{ser::SerializeMap, Serialize, Serializer};
use std::fmt::Write;

use crate::{
    frame::{Binding, Vars},
    term::Term,
    var::Var,
};

/// A finished solution, flattened to one entry per visible variable.
///
/// A row is itself a parentless [`Binding`], so it can be compared against the
/// chain it came from with [`crate::frame::same`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRow {
    entries: Vec<(Var, Term)>,
}

impl ResultRow {
    /// Collects every variable of `binding` once, in `vars()` order, with the
    /// value `get` returns for it.
    pub fn flatten<B: Binding + ?Sized>(binding: &B) -> Self {
        let mut entries: Vec<(Var, Term)> = Vec::with_capacity(binding.size());
        for var in binding.vars() {
            if entries.iter().any(|(v, _)| v == var) {
                continue;
            }
            if let Some(value) = binding.get(var) {
                entries.push((var.clone(), value.clone()));
            }
        }
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Var, &Term)> {
        self.entries.iter().map(|(var, value)| (var, value))
    }

    /// Entries a user gets to see.
    pub fn visible(&self) -> impl Iterator<Item = (&Var, &Term)> {
        self.iter().filter(|(var, _)| !var.is_system())
    }
}

impl Binding for ResultRow {
    fn get(&self, var: &Var) -> Option<&Term> {
        self.entries
            .iter()
            .find(|(v, _)| v == var)
            .map(|(_, value)| value)
    }

    fn contains(&self, var: &Var) -> bool {
        self.entries.iter().any(|(v, _)| v == var)
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn vars(&self) -> Vars<'_> {
        Box::new(self.entries.iter().map(|(var, _)| var))
    }

    fn parent(&self) -> Option<&dyn Binding> {
        None
    }
}

/// One term in the SPARQL 1.1 JSON results format.
#[derive(Serialize)]
struct JsonTerm<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    datatype: Option<&'a str>,
    #[serde(rename = "xml:lang", skip_serializing_if = "Option::is_none")]
    lang: Option<&'a str>,
}

impl<'a> From<&'a Term> for JsonTerm<'a> {
    fn from(term: &'a Term) -> Self {
        let (kind, datatype, lang) = match term {
            Term::Iri(_) => ("uri", None, None),
            Term::BlankNode(_) => ("bnode", None, None),
            Term::Literal(lit) => ("literal", lit.datatype.as_deref(), lit.lang.as_deref()),
        };
        JsonTerm {
            kind,
            value: term.lexical(),
            datatype,
            lang,
        }
    }
}

/// Serializes as one element of the `results.bindings` array, leaving out
/// system variables.
impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (var, value) in self.visible() {
            map.serialize_entry(var.name(), &JsonTerm::from(value))?;
        }
        map.end()
    }
}

/// Renders rows as SPARQL TSV. Unbound variables leave their cell empty.
pub fn export_tsv(vars: &[Var], rows: &[ResultRow]) -> String {
    let mut string = String::new();
    let header: Vec<String> = vars.iter().map(Var::to_string).collect();
    writeln!(string, "{}", header.join("\t")).unwrap();
    for row in rows {
        let cells: Vec<String> = vars
            .iter()
            .map(|var| row.get(var).map(Term::to_string).unwrap_or_default())
            .collect();
        writeln!(string, "{}", cells.join("\t")).unwrap();
    }
    string
}

/// Visible variables over all rows, in order of first appearance.
pub fn projection(rows: &[ResultRow]) -> Vec<Var> {
    let mut vars: Vec<Var> = Vec::new();
    for (var, _) in rows.iter().flat_map(|row| row.visible()) {
        if !vars.contains(var) {
            vars.push(var.clone());
        }
    }
    vars
}
