use anyhow::Result;
use std::{fmt::Display, io::BufRead, path::Path};

use super::{
    exportable::Exportable,
    importable::Importable,
    importer_parameters::ImporterParameterValues,
    pdfa_error::{PdfaError, ValidationIssue},
    validate::Validate,
};
use crate::pdfa_objects::automaton_descriptor::AutomatonDescriptor;

pub const FORMAT_SPECIFICATION: &str = "A probabilistic deterministic finite automaton is a YAML (or JSON) structure with the top level being an object.
    This object contains the following key-value pairs:
    \\begin{itemize}
    \\item \\texttt{beta}, the acceptance threshold, a real in $[0, 1]$. A state is accepting if its final probability is at least beta.
    \\item \\texttt{alphabet\\_size}, a positive integer that is at least the number of distinct symbols used on edges.
    \\item \\texttt{num\\_states}, a positive integer being the number of nodes.
    \\item \\texttt{final\\_transition\\_sym}, the symbol that denotes termination. It may not be used on edges.
    \\item \\texttt{empty\\_transition\\_sym}, the symbol that denotes the empty transition.
    \\item \\texttt{start\\_state}, the identifier of the initial state.
    \\item \\texttt{smooth\\_transitions}, a boolean that indicates whether transition distributions are to be smoothed.
    \\item \\texttt{nodes}, an object mapping each state identifier to an object with \\texttt{final\\_probability} and the optional \\texttt{trans\\_distribution} (an object from symbols to probabilities) and \\texttt{is\\_accepting}.
    \\item \\texttt{edges}, an optional object mapping each source state to an object mapping each target state to an object with the lists \\texttt{symbols} and \\texttt{probabilities} of equal length.
    \\end{itemize}
    A state has at most one outgoing transition per symbol, and its outgoing probabilities plus its final probability sum to 1.
    Probabilities may be given as a number, or as a decimal or a fraction in a string.";

#[derive(Clone, Debug)]
pub struct PdfaFileHandler {
    pub name: &'static str,
    pub file_extension: &'static str,
    pub format_specification: &'static str,
    pub validator: fn(&mut dyn BufRead) -> Vec<ValidationIssue>,
    pub importer: fn(&mut dyn BufRead) -> Result<AutomatonDescriptor, PdfaError>,
    pub exporter: fn(&AutomatonDescriptor, &mut dyn std::io::Write) -> Result<()>,
}

pub const PDFA_FILE_HANDLER: PdfaFileHandler = PdfaFileHandler {
    name: "probabilistic deterministic finite automaton",
    file_extension: "pdfa",
    format_specification: FORMAT_SPECIFICATION,
    validator: validate_with_defaults,
    importer: AutomatonDescriptor::load,
    exporter: export,
};

fn validate_with_defaults(reader: &mut dyn BufRead) -> Vec<ValidationIssue> {
    AutomatonDescriptor::validate_document(reader, &ImporterParameterValues::default())
}

fn export(descriptor: &AutomatonDescriptor, f: &mut dyn std::io::Write) -> Result<()> {
    descriptor.export(f)
}

impl PdfaFileHandler {
    pub fn handles(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|extension| extension == self.file_extension)
    }
}

impl Display for PdfaFileHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
