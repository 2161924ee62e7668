use std::io::BufRead;

use super::{
    importable::Importable, importer_parameters::ImporterParameterValues,
    pdfa_error::ValidationIssue,
};

pub trait Validate: Importable {
    /**
     * Reports every problem of the document instead of stopping at the first one. A document that
     * cannot be read into shape yields a single format issue.
     */
    fn validate_document(
        reader: &mut dyn BufRead,
        parameters: &ImporterParameterValues,
    ) -> Vec<ValidationIssue>
    where
        Self: Sized;

    fn is_valid_document(reader: &mut dyn BufRead, parameters: &ImporterParameterValues) -> bool
    where
        Self: Sized,
    {
        Self::validate_document(reader, parameters).is_empty()
    }
}
