use std::io::BufRead;

use super::{importer_parameters::ImporterParameterValues, pdfa_error::PdfaError};

pub trait Importable {
    fn import(
        reader: &mut dyn BufRead,
        parameters: &ImporterParameterValues,
    ) -> Result<Self, PdfaError>
    where
        Self: Sized;

    /**
     * Imports with the default importer parameters.
     */
    fn load(reader: &mut dyn BufRead) -> Result<Self, PdfaError>
    where
        Self: Sized,
    {
        Self::import(reader, &ImporterParameterValues::default())
    }
}
