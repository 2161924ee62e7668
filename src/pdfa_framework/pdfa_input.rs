use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    pdfa_framework::importable::Importable,
    pdfa_objects::automaton_descriptor::AutomatonDescriptor,
};

pub fn get_reader_file(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("could not open file {}", path.display()))?;
    Ok(BufReader::new(file))
}

pub fn get_reader_str(text: &str) -> impl BufRead + '_ {
    std::io::Cursor::new(text.as_bytes())
}

/// Loads a descriptor from a file with the default importer parameters.
pub fn load_file(path: &Path) -> Result<AutomatonDescriptor> {
    log::info!("load PDFA descriptor from {}", path.display());
    let mut reader = get_reader_file(path)?;
    AutomatonDescriptor::load(&mut reader).with_context(|| format!("loading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::pdfa_framework::pdfa_error::{ErrorKind, PdfaError};

    use super::load_file;

    #[test]
    fn missing_file() {
        let error = load_file(Path::new("testfiles/does-not-exist.pdfa")).unwrap_err();
        assert!(error.to_string().contains("could not open file"));
    }

    #[test]
    fn error_kind_survives_context() {
        let error =
            load_file(Path::new("testfiles/invalid-reference-start-state.pdfa")).unwrap_err();
        let cause = error.downcast_ref::<PdfaError>().unwrap();
        assert_eq!(cause.kind(), ErrorKind::Reference);
        assert_eq!(cause.state(), Some("q9"));
    }
}
