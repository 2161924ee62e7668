pub mod pdfa_framework {
    pub mod exportable;
    pub mod importable;
    pub mod importer_parameters;
    pub mod infoable;
    pub mod pdfa_error;
    pub mod pdfa_file_handler;
    pub mod pdfa_input;
    pub mod validate;
}
pub mod pdfa_objects {
    pub mod automaton_descriptor;
    pub mod raw_automaton_descriptor;
    pub mod transition_distribution;
}
pub mod pdfa_traits {
    pub mod graphable;
}
pub mod techniques {
    pub mod derivation;
    pub mod validation;
}
pub mod yaml;


pub use pdfa_framework::{
    importable::Importable,
    importer_parameters::ImporterParameterValues,
    pdfa_error::{ErrorKind, PdfaError, ValidationIssue},
    pdfa_input::load_file,
};
pub use pdfa_objects::automaton_descriptor::AutomatonDescriptor;
