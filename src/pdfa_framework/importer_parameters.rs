use crate::pdfa_framework::pdfa_error::PdfaError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImporterParameter {
    pub name: &'static str,
    pub explanation: &'static str,
    pub default_value: f64,
}

pub const NORMALIZATION_TOLERANCE: ImporterParameter = ImporterParameter {
    name: "normalization_tolerance",
    explanation: "Maximum absolute deviation from 1 allowed for the probability mass leaving a state (outgoing transitions plus final probability)",
    default_value: 1e-6,
};

pub const SMOOTHING_AMOUNT: ImporterParameter = ImporterParameter {
    name: "smoothing_amount",
    explanation: "Additive smoothing constant that is added to every alphabet symbol of a state before renormalisation, if the automaton asks for smoothed transitions",
    default_value: 1e-4,
};

pub const IMPORTER_PARAMETERS: &[ImporterParameter] = &[NORMALIZATION_TOLERANCE, SMOOTHING_AMOUNT];

/// The configuration of a load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImporterParameterValues {
    pub(crate) normalization_tolerance: f64,
    pub(crate) smoothing_amount: f64,
}

impl ImporterParameterValues {
    pub fn new() -> Self {
        Self {
            normalization_tolerance: NORMALIZATION_TOLERANCE.default_value,
            smoothing_amount: SMOOTHING_AMOUNT.default_value,
        }
    }

    pub fn with_normalization_tolerance(mut self, tolerance: f64) -> Self {
        self.normalization_tolerance = tolerance;
        self
    }

    pub fn with_smoothing_amount(mut self, amount: f64) -> Self {
        self.smoothing_amount = amount;
        self
    }

    pub fn get_normalization_tolerance(&self) -> f64 {
        self.normalization_tolerance
    }

    pub fn get_smoothing_amount(&self) -> f64 {
        self.smoothing_amount
    }

    pub fn get(&self, parameter: &ImporterParameter) -> Option<f64> {
        match parameter.name {
            name if name == NORMALIZATION_TOLERANCE.name => Some(self.normalization_tolerance),
            name if name == SMOOTHING_AMOUNT.name => Some(self.smoothing_amount),
            _ => None,
        }
    }

    /**
     * Every parameter must be a positive, finite real.
     */
    pub fn check(&self) -> Result<(), PdfaError> {
        for parameter in IMPORTER_PARAMETERS {
            if let Some(value) = self.get(parameter) {
                if !value.is_finite() || value <= 0.0 {
                    return Err(PdfaError::Range {
                        field: parameter.name.to_string(),
                        state: None,
                        expected: "a positive real".to_string(),
                        actual: value.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for ImporterParameterValues {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::pdfa_framework::pdfa_error::{ErrorKind, PdfaError};

    use super::{IMPORTER_PARAMETERS, ImporterParameterValues, SMOOTHING_AMOUNT};

    #[test]
    fn defaults() {
        let parameters = ImporterParameterValues::default();
        assert_eq!(parameters.get_normalization_tolerance(), 1e-6);
        assert_eq!(parameters.get_smoothing_amount(), 1e-4);
        for parameter in IMPORTER_PARAMETERS {
            assert_eq!(parameters.get(parameter), Some(parameter.default_value));
        }
        assert!(parameters.check().is_ok());
    }

    #[test]
    fn reject_non_positive() {
        let parameters = ImporterParameterValues::new().with_smoothing_amount(0.0);
        match parameters.check() {
            Err(PdfaError::Range { field, .. }) => assert_eq!(field, SMOOTHING_AMOUNT.name),
            other => panic!("unexpected {:?}", other),
        }

        let parameters = ImporterParameterValues::new().with_normalization_tolerance(f64::NAN);
        assert_eq!(parameters.check().unwrap_err().kind(), ErrorKind::Range);
    }
}
