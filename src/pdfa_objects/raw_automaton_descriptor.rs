use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use serde_yaml::Value;
use std::io::BufRead;

use crate::{
    pdfa_framework::{
        importable::Importable,
        importer_parameters::ImporterParameterValues,
        pdfa_error::{PdfaError, ValidationIssue},
    },
    techniques::validation,
    yaml,
};

/**
 * A PDFA document as written, before validation. The derived fields of the nodes are optional,
 * and the declared counts are signed such that non-positive values can be reported as range
 * errors rather than format errors.
 */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawAutomatonDescriptor {
    pub beta: f64,
    pub alphabet_size: i64,
    pub num_states: i64,
    pub final_transition_sym: String,
    pub empty_transition_sym: String,
    pub start_state: String,
    pub smooth_transitions: bool,
    pub nodes: IndexMap<String, RawNodeRecord>,
    pub edges: IndexMap<String, IndexMap<String, EdgeRecord>>, //source -> target -> edge
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawNodeRecord {
    pub final_probability: f64,
    pub trans_distribution: Option<IndexMap<String, f64>>, //symbol -> probability
    pub is_accepting: Option<bool>,
}

/// The symbols that lead from one state to another, with their probabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRecord {
    pub symbols: Vec<String>,
    pub probabilities: Vec<f64>,
}

impl EdgeRecord {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.symbols.iter().zip(self.probabilities.iter())
    }

    pub fn get_total_probability(&self) -> f64 {
        self.probabilities.iter().sum()
    }
}

impl RawAutomatonDescriptor {
    /**
     * Reads the document into shape. Only types are checked here; all other invariants are left to
     * validation.
     */
    pub fn parse(reader: &mut dyn BufRead) -> Result<Self, PdfaError> {
        let yaml: Value = serde_yaml::from_reader(reader)
            .map_err(|e| PdfaError::format("<document>", e))?;
        Self::from_yaml(&yaml)
    }

    pub fn from_yaml(yaml: &Value) -> Result<Self, PdfaError> {
        yaml::read_mapping(yaml).map_err(|e| PdfaError::format("<document>", e))?;

        let beta = yaml::read_field_probability(yaml, "beta")?;
        let alphabet_size = yaml::read_field_integer(yaml, "alphabet_size")?;
        let num_states = yaml::read_field_integer(yaml, "num_states")?;
        let final_transition_sym = yaml::read_field_string(yaml, "final_transition_sym")?;
        let empty_transition_sym = yaml::read_field_string(yaml, "empty_transition_sym")?;
        let start_state = yaml::read_field_string(yaml, "start_state")?;
        let smooth_transitions = yaml::read_field_bool(yaml, "smooth_transitions")?;

        //nodes
        let mut nodes = IndexMap::new();
        for (jstate, jnode) in yaml::read_field_mapping(yaml, "nodes")? {
            let state = yaml::read_string(jstate)
                .map_err(|e| PdfaError::format("nodes", format!("invalid state identifier: {}", e)))?;
            let node = RawNodeRecord::from_yaml(jnode)
                .map_err(|e| e.within(&format!("nodes.{}", state)))?;
            if nodes.insert(state.clone(), node).is_some() {
                return Err(PdfaError::format(
                    "nodes",
                    format!("state `{}` is declared twice", state),
                ));
            }
        }

        //edges (a missing or empty table means no transitions at all)
        let mut edges = IndexMap::new();
        if let Some(jedges) = yaml::read_optional_field(yaml, "edges", yaml::read_mapping)? {
            for (jsource, jtargets) in jedges {
                let source = yaml::read_string(jsource).map_err(|e| {
                    PdfaError::format("edges", format!("invalid state identifier: {}", e))
                })?;
                let targets = Self::read_targets(jtargets)
                    .map_err(|e| e.within(&format!("edges.{}", source)))?;
                if edges.insert(source.clone(), targets).is_some() {
                    return Err(PdfaError::format(
                        "edges",
                        format!("source state `{}` is declared twice", source),
                    ));
                }
            }
        }

        Ok(Self {
            beta,
            alphabet_size,
            num_states,
            final_transition_sym,
            empty_transition_sym,
            start_state,
            smooth_transitions,
            nodes,
            edges,
        })
    }

    fn read_targets(jtargets: &Value) -> Result<IndexMap<String, EdgeRecord>, PdfaError> {
        let mut targets = IndexMap::new();
        if jtargets.is_null() {
            return Ok(targets);
        }
        let jtargets = yaml::read_mapping(jtargets).map_err(|e| PdfaError::format("targets", e))?;
        for (jtarget, jedge) in jtargets {
            let target = yaml::read_string(jtarget).map_err(|e| {
                PdfaError::format("targets", format!("invalid state identifier: {}", e))
            })?;
            let edge = EdgeRecord::from_yaml(jedge).map_err(|e| e.within(&target))?;
            if targets.insert(target.clone(), edge).is_some() {
                return Err(PdfaError::format(
                    "targets",
                    format!("target state `{}` is declared twice", target),
                ));
            }
        }
        Ok(targets)
    }

    /**
     * Returns the symbols emitted by any edge, in order of first appearance. The reserved final
     * and empty transition symbols are not part of the alphabet.
     */
    pub fn get_alphabet(&self) -> Vec<String> {
        self.edges
            .values()
            .flat_map(|targets| targets.values())
            .flat_map(|edge| edge.symbols.iter())
            .filter(|symbol| {
                **symbol != self.final_transition_sym && **symbol != self.empty_transition_sym
            })
            .unique()
            .cloned()
            .collect()
    }

    /// Every problem of this descriptor, in the order in which loading would report them.
    pub fn validate(&self, parameters: &ImporterParameterValues) -> Vec<ValidationIssue> {
        validation::validate(self, parameters)
    }
}

impl RawNodeRecord {
    fn from_yaml(jnode: &Value) -> Result<Self, PdfaError> {
        let final_probability = yaml::read_field_probability(jnode, "final_probability")?;
        let is_accepting = yaml::read_optional_field(jnode, "is_accepting", yaml::read_bool)?;
        let trans_distribution =
            match yaml::read_optional_field(jnode, "trans_distribution", yaml::read_mapping)? {
                None => None,
                Some(jdistribution) => {
                    let mut distribution = IndexMap::new();
                    for (jsymbol, jprobability) in jdistribution {
                        let symbol = yaml::read_string(jsymbol).map_err(|e| {
                            PdfaError::format("trans_distribution", format!("invalid symbol: {}", e))
                        })?;
                        let probability = yaml::read_probability(jprobability).map_err(|e| {
                            PdfaError::format(format!("trans_distribution.{}", symbol), e)
                        })?;
                        distribution.insert(symbol, probability);
                    }
                    Some(distribution)
                }
            };

        Ok(Self {
            final_probability,
            trans_distribution,
            is_accepting,
        })
    }
}

impl EdgeRecord {
    fn from_yaml(jedge: &Value) -> Result<Self, PdfaError> {
        let symbols = yaml::read_field_list(jedge, "symbols")?
            .iter()
            .enumerate()
            .map(|(i, jsymbol)| {
                yaml::read_string(jsymbol).map_err(|e| PdfaError::format(format!("symbols[{}]", i), e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let probabilities = yaml::read_field_list(jedge, "probabilities")?
            .iter()
            .enumerate()
            .map(|(i, jprobability)| {
                yaml::read_probability(jprobability)
                    .map_err(|e| PdfaError::format(format!("probabilities[{}]", i), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            symbols,
            probabilities,
        })
    }
}

impl Importable for RawAutomatonDescriptor {
    fn import(reader: &mut dyn BufRead, _: &ImporterParameterValues) -> Result<Self, PdfaError> {
        Self::parse(reader)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::pdfa_framework::{
        importable::Importable,
        importer_parameters::ImporterParameterValues,
        pdfa_error::{ErrorKind, PdfaError},
    };

    use super::RawAutomatonDescriptor;

    fn parse(text: &str) -> Result<RawAutomatonDescriptor, PdfaError> {
        RawAutomatonDescriptor::load(&mut text.as_bytes())
    }

    #[test]
    fn raw_example() {
        let fin = fs::read_to_string("testfiles/valid-example.pdfa").unwrap();
        let raw = parse(&fin).unwrap();

        assert_eq!(raw.beta, 0.9);
        assert_eq!(raw.alphabet_size, 3);
        assert_eq!(raw.start_state, "q1");
        assert!(!raw.smooth_transitions);
        assert_eq!(
            raw.nodes.keys().collect::<Vec<_>>(),
            vec!["q0", "q1", "q2"]
        );

        //derived fields are left open
        assert!(raw.nodes.values().all(|node| node.is_accepting.is_none()));
        assert!(raw.nodes.values().all(|node| node.trans_distribution.is_none()));

        assert_eq!(raw.get_alphabet(), vec!["0", "1", "2"]);
        assert!(raw.validate(&ImporterParameterValues::default()).is_empty());
    }

    #[test]
    fn raw_coercion() {
        let fin = fs::read_to_string("testfiles/valid-smoothed.pdfa").unwrap();
        let raw = parse(&fin).unwrap();

        assert_eq!(raw.final_transition_sym, "-1");
        assert_eq!(raw.start_state, "0");
        assert_eq!(raw.nodes["1"].final_probability, 0.25);
        assert_eq!(raw.edges["0"]["1"].symbols, vec!["0", "1"]);
        assert_eq!(raw.edges["0"]["1"].probabilities, vec![0.5, 0.5]);
    }

    #[test]
    fn raw_missing_field() {
        let error = parse("beta: 0.5\nalphabet_size: 1").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);
        assert!(error.to_string().contains("num_states"));
    }

    #[test]
    fn raw_not_a_mapping() {
        assert_eq!(parse("- 1\n- 2").unwrap_err().kind(), ErrorKind::Format);
        assert_eq!(parse("beta: [").unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn raw_nested_field_path() {
        let fin = fs::read_to_string("testfiles/valid-example.pdfa")
            .unwrap()
            .replace("probabilities:\n        - 0.75", "probabilities:\n        - high");
        match parse(&fin).unwrap_err() {
            PdfaError::Format { field, .. } => {
                assert_eq!(field, "edges.q1.q0.probabilities[0]")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn raw_length_mismatch_is_kept_for_validation() {
        let fin = fs::read_to_string("testfiles/invalid-format-length-mismatch.pdfa").unwrap();
        let raw = parse(&fin).unwrap();
        let issues = raw.validate(&ImporterParameterValues::default());
        assert_eq!(issues[0].kind(), ErrorKind::Format);
    }
}
