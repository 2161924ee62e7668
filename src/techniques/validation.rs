use std::collections::HashMap;

use crate::{
    pdfa_framework::{
        importer_parameters::ImporterParameterValues,
        pdfa_error::{PdfaError, StateReference, ValidationIssue},
    },
    pdfa_objects::raw_automaton_descriptor::RawAutomatonDescriptor,
};

const PROBABILITY: &str = "a real in [0, 1]";

pub fn is_probability(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/**
 * Runs every check on the descriptor and returns all issues found. Structural issues come first,
 * then determinism, then normalization, such that the first issue is the most fundamental one.
 */
pub fn validate(
    raw: &RawAutomatonDescriptor,
    parameters: &ImporterParameterValues,
) -> Vec<ValidationIssue> {
    let mut issues = vec![];
    if let Err(issue) = parameters.check() {
        issues.push(issue);
    }

    check_header(raw, &mut issues);
    check_nodes(raw, &mut issues);
    check_edges(raw, &mut issues);
    check_alphabet(raw, &mut issues);
    check_determinism(raw, &mut issues);
    check_normalization(raw, parameters, &mut issues);
    check_supplied_distributions(raw, parameters, &mut issues);

    for issue in &issues {
        log::warn!("{}", issue);
    }
    issues
}

fn check_header(raw: &RawAutomatonDescriptor, issues: &mut Vec<ValidationIssue>) {
    if !is_probability(raw.beta) {
        issues.push(PdfaError::Range {
            field: "beta".to_string(),
            state: None,
            expected: PROBABILITY.to_string(),
            actual: raw.beta.to_string(),
        });
    }

    if raw.alphabet_size <= 0 {
        issues.push(PdfaError::Range {
            field: "alphabet_size".to_string(),
            state: None,
            expected: "a positive integer".to_string(),
            actual: raw.alphabet_size.to_string(),
        });
    }

    if raw.num_states <= 0 {
        issues.push(PdfaError::Range {
            field: "num_states".to_string(),
            state: None,
            expected: "a positive integer".to_string(),
            actual: raw.num_states.to_string(),
        });
    } else if usize::try_from(raw.num_states).ok() != Some(raw.nodes.len()) {
        issues.push(PdfaError::Range {
            field: "num_states".to_string(),
            state: None,
            expected: format!("{} (the number of declared nodes)", raw.nodes.len()),
            actual: raw.num_states.to_string(),
        });
    }

    if raw.final_transition_sym == raw.empty_transition_sym {
        issues.push(PdfaError::format(
            "empty_transition_sym",
            format!(
                "`{}` is already reserved as the final transition symbol",
                raw.empty_transition_sym
            ),
        ));
    }

    if !raw.nodes.contains_key(&raw.start_state) {
        issues.push(PdfaError::Reference {
            state: raw.start_state.clone(),
            referenced_by: StateReference::StartState,
        });
    }
}

fn check_nodes(raw: &RawAutomatonDescriptor, issues: &mut Vec<ValidationIssue>) {
    for (state, node) in &raw.nodes {
        if !is_probability(node.final_probability) {
            issues.push(PdfaError::Range {
                field: "final_probability".to_string(),
                state: Some(state.clone()),
                expected: PROBABILITY.to_string(),
                actual: node.final_probability.to_string(),
            });
        }

        if let Some(is_accepting) = node.is_accepting {
            let expected = node.final_probability >= raw.beta;
            if is_accepting != expected {
                issues.push(PdfaError::Range {
                    field: "is_accepting".to_string(),
                    state: Some(state.clone()),
                    expected: format!(
                        "{} (final probability {} against beta {})",
                        expected, node.final_probability, raw.beta
                    ),
                    actual: is_accepting.to_string(),
                });
            }
        }
    }
}

fn check_edges(raw: &RawAutomatonDescriptor, issues: &mut Vec<ValidationIssue>) {
    for (source, targets) in &raw.edges {
        if !raw.nodes.contains_key(source) {
            issues.push(PdfaError::Reference {
                state: source.clone(),
                referenced_by: StateReference::EdgeSource,
            });
        }

        for (target, edge) in targets {
            if !raw.nodes.contains_key(target) {
                issues.push(PdfaError::Reference {
                    state: target.clone(),
                    referenced_by: StateReference::EdgeTarget {
                        source: source.clone(),
                    },
                });
            }

            if edge.symbols.len() != edge.probabilities.len() {
                issues.push(PdfaError::format(
                    format!("edges.{}.{}", source, target),
                    format!(
                        "{} symbols are given, but {} probabilities",
                        edge.symbols.len(),
                        edge.probabilities.len()
                    ),
                ));
            }

            for (i, probability) in edge.probabilities.iter().enumerate() {
                if !is_probability(*probability) {
                    issues.push(PdfaError::Range {
                        field: format!("edges.{}.{}.probabilities[{}]", source, target, i),
                        state: Some(source.clone()),
                        expected: PROBABILITY.to_string(),
                        actual: probability.to_string(),
                    });
                }
            }
        }
    }
}

fn check_alphabet(raw: &RawAutomatonDescriptor, issues: &mut Vec<ValidationIssue>) {
    let used = raw.get_alphabet().len();
    if raw.alphabet_size > 0 && i64::try_from(used).map_or(true, |used| used > raw.alphabet_size)
    {
        issues.push(PdfaError::Range {
            field: "alphabet_size".to_string(),
            state: None,
            expected: format!(
                "at least {} (the number of distinct symbols used in edges)",
                used
            ),
            actual: raw.alphabet_size.to_string(),
        });
    }
}

/**
 * Every state has at most one outgoing transition per symbol, and no edge may emit the final
 * transition symbol, as that symbol already denotes termination.
 */
fn check_determinism(raw: &RawAutomatonDescriptor, issues: &mut Vec<ValidationIssue>) {
    for (source, targets) in &raw.edges {
        let mut symbol2target: HashMap<&str, &str> = HashMap::new();
        for (target, edge) in targets {
            for symbol in &edge.symbols {
                if *symbol == raw.final_transition_sym {
                    issues.push(PdfaError::Determinism {
                        state: source.clone(),
                        symbol: symbol.clone(),
                        first_target: source.clone(),
                        second_target: target.clone(),
                    });
                } else if let Some(previous) = symbol2target.insert(symbol, target) {
                    issues.push(PdfaError::Determinism {
                        state: source.clone(),
                        symbol: symbol.clone(),
                        first_target: previous.to_string(),
                        second_target: target.clone(),
                    });
                }
            }
        }
    }
}

fn check_normalization(
    raw: &RawAutomatonDescriptor,
    parameters: &ImporterParameterValues,
    issues: &mut Vec<ValidationIssue>,
) {
    for (state, node) in &raw.nodes {
        let outgoing: f64 = raw
            .edges
            .get(state)
            .map(|targets| targets.values().map(|edge| edge.get_total_probability()).sum())
            .unwrap_or(0.0);
        let total = outgoing + node.final_probability;
        if !is_normalized(total, parameters) {
            issues.push(PdfaError::Normalization {
                state: state.clone(),
                field: "outgoing probabilities plus final probability".to_string(),
                total,
                tolerance: parameters.normalization_tolerance,
            });
        }
    }
}

fn check_supplied_distributions(
    raw: &RawAutomatonDescriptor,
    parameters: &ImporterParameterValues,
    issues: &mut Vec<ValidationIssue>,
) {
    let alphabet = raw.get_alphabet();
    for (state, node) in &raw.nodes {
        let Some(distribution) = &node.trans_distribution else {
            continue;
        };

        for (symbol, probability) in distribution {
            let emitted = raw.edges.get(state).is_some_and(|targets| {
                targets.values().any(|edge| edge.symbols.contains(symbol))
            });
            let known = *symbol == raw.final_transition_sym
                || emitted
                || (raw.smooth_transitions && alphabet.contains(symbol));
            if !known {
                issues.push(PdfaError::Range {
                    field: "trans_distribution".to_string(),
                    state: Some(state.clone()),
                    expected: "a symbol emitted by the state, an alphabet symbol (when smoothing) or the final transition symbol".to_string(),
                    actual: format!("`{}`", symbol),
                });
            }

            if !is_probability(*probability) {
                issues.push(PdfaError::Range {
                    field: format!("trans_distribution.{}", symbol),
                    state: Some(state.clone()),
                    expected: PROBABILITY.to_string(),
                    actual: probability.to_string(),
                });
            }
        }

        let total: f64 = distribution.values().sum();
        if !is_normalized(total, parameters) {
            issues.push(PdfaError::Normalization {
                state: state.clone(),
                field: "trans_distribution probabilities".to_string(),
                total,
                tolerance: parameters.normalization_tolerance,
            });
        }
    }
}

fn is_normalized(total: f64, parameters: &ImporterParameterValues) -> bool {
    (total - 1.0).abs() <= parameters.normalization_tolerance
}
