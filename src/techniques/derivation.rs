use indexmap::IndexMap;

use crate::{
    pdfa_framework::importer_parameters::ImporterParameterValues,
    pdfa_objects::{
        raw_automaton_descriptor::RawAutomatonDescriptor,
        transition_distribution::{TransitionDistribution, TransitionOutcome},
    },
};

pub fn is_accepting(final_probability: f64, beta: f64) -> bool {
    final_probability >= beta
}

/**
 * Derives the distribution over the outcomes of `state` from the edges of a validated descriptor.
 *
 * The outgoing probabilities and the final probability are normalised by their total. If the
 * descriptor asks for smoothing and the state has outgoing mass m, every symbol a of the alphabet
 * (extended with the symbols of the state itself) receives m * (p(a) + e) / (sum p + e * |A|),
 * where unseen symbols loop on the state. The final probability is not smoothed, so the total
 * remains 1.
 */
pub fn derive_transition_distribution(
    raw: &RawAutomatonDescriptor,
    state: &str,
    final_probability: f64,
    alphabet: &[String],
    parameters: &ImporterParameterValues,
) -> TransitionDistribution {
    let mut outcomes = vec![];
    if let Some(targets) = raw.edges.get(state) {
        for (target, edge) in targets {
            for (symbol, probability) in edge.iter() {
                outcomes.push(TransitionOutcome {
                    symbol: symbol.clone(),
                    target: target.clone(),
                    probability: *probability,
                });
            }
        }
    }

    let outgoing: f64 = outcomes.iter().map(|outcome| outcome.probability).sum();
    let total = outgoing + final_probability;
    if total > 0.0 {
        outcomes
            .iter_mut()
            .for_each(|outcome| outcome.probability /= total);
    }
    let final_share = if total > 0.0 {
        final_probability / total
    } else {
        1.0
    };
    let outgoing_mass = 1.0 - final_share;

    if raw.smooth_transitions && outgoing_mass > 0.0 {
        log::debug!("smooth the transitions of state {}", state);
        smooth(&mut outcomes, state, alphabet, outgoing_mass, parameters);
    }

    outcomes.push(TransitionOutcome {
        symbol: raw.final_transition_sym.clone(),
        target: state.to_string(),
        probability: final_share,
    });

    TransitionDistribution { outcomes }
}

fn smooth(
    outcomes: &mut Vec<TransitionOutcome>,
    state: &str,
    alphabet: &[String],
    outgoing_mass: f64,
    parameters: &ImporterParameterValues,
) {
    let epsilon = parameters.smoothing_amount;

    let unseen = alphabet
        .iter()
        .filter(|symbol| !outcomes.iter().any(|outcome| outcome.symbol == **symbol))
        .cloned()
        .collect::<Vec<_>>();
    let alphabet_size = (outcomes.len() + unseen.len()) as f64;
    let raw_sum: f64 = outcomes.iter().map(|outcome| outcome.probability).sum();
    let denominator = raw_sum + epsilon * alphabet_size;

    for outcome in outcomes.iter_mut() {
        outcome.probability = outgoing_mass * (outcome.probability + epsilon) / denominator;
    }
    for symbol in unseen {
        outcomes.push(TransitionOutcome {
            symbol,
            target: state.to_string(),
            probability: outgoing_mass * epsilon / denominator,
        });
    }
}

/**
 * Turns a distribution that was written in the document into outcomes. Symbols the state emits
 * lead to the target of their edge; all other symbols loop on the state.
 */
pub fn supplied_transition_distribution(
    raw: &RawAutomatonDescriptor,
    state: &str,
    distribution: &IndexMap<String, f64>,
) -> TransitionDistribution {
    let outcomes = distribution
        .iter()
        .map(|(symbol, probability)| TransitionOutcome {
            symbol: symbol.clone(),
            target: raw
                .edges
                .get(state)
                .and_then(|targets| {
                    targets
                        .iter()
                        .find(|(_, edge)| edge.symbols.contains(symbol))
                        .map(|(target, _)| target.clone())
                })
                .unwrap_or_else(|| state.to_string()),
            probability: *probability,
        })
        .collect();
    TransitionDistribution { outcomes }
}
