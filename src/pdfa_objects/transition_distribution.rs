use indexmap::IndexMap;

/// One possible step out of a state: emitting `symbol` and moving to `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub(crate) symbol: String,
    pub(crate) target: String,
    pub(crate) probability: f64,
}

impl TransitionOutcome {
    pub fn get_symbol(&self) -> &str {
        &self.symbol
    }

    pub fn get_target(&self) -> &str {
        &self.target
    }

    pub fn get_probability(&self) -> f64 {
        self.probability
    }
}

/**
 * The distribution over the outcomes of a state, including the final transition (which loops on
 * the state itself). Outcomes appear in the order of the edges of the document, followed by
 * smoothed symbols, followed by the final transition.
 */
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitionDistribution {
    pub(crate) outcomes: Vec<TransitionOutcome>,
}

impl TransitionDistribution {
    pub fn get_outcomes(&self) -> &Vec<TransitionOutcome> {
        &self.outcomes
    }

    pub fn get_outcome(&self, symbol: &str) -> Option<&TransitionOutcome> {
        self.outcomes.iter().find(|outcome| outcome.symbol == symbol)
    }

    pub fn get_probability(&self, symbol: &str) -> f64 {
        self.get_outcome(symbol)
            .map(|outcome| outcome.probability)
            .unwrap_or(0.0)
    }

    pub fn get_total_probability(&self) -> f64 {
        self.outcomes.iter().map(|outcome| outcome.probability).sum()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// The symbol-to-probability view in which a distribution is written to a document.
    pub fn to_mapping(&self) -> IndexMap<String, f64> {
        self.outcomes
            .iter()
            .map(|outcome| (outcome.symbol.clone(), outcome.probability))
            .collect()
    }
}

impl<'a> IntoIterator for &'a TransitionDistribution {
    type Item = &'a TransitionOutcome;

    type IntoIter = std::slice::Iter<'a, TransitionOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
