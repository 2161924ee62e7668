use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use itertools::Itertools;
use layout::{
    core::{base::Orientation, color::Color, style::StyleAttr},
    std_shapes::{
        render::get_shape_size,
        shapes::{Arrow, Element, ShapeKind},
    },
    topo::layout::VisualGraph,
};
use std::{collections::HashMap, fmt, io::BufRead, str::FromStr};

use crate::{
    pdfa_framework::{
        exportable::Exportable,
        importable::Importable,
        importer_parameters::ImporterParameterValues,
        infoable::Infoable,
        pdfa_error::{PdfaError, ValidationIssue},
        pdfa_input,
        validate::Validate,
    },
    pdfa_objects::{
        raw_automaton_descriptor::{EdgeRecord, RawAutomatonDescriptor, RawNodeRecord},
        transition_distribution::TransitionDistribution,
    },
    pdfa_traits::graphable::Graphable,
    techniques::derivation,
};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub(crate) final_probability: f64,
    pub(crate) trans_distribution: TransitionDistribution,
    pub(crate) is_accepting: bool,
}

impl NodeRecord {
    pub fn get_final_probability(&self) -> f64 {
        self.final_probability
    }

    pub fn get_transition_distribution(&self) -> &TransitionDistribution {
        &self.trans_distribution
    }

    pub fn is_accepting(&self) -> bool {
        self.is_accepting
    }
}

/**
 * A validated PDFA descriptor. Every node carries its acceptance and its transition distribution.
 * Instances can only be obtained by loading, and are immutable.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonDescriptor {
    pub(crate) beta: f64,
    pub(crate) alphabet_size: usize,
    pub(crate) num_states: usize,
    pub(crate) final_transition_sym: String,
    pub(crate) empty_transition_sym: String,
    pub(crate) start_state: String,
    pub(crate) smooth_transitions: bool,
    pub(crate) nodes: IndexMap<String, NodeRecord>,
    pub(crate) edges: IndexMap<String, IndexMap<String, EdgeRecord>>, //source -> target -> edge
}

impl AutomatonDescriptor {
    /**
     * Validates the raw descriptor and derives the fields the document left open. Fails with the
     * first issue that validation reports.
     */
    pub fn from_raw(
        raw: RawAutomatonDescriptor,
        parameters: &ImporterParameterValues,
    ) -> Result<Self, PdfaError> {
        if let Some(issue) = raw.validate(parameters).into_iter().next() {
            return Err(issue);
        }

        let alphabet = raw.get_alphabet();
        let mut nodes = IndexMap::new();
        for (state, node) in &raw.nodes {
            let is_accepting = node
                .is_accepting
                .unwrap_or_else(|| derivation::is_accepting(node.final_probability, raw.beta));
            let trans_distribution = match &node.trans_distribution {
                Some(distribution) => {
                    derivation::supplied_transition_distribution(&raw, state, distribution)
                }
                None => derivation::derive_transition_distribution(
                    &raw,
                    state,
                    node.final_probability,
                    &alphabet,
                    parameters,
                ),
            };
            log::debug!("state {} accepting: {}", state, is_accepting);

            nodes.insert(
                state.clone(),
                NodeRecord {
                    final_probability: node.final_probability,
                    trans_distribution,
                    is_accepting,
                },
            );
        }

        Ok(Self {
            beta: raw.beta,
            alphabet_size: count(raw.alphabet_size, "alphabet_size")?,
            num_states: count(raw.num_states, "num_states")?,
            final_transition_sym: raw.final_transition_sym,
            empty_transition_sym: raw.empty_transition_sym,
            start_state: raw.start_state,
            smooth_transitions: raw.smooth_transitions,
            nodes,
            edges: raw.edges,
        })
    }

    /// Re-runs every check on this descriptor.
    pub fn validate(&self, parameters: &ImporterParameterValues) -> Vec<ValidationIssue> {
        RawAutomatonDescriptor::from(self).validate(parameters)
    }

    pub fn get_beta(&self) -> f64 {
        self.beta
    }

    pub fn get_alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    pub fn get_number_of_states(&self) -> usize {
        self.num_states
    }

    pub fn get_final_transition_symbol(&self) -> &str {
        &self.final_transition_sym
    }

    pub fn get_empty_transition_symbol(&self) -> &str {
        &self.empty_transition_sym
    }

    pub fn get_start_state(&self) -> &str {
        &self.start_state
    }

    pub fn has_smooth_transitions(&self) -> bool {
        self.smooth_transitions
    }

    pub fn get_nodes(&self) -> &IndexMap<String, NodeRecord> {
        &self.nodes
    }

    pub fn get_node(&self, state: &str) -> Option<&NodeRecord> {
        self.nodes.get(state)
    }

    pub fn get_edges(&self) -> &IndexMap<String, IndexMap<String, EdgeRecord>> {
        &self.edges
    }

    /// The edges leaving `state`, keyed by their target.
    pub fn get_outgoing_edges(&self, state: &str) -> impl Iterator<Item = (&String, &EdgeRecord)> {
        self.edges.get(state).into_iter().flat_map(|targets| targets.iter())
    }

    /// The state reached from `state` on `symbol`, if the automaton has such a transition.
    pub fn get_transition(&self, state: &str, symbol: &str) -> Option<&str> {
        self.get_outgoing_edges(state)
            .find(|(_, edge)| edge.symbols.iter().any(|s| s == symbol))
            .map(|(target, _)| target.as_str())
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.edges
            .values()
            .flat_map(|targets| targets.values())
            .map(|edge| edge.symbols.len())
            .sum()
    }

    /// The symbols used on edges, in order of first appearance, without the reserved symbols.
    pub fn get_alphabet(&self) -> Vec<String> {
        RawAutomatonDescriptor::from(self).get_alphabet()
    }

    pub fn get_accepting_states(&self) -> impl Iterator<Item = &String> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.is_accepting)
            .map(|(state, _)| state)
    }
}

fn count(value: i64, field: &str) -> Result<usize, PdfaError> {
    usize::try_from(value).map_err(|_| PdfaError::Range {
        field: field.to_string(),
        state: None,
        expected: "a positive integer".to_string(),
        actual: value.to_string(),
    })
}

impl From<&AutomatonDescriptor> for RawAutomatonDescriptor {
    fn from(value: &AutomatonDescriptor) -> Self {
        Self {
            beta: value.beta,
            alphabet_size: value.alphabet_size as i64,
            num_states: value.num_states as i64,
            final_transition_sym: value.final_transition_sym.clone(),
            empty_transition_sym: value.empty_transition_sym.clone(),
            start_state: value.start_state.clone(),
            smooth_transitions: value.smooth_transitions,
            nodes: value
                .nodes
                .iter()
                .map(|(state, node)| {
                    (
                        state.clone(),
                        RawNodeRecord {
                            final_probability: node.final_probability,
                            trans_distribution: Some(node.trans_distribution.to_mapping()),
                            is_accepting: Some(node.is_accepting),
                        },
                    )
                })
                .collect(),
            edges: value.edges.clone(),
        }
    }
}

impl Importable for AutomatonDescriptor {
    fn import(
        reader: &mut dyn BufRead,
        parameters: &ImporterParameterValues,
    ) -> Result<Self, PdfaError> {
        let raw = RawAutomatonDescriptor::parse(reader)?;
        let result = Self::from_raw(raw, parameters)?;
        log::info!(
            "loaded PDFA descriptor with {} states and {} transitions",
            result.num_states,
            result.get_number_of_transitions()
        );
        Ok(result)
    }
}

impl Validate for AutomatonDescriptor {
    fn validate_document(
        reader: &mut dyn BufRead,
        parameters: &ImporterParameterValues,
    ) -> Vec<ValidationIssue> {
        match RawAutomatonDescriptor::parse(reader) {
            Ok(raw) => raw.validate(parameters),
            Err(issue) => vec![issue],
        }
    }
}

impl FromStr for AutomatonDescriptor {
    type Err = PdfaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut reader = pdfa_input::get_reader_str(s);
        Self::load(&mut reader)
    }
}

impl Exportable for AutomatonDescriptor {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        log::info!("export PDFA descriptor as YAML");
        serde_yaml::to_writer(f, &RawAutomatonDescriptor::from(self))
            .context("writing PDFA descriptor")
    }

    fn export_json(&self, f: &mut dyn std::io::Write) -> Result<()> {
        log::info!("export PDFA descriptor as JSON");
        serde_json::to_writer_pretty(f, &RawAutomatonDescriptor::from(self))
            .context("writing PDFA descriptor")
    }
}

impl fmt::Display for AutomatonDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yaml =
            serde_yaml::to_string(&RawAutomatonDescriptor::from(self)).map_err(|_| fmt::Error)?;
        write!(f, "{}", yaml)
    }
}

impl Infoable for AutomatonDescriptor {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        writeln!(f, "Number of states\t{}", self.num_states)?;
        writeln!(f, "Number of transitions\t{}", self.get_number_of_transitions())?;
        writeln!(f, "Alphabet size\t{}", self.alphabet_size)?;
        writeln!(f, "Used symbols\t{}", self.get_alphabet().iter().join(", "))?;
        writeln!(f, "Start state\t{}", self.start_state)?;
        writeln!(f, "Acceptance threshold\t{}", self.beta)?;
        writeln!(
            f,
            "Accepting states\t{}",
            self.get_accepting_states().join(", ")
        )?;
        writeln!(f, "Smoothed transitions\t{}", self.smooth_transitions)?;

        Ok(write!(f, "")?)
    }
}

/// The start state is coloured as such, even when it is accepting.
fn node_color(is_start: bool, is_accepting: bool) -> &'static str {
    if is_start {
        "royalblue"
    } else if is_accepting {
        "tomato"
    } else {
        "lightgray"
    }
}

impl Graphable for AutomatonDescriptor {
    fn to_dot(&self) -> Result<VisualGraph> {
        log::info!("to_dot for AutomatonDescriptor");
        let mut graph = VisualGraph::new(Orientation::LeftToRight);

        let mut places = HashMap::new();
        for (state, node) in &self.nodes {
            let label = format!(
                "{}: {}",
                state,
                <dyn Graphable>::probability_to_string(node.final_probability)
            );
            let is_start = *state == self.start_state;
            let shape = if is_start {
                ShapeKind::new_box(&label)
            } else if node.is_accepting {
                ShapeKind::new_double_circle(&label)
            } else {
                ShapeKind::new_circle(&label)
            };
            let mut look = StyleAttr::simple();
            look.fill_color = Color::from_name(node_color(is_start, node.is_accepting));
            let orientation = Orientation::LeftToRight;
            let size = get_shape_size(orientation, &shape, look.font_size, false);
            let place = graph.add_node(Element::create(shape, look, orientation, size));
            places.insert(state.as_str(), place);
        }

        for (source, targets) in &self.edges {
            let source_place = places
                .get(source.as_str())
                .ok_or_else(|| anyhow!("state {} has no node", source))?;
            for (target, edge) in targets {
                let target_place = places
                    .get(target.as_str())
                    .ok_or_else(|| anyhow!("state {} has no node", target))?;
                for (symbol, probability) in edge.iter() {
                    let arrow = Arrow::simple(&format!(
                        "{}: {}",
                        symbol,
                        <dyn Graphable>::probability_to_string(*probability)
                    ));
                    graph.add_edge(arrow, *source_place, *target_place);
                }
            }
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ntest::assert_about_eq;

    use crate::pdfa_framework::{
        exportable::Exportable,
        importable::Importable,
        importer_parameters::ImporterParameterValues,
        infoable::Infoable,
        pdfa_error::{ErrorKind, PdfaError, StateReference},
        validate::Validate,
    };

    use super::{AutomatonDescriptor, node_color};

    fn example() -> AutomatonDescriptor {
        let fin = fs::read_to_string("testfiles/valid-example.pdfa").unwrap();
        fin.parse::<AutomatonDescriptor>().unwrap()
    }

    fn load_error(path: &str) -> PdfaError {
        let fin = fs::read_to_string(path).unwrap();
        fin.parse::<AutomatonDescriptor>().unwrap_err()
    }

    #[test]
    fn pdfa_example() {
        crate::tests::init_logging();
        let pdfa = example();

        assert_eq!(pdfa.get_start_state(), "q1");
        assert_eq!(pdfa.get_number_of_states(), 3);
        assert_eq!(pdfa.get_alphabet_size(), 3);
        assert_about_eq!(pdfa.get_beta(), 0.9);
        assert_eq!(pdfa.get_final_transition_symbol(), "$");
        assert_eq!(pdfa.get_empty_transition_symbol(), "lambda");
        assert!(!pdfa.has_smooth_transitions());

        //q2 has no outgoing edges, yet validates as it always terminates
        assert_eq!(pdfa.get_outgoing_edges("q2").count(), 0);
        assert!(pdfa.get_node("q2").unwrap().is_accepting());
        assert!(!pdfa.get_node("q1").unwrap().is_accepting());
        assert_eq!(pdfa.get_accepting_states().collect::<Vec<_>>(), vec!["q2"]);

        assert_eq!(pdfa.get_transition("q1", "0"), Some("q0"));
        assert_eq!(pdfa.get_transition("q1", "2"), Some("q2"));
        assert_eq!(pdfa.get_transition("q2", "0"), None);
        assert_eq!(pdfa.get_number_of_transitions(), 5);
    }

    #[test]
    fn pdfa_derived_fields() {
        let pdfa = example();
        for (state, node) in pdfa.get_nodes() {
            assert_eq!(
                node.is_accepting(),
                node.get_final_probability() >= pdfa.get_beta()
            );

            let outgoing: f64 = pdfa
                .get_outgoing_edges(state)
                .map(|(_, edge)| edge.get_total_probability())
                .sum();
            assert_about_eq!(outgoing + node.get_final_probability(), 1.0);
            assert_about_eq!(node.get_transition_distribution().get_total_probability(), 1.0);
        }

        let distribution = pdfa.get_node("q1").unwrap().get_transition_distribution();
        assert_about_eq!(distribution.get_probability("0"), 0.75);
        assert_about_eq!(distribution.get_probability("$"), 0.0);
    }

    #[test]
    fn pdfa_duplicate_symbol() {
        let error = load_error("testfiles/invalid-determinism-duplicate-symbol.pdfa");
        assert_eq!(
            error,
            PdfaError::Determinism {
                state: "q1".to_string(),
                symbol: "0".to_string(),
                first_target: "q0".to_string(),
                second_target: "q2".to_string()
            }
        );
    }

    #[test]
    fn pdfa_not_normalized() {
        let error = load_error("testfiles/invalid-normalization-q0.pdfa");
        match error {
            PdfaError::Normalization { state, total, .. } => {
                assert_eq!(state, "q0");
                assert_about_eq!(total, 0.95);
            }
            other => panic!("unexpected {:?}", other),
        }

        //a looser tolerance accepts the same document
        let fin = fs::read_to_string("testfiles/invalid-normalization-q0.pdfa").unwrap();
        let parameters = ImporterParameterValues::new().with_normalization_tolerance(0.1);
        assert!(AutomatonDescriptor::import(&mut fin.as_bytes(), &parameters).is_ok());
    }

    #[test]
    fn pdfa_unknown_start_state() {
        let error = load_error("testfiles/invalid-reference-start-state.pdfa");
        assert_eq!(
            error,
            PdfaError::Reference {
                state: "q9".to_string(),
                referenced_by: StateReference::StartState
            }
        );
    }

    #[test]
    fn pdfa_invalid_parameters() {
        let fin = fs::read_to_string("testfiles/valid-example.pdfa").unwrap();
        let parameters = ImporterParameterValues::new().with_smoothing_amount(-1.0);
        let error = AutomatonDescriptor::import(&mut fin.as_bytes(), &parameters).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Range);
    }

    #[test]
    fn pdfa_deterministic() {
        assert_eq!(example(), example());
    }

    #[test]
    fn pdfa_revalidate() {
        let pdfa = example();
        assert!(pdfa.validate(&ImporterParameterValues::default()).is_empty());
    }

    #[test]
    fn pdfa_round_trip() {
        let pdfa = example();

        let mut f = vec![];
        pdfa.export(&mut f).unwrap();
        let yaml = String::from_utf8(f).unwrap();
        assert_eq!(yaml.parse::<AutomatonDescriptor>().unwrap(), pdfa);
        assert_eq!(pdfa.to_string(), yaml);

        let mut f = vec![];
        pdfa.export_json(&mut f).unwrap();
        let json = String::from_utf8(f).unwrap();
        assert_eq!(json.parse::<AutomatonDescriptor>().unwrap(), pdfa);
    }

    #[test]
    fn pdfa_smoothed() {
        let fin = fs::read_to_string("testfiles/valid-smoothed.pdfa").unwrap();
        let pdfa = fin.parse::<AutomatonDescriptor>().unwrap();

        let distribution = pdfa.get_node("1").unwrap().get_transition_distribution();
        assert!(distribution.get_probability("0") > 0.0);
        assert_about_eq!(distribution.get_probability("-1"), 0.25);
        assert_about_eq!(distribution.get_total_probability(), 1.0);
        assert!(!pdfa.get_node("1").unwrap().is_accepting());
        assert!(!pdfa.get_node("0").unwrap().is_accepting());
    }

    #[test]
    fn pdfa_supplied_distribution_is_kept() {
        let fin = fs::read_to_string("testfiles/valid-example-json.pdfa").unwrap();
        let pdfa = fin.parse::<AutomatonDescriptor>().unwrap();

        let distribution = pdfa.get_node("q0").unwrap().get_transition_distribution();
        assert_eq!(distribution.len(), 3);
        assert_about_eq!(distribution.get_probability("0"), 0.5);
        assert_eq!(distribution.get_outcome("1").unwrap().get_target(), "q2");

        //the other nodes are derived
        let distribution = pdfa.get_node("q1").unwrap().get_transition_distribution();
        assert_eq!(distribution.len(), 4);
    }

    #[test]
    fn pdfa_validate_document() {
        let fin = fs::read_to_string("testfiles/invalid-range-probability.pdfa").unwrap();
        let issues = AutomatonDescriptor::validate_document(
            &mut fin.as_bytes(),
            &ImporterParameterValues::default(),
        );
        let kinds = issues.iter().map(|issue| issue.kind()).collect::<Vec<_>>();
        assert_eq!(kinds, vec![ErrorKind::Range, ErrorKind::Normalization]);

        let issues = AutomatonDescriptor::validate_document(
            &mut "beta: nope".as_bytes(),
            &ImporterParameterValues::default(),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind(), ErrorKind::Format);

        let fin = fs::read_to_string("testfiles/valid-example.pdfa").unwrap();
        assert!(AutomatonDescriptor::is_valid_document(
            &mut fin.as_bytes(),
            &ImporterParameterValues::default()
        ));
    }

    #[test]
    fn pdfa_info() {
        let mut f = vec![];
        example().info(&mut f).unwrap();
        let info = String::from_utf8(f).unwrap();
        assert!(info.contains("Number of states\t3\n"));
        assert!(info.contains("Used symbols\t0, 1, 2\n"));
        assert!(info.contains("Accepting states\tq2\n"));
    }

    #[test]
    fn pdfa_node_colors() {
        assert_eq!(node_color(true, true), "royalblue");
        assert_eq!(node_color(true, false), "royalblue");
        assert_eq!(node_color(false, true), "tomato");
        assert_eq!(node_color(false, false), "lightgray");

        let fin = fs::read_to_string("testfiles/valid-single-state.pdfa").unwrap();
        let pdfa = fin.parse::<AutomatonDescriptor>().unwrap();
        let node = pdfa.get_node("only").unwrap();
        assert!(node.is_accepting());
        assert_eq!(
            node_color(pdfa.get_start_state() == "only", node.is_accepting()),
            "royalblue"
        );
    }
}
