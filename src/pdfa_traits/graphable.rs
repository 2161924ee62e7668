use anyhow::Result;
use layout::{backends::svg::SVGWriter, topo::layout::VisualGraph};

pub trait Graphable {
    fn to_dot(&self) -> Result<VisualGraph>;

    fn to_svg(&self) -> Result<String> {
        let mut svg = SVGWriter::new();
        let mut graph = self.to_dot()?;
        Ok(if graph.num_nodes() == 0 {
            String::new()
        } else {
            graph.do_it(false, false, false, &mut svg);
            svg.finalize()
        })
    }
}

impl dyn Graphable {
    /// Probabilities are shown with two decimals.
    pub fn probability_to_string(probability: f64) -> String {
        format!("{:.2}", probability)
    }
}
