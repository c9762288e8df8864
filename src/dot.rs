//! Chain to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **States** are rendered as circles labeled with the `Debug` form of their value
//! - **Initial state** is pointed to by an edge from an invisible point node (source rank)
//! - **Transitions** are directed edges labeled with their probability; with
//!   label flags enabled, the probability is followed by one `t`/`f` flag per
//!   chain label, telling whether the target state carries that label
//!   (in the order of [`Lmc::label_names`])
//! - **Zero-probability** transitions are drawn dashed
//!
//! # Examples
//!
//! ```
//! use pmc_rs::lmc::Lmc;
//!
//! let lmc = Lmc::from_parts(vec!["heads", "tails"], 0, vec![vec![(0.5, 0), (0.5, 1)], vec![(1.0, 1)]])
//!     .unwrap()
//!     .with_label("done", |s| *s == "tails");
//!
//! let dot = lmc.to_dot().unwrap();
//! assert!(dot.contains("0 -> 1 [label=\"0.50 t\"];"));
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::fmt::Debug;

use crate::lmc::Lmc;

/// Configuration options for DOT output generation.
///
/// ```
/// use pmc_rs::dot::DotConfig;
///
/// let config = DotConfig {
///     rank_direction: "TB",
///     show_label_flags: false,
///     ..DotConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for state nodes (default: "circle")
    pub state_shape: &'static str,
    /// Layout direction (default: "LR")
    pub rank_direction: &'static str,
    /// Style for zero-probability edges (default: "dashed")
    pub zero_edge_style: &'static str,
    /// Whether to append the target's label flags to edge labels (default: true)
    pub show_label_flags: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "circle",
            rank_direction: "LR",
            zero_edge_style: "dashed",
            show_label_flags: true,
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<S: Debug> Lmc<S> {
    /// Converts the chain to DOT format with the default configuration.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the chain to DOT format with custom configuration.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "rankdir={};", config.rank_direction)?;
        writeln!(dot, "node [shape={}];", config.state_shape)?;

        writeln!(dot, "{{ rank=source")?;
        writeln!(dot, "init [shape=point];")?;
        writeln!(dot, "}}")?;
        writeln!(dot, "init -> {};", self.initial_index())?;

        for (index, state) in self.states().enumerate() {
            writeln!(dot, "{} [label=\"{}\"];", index, escape(&format!("{:?}", state)))?;
        }

        let labels: Vec<_> = self
            .label_names()
            .iter()
            .filter_map(|name| self.label(name).ok())
            .collect();

        for index in 0..self.num_states() {
            for t in self.transitions(index) {
                let mut label = t.probability.to_string();
                if config.show_label_flags && !labels.is_empty() {
                    label.push(' ');
                    for set in labels.iter() {
                        label.push(if set.contains(t.target) { 't' } else { 'f' });
                    }
                }
                if t.probability.value() > 0.0 {
                    writeln!(dot, "{} -> {} [label=\"{}\"];", index, t.target, label)?;
                } else {
                    writeln!(
                        dot,
                        "{} -> {} [label=\"{}\", style={}];",
                        index, t.target, label, config.zero_edge_style
                    )?;
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
