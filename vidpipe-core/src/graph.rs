// ============================================================================
// vidpipe-core/src/graph.rs
// ============================================================================
//
// FILTER GRAPH: Structured ffmpeg -filter_complex Construction
//
// Modules describe their video processing as a FilterGraph: an ordered list
// of chains, each reading one or more pads, applying a sequence of filters
// and writing labelled output pads. The graph is kept structured until it is
// handed to ffmpeg, where `Display` renders the familiar textual form:
//
//   [1:v]scale=iw*0.2:-1[watermark];[0:v][watermark]overlay=...[out]
//
// KEY COMPONENTS:
// - Pad: a stream specifier (`0:v`) or an internal label
// - Filter: a filter name with optional arguments
// - FilterGraph: chain list with unique label allocation
// - TimeWindow: start/end gating rendered as an `enable` expression

use std::collections::HashSet;
use std::fmt;

/// Label of the graph's single video output.
pub const OUTPUT_LABEL: &str = "out";

/// Formats a number the way filter arguments expect it: no trailing `.0`.
pub fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// An input or output pad of a filter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pad {
    /// Input stream specifier such as `0:v` or `1:v`.
    Stream(String),
    /// Pad produced by an earlier chain.
    Label(String),
}

impl Pad {
    /// Video stream of the given input index.
    pub fn video(input: usize) -> Self {
        Pad::Stream(format!("{input}:v"))
    }

    /// A specific stream of an input, by absolute stream index.
    pub fn stream(input: usize, index: usize) -> Self {
        Pad::Stream(format!("{input}:{index}"))
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pad::Stream(spec) => write!(f, "[{spec}]"),
            Pad::Label(label) => write!(f, "[{label}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    name: String,
    args: Option<String>,
}

impl Filter {
    pub fn new(name: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Some(args.into()),
        }
    }

    /// A filter without arguments, e.g. `null`.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.args {
            Some(args) => write!(f, "{}={}", self.name, args),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Chain {
    inputs: Vec<Pad>,
    filters: Vec<Filter>,
    outputs: Vec<String>,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pad in &self.inputs {
            write!(f, "{pad}")?;
        }
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{filter}")?;
        }
        for label in &self.outputs {
            write!(f, "[{label}]")?;
        }
        Ok(())
    }
}

/// An ordered filter graph terminating in the [`OUTPUT_LABEL`] pad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGraph {
    chains: Vec<Chain>,
    labels: HashSet<String>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph made of a single chain from `[0:v]` to `[out]`.
    pub fn single(filters: Vec<Filter>) -> Self {
        let mut graph = Self::new();
        graph.finish(vec![Pad::video(0)], filters);
        graph
    }

    /// Reserves a label unique within this graph, suffixing on collision.
    fn allocate(&mut self, base: &str) -> String {
        let mut label = base.to_string();
        let mut n = 1;
        while self.labels.contains(&label) || label == OUTPUT_LABEL {
            label = format!("{base}_{n}");
            n += 1;
        }
        self.labels.insert(label.clone());
        label
    }

    /// Appends a chain and returns the pad it produces, labelled `label`
    /// (or a suffixed variant if `label` is already taken).
    pub fn chain(&mut self, inputs: Vec<Pad>, filters: Vec<Filter>, label: &str) -> Pad {
        let output = self.allocate(label);
        self.chains.push(Chain {
            inputs,
            filters,
            outputs: vec![output.clone()],
        });
        Pad::Label(output)
    }

    /// Appends a chain fanning out to several labelled pads (e.g. `split`).
    pub fn fork(&mut self, inputs: Vec<Pad>, filters: Vec<Filter>, labels: &[&str]) -> Vec<Pad> {
        let outputs: Vec<String> = labels.iter().map(|l| self.allocate(l)).collect();
        let pads = outputs.iter().cloned().map(Pad::Label).collect();
        self.chains.push(Chain {
            inputs,
            filters,
            outputs,
        });
        pads
    }

    /// Appends the terminal chain writing `[out]`.
    pub fn finish(&mut self, inputs: Vec<Pad>, filters: Vec<Filter>) {
        self.chains.push(Chain {
            inputs,
            filters,
            outputs: vec![OUTPUT_LABEL.to_string()],
        });
    }

    /// True once exactly one chain writes the output pad.
    pub fn is_terminated(&self) -> bool {
        self.chains
            .iter()
            .flat_map(|c| c.outputs.iter())
            .filter(|o| o.as_str() == OUTPUT_LABEL)
            .count()
            == 1
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{chain}")?;
        }
        Ok(())
    }
}

/// Interval during which a filter is active, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeWindow {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TimeWindow {
    /// Builds a window from a start and either an explicit end or a
    /// duration. A duration takes precedence over an explicit end.
    pub fn new(start: Option<f64>, end: Option<f64>, duration: Option<f64>) -> Self {
        let end = match duration {
            Some(d) => Some(start.unwrap_or(0.0) + d),
            None => end,
        };
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// `gte(t,S)*lte(t,E)`, omitting a missing bound. `None` when unbounded.
    pub fn predicate(&self) -> Option<String> {
        let terms: Vec<String> = [
            self.start.map(|s| format!("gte(t,{})", fmt_num(s))),
            self.end.map(|e| format!("lte(t,{})", fmt_num(e))),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!terms.is_empty()).then(|| terms.join("*"))
    }

    /// `:enable='...'` suffix for a filter argument list, or empty.
    pub fn enable_suffix(&self) -> String {
        self.predicate()
            .map(|p| format!(":enable='{p}'"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_chains_in_order() {
        let mut graph = FilterGraph::new();
        let wm = graph.chain(
            vec![Pad::video(1)],
            vec![
                Filter::new("scale", "iw*0.2:-1"),
                Filter::new("format", "rgba"),
            ],
            "watermark",
        );
        graph.finish(
            vec![Pad::video(0), wm],
            vec![Filter::new("overlay", "main_w-overlay_w:main_h-overlay_h")],
        );

        assert_eq!(
            graph.to_string(),
            "[1:v]scale=iw*0.2:-1,format=rgba[watermark];[0:v][watermark]overlay=main_w-overlay_w:main_h-overlay_h[out]"
        );
        assert!(graph.is_terminated());
    }

    #[test]
    fn duplicate_labels_get_suffixes() {
        let mut graph = FilterGraph::new();
        let a = graph.chain(vec![Pad::video(1)], vec![Filter::bare("null")], "ckout");
        let b = graph.chain(vec![a], vec![Filter::bare("null")], "ckout");
        assert_eq!(b, Pad::Label("ckout_1".to_string()));

        let out = graph.chain(vec![Pad::video(0)], vec![Filter::bare("null")], OUTPUT_LABEL);
        assert_eq!(out, Pad::Label("out_1".to_string()));
        assert!(!graph.is_terminated());
    }

    #[test]
    fn rendering_is_stable() {
        let build = || FilterGraph::single(vec![Filter::new("crop", "640:360:0:0")]);
        assert_eq!(build().to_string(), build().to_string());
        assert_eq!(build().to_string(), "[0:v]crop=640:360:0:0[out]");
    }

    #[test]
    fn time_window_predicates() {
        assert_eq!(
            TimeWindow::new(Some(2.0), Some(7.5), None).enable_suffix(),
            ":enable='gte(t,2)*lte(t,7.5)'"
        );
        assert_eq!(
            TimeWindow::new(Some(3.0), Some(100.0), Some(4.0)).predicate().as_deref(),
            Some("gte(t,3)*lte(t,7)")
        );
        assert_eq!(
            TimeWindow::new(None, Some(5.0), None).predicate().as_deref(),
            Some("lte(t,5)")
        );
        assert_eq!(TimeWindow::default().enable_suffix(), "");
    }

    #[test]
    fn numbers_drop_trailing_zero_fraction() {
        assert_eq!(fmt_num(5.0), "5");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(-2.0), "-2");
    }
}
