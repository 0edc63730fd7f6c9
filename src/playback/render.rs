use std::collections::HashMap;
use std::io::Write;

use nu_ansi_term::{Color, Style};

use crate::step::{EdgeHighlight, Step};
use crate::types::{format_amount, EdgeId, NodeIndex, Result};

/// Consumes steps as the player pulls them.
pub trait StepRenderer {
    /// Draws one step.
    fn render(&mut self, step: &Step) -> Result<()>;

    /// Called once when playback stops, for whatever reason.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<R: StepRenderer + ?Sized> StepRenderer for &mut R {
    fn render(&mut self, step: &Step) -> Result<()> {
        (**self).render(step)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Collects every step; handy for tests and for embedding the stream.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    /// Steps in render order.
    pub steps: Vec<Step>,
}

impl StepRenderer for RecordingRenderer {
    fn render(&mut self, step: &Step) -> Result<()> {
        self.steps.push(step.clone());
        Ok(())
    }
}

/// Writes one JSON object per step, newline-delimited.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    /// Wraps a writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StepRenderer for JsonRenderer<W> {
    fn render(&mut self, step: &Step) -> Result<()> {
        serde_json::to_writer(&mut self.out, step)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

struct Palette {
    bfs: Style,
    bfs_reverse: Style,
    dfs: Style,
    node: Style,
    phase: Style,
    flow: Style,
    muted: Style,
}

impl Palette {
    fn colored() -> Self {
        let purple = Color::Rgb(0x9C, 0x6B, 0xFF);
        Self {
            bfs: Style::new().fg(Color::Cyan),
            bfs_reverse: Style::new().fg(Color::White),
            dfs: Style::new().fg(purple),
            node: Style::new().fg(purple).bold(),
            phase: Style::new().bold(),
            flow: Style::new().fg(Color::Magenta),
            muted: Style::new().dimmed(),
        }
    }

    fn plain() -> Self {
        Self {
            bfs: Style::new(),
            bfs_reverse: Style::new(),
            dfs: Style::new(),
            node: Style::new(),
            phase: Style::new(),
            flow: Style::new(),
            muted: Style::new(),
        }
    }
}

/// Human-readable, one line per step, optionally colored.
///
/// Colors follow the browser view: cyan for BFS edges, white for reverse
/// BFS edges, purple for DFS edges and highlighted nodes.
pub struct TextRenderer<W: Write> {
    out: W,
    palette: Palette,
    node_names: Vec<String>,
    edge_names: HashMap<EdgeId, String>,
}

impl<W: Write> TextRenderer<W> {
    /// Plain text renderer.
    pub fn new(out: W) -> Self {
        Self {
            out,
            palette: Palette::plain(),
            node_names: Vec::new(),
            edge_names: HashMap::new(),
        }
    }

    /// Enables or disables ANSI colors.
    pub fn colored(mut self, enabled: bool) -> Self {
        self.palette = if enabled {
            Palette::colored()
        } else {
            Palette::plain()
        };
        self
    }

    /// Names nodes (by index) and edges in the output instead of raw ids.
    pub fn with_names(
        mut self,
        node_names: Vec<String>,
        edge_names: HashMap<EdgeId, String>,
    ) -> Self {
        self.node_names = node_names;
        self.edge_names = edge_names;
        self
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn node(&self, id: NodeIndex) -> String {
        self.node_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn edge(&self, id: EdgeId) -> String {
        self.edge_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn line(&self, step: &Step) -> String {
        let p = &self.palette;
        match step {
            Step::Phase { .. } => p.phase.paint(step.to_string()).to_string(),
            Step::Levels { levels } => {
                let parts: Vec<String> = levels
                    .iter()
                    .enumerate()
                    .map(|(i, level)| match level {
                        Some(l) => format!("{}={l}", self.node(i)),
                        None => format!("{}=-", self.node(i)),
                    })
                    .collect();
                format!("levels: {}", parts.join(" "))
            }
            Step::HighlightNode { id, kind } => {
                format!("node {} {kind}", p.node.paint(self.node(*id)))
            }
            Step::HighlightEdge { edge, kind } => {
                let style = match kind {
                    EdgeHighlight::BfsForward => p.bfs,
                    EdgeHighlight::BfsReverse => p.bfs_reverse,
                    EdgeHighlight::Dfs => p.dfs,
                };
                format!("edge {} {kind}", style.paint(self.edge(*edge)))
            }
            Step::FlowUpdate {
                edge,
                delta,
                flow,
                capacity,
            } => {
                let sign = if *delta < 0.0 { "-" } else { "+" };
                format!(
                    "edge {} {} ({sign}{})",
                    self.edge(*edge),
                    p.flow.paint(format!(
                        "{} / {}",
                        format_amount(*flow),
                        format_amount(*capacity)
                    )),
                    format_amount(delta.abs())
                )
            }
            Step::Text { message } => message.clone(),
            Step::ClearHighlights => p.muted.paint(step.to_string()).to_string(),
        }
    }
}

impl<W: Write> StepRenderer for TextRenderer<W> {
    fn render(&mut self, step: &Step) -> Result<()> {
        let line = self.line(step);
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
