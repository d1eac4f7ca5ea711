//! The line-oriented diagnostic event stream.
//!
//! Each [`DiagnosticEvent`] serialises to one self-contained JSON object
//! tagged by `"event"`. External tooling parses these lines, so field names
//! and tags are part of the stable interface.

use std::io::Write;

use serde::{Deserialize, Serialize};
use stratum_graph::{ComponentId, CyclePath, EdgeOrigin, LoadPlan};
use stratum_layers::{LayerSource, Severity};

use crate::error::EmitError;
use crate::timing::Stage;

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// A load plan was produced.
    Ok,
    /// A cycle survived every forced override; no plan exists.
    Cycle,
}

/// One record of the diagnostic stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// A component and the layer it was placed on.
    Node {
        /// Component id.
        id: ComponentId,
        /// Layer name, or `null` when unclassified.
        layer: Option<String>,
        /// Where the layer came from.
        layer_source: LayerSource,
    },
    /// A component whose source could not be analysed.
    ScanError {
        /// Component id.
        id: ComponentId,
        /// Failure description.
        message: String,
        /// One-based line of the failure.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
        /// One-based column of the failure.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column: Option<u32>,
    },
    /// A repeated component id; the first registration was kept.
    DuplicateComponent {
        /// Component id.
        id: ComponentId,
    },
    /// A declared layer missing from the layer table.
    UnknownLayer {
        /// Component id.
        id: ComponentId,
        /// The declared name.
        layer: String,
    },
    /// An edge to or from an unknown component, dropped.
    DanglingEdge {
        /// Dependent side.
        from: ComponentId,
        /// Dependency side.
        to: ComponentId,
        /// Edge origin.
        origin: EdgeOrigin,
        /// The endpoint that is unknown.
        missing: ComponentId,
    },
    /// A component depending on itself, dropped.
    SelfEdge {
        /// Component id.
        id: ComponentId,
        /// Edge origin.
        origin: EdgeOrigin,
    },
    /// An edge of the effective graph: `from` initialises after `to`.
    Edge {
        /// Dependent side.
        from: ComponentId,
        /// Dependency side.
        to: ComponentId,
        /// Edge origin.
        origin: EdgeOrigin,
    },
    /// An edge removed because a forced order reverses it.
    SuppressedEdge {
        /// Dependent side of the removed edge.
        from: ComponentId,
        /// Dependency side of the removed edge.
        to: ComponentId,
        /// Origin of the removed edge.
        origin: EdgeOrigin,
        /// Dependent side of the forced edge.
        forced_from: ComponentId,
        /// Dependency side of the forced edge.
        forced_to: ComponentId,
    },
    /// A cycle that no forced order resolves.
    Cycle {
        /// Traversal-order path, closed on its first node.
        path: CyclePath,
    },
    /// The load plan.
    LoadOrder {
        /// Component ids in initialisation order.
        sequence: LoadPlan,
    },
    /// A layering violation.
    Violation {
        /// Dependent side.
        from: ComponentId,
        /// Dependency side.
        to: ComponentId,
        /// Layer of the dependent side.
        from_layer: String,
        /// Layer of the dependency side.
        to_layer: String,
        /// Severity of the crossing.
        severity: Severity,
    },
    /// Violations aggregated by layer pair.
    ViolationPattern {
        /// Layer of the dependent side.
        from_layer: String,
        /// Layer of the dependency side.
        to_layer: String,
        /// Number of violating edges.
        count: usize,
        /// Highest severity in the group.
        severity: Severity,
    },
    /// Elapsed time of one stage.
    Timing {
        /// The stage.
        stage: Stage,
        /// Whole milliseconds.
        millis: u64,
    },
    /// Summary closing the stream.
    Outcome {
        /// Whether a plan was produced.
        status: RunStatus,
        /// Number of components.
        components: usize,
        /// Number of edges in the effective graph.
        edges: usize,
        /// Number of violations.
        violations: usize,
    },
}

/// Destination for diagnostic events.
pub trait EventSink {
    /// Accepts one event.
    ///
    /// # Errors
    ///
    /// Returns an [`EmitError`] when the event cannot be delivered.
    fn emit(&mut self, event: &DiagnosticEvent) -> Result<(), EmitError>;

    /// Called once after the last event of a run.
    ///
    /// # Errors
    ///
    /// Returns an [`EmitError`] when buffered output cannot be flushed.
    fn finish(&mut self) -> Result<(), EmitError> {
        Ok(())
    }
}

impl EventSink for Vec<DiagnosticEvent> {
    fn emit(&mut self, event: &DiagnosticEvent) -> Result<(), EmitError> {
        self.push(event.clone());
        Ok(())
    }
}

/// Writes each event as one JSON line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink writing to `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &DiagnosticEvent) -> Result<(), EmitError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EmitError> {
        self.writer.flush()?;
        Ok(())
    }
}
