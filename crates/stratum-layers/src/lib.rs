//! Architectural layering checks for Stratum.
//!
//! Layers form a total order held as data in a [`LayerTable`]. Components
//! are placed on a layer by the [`LayerClassifier`]: an explicit declaration
//! wins, then the longest matching id prefix from a [`PrefixTable`], and
//! anything left is unclassified. The [`ViolationReporter`] then flags every
//! edge whose dependent sits on a lower layer than its dependency.
//!
//! Violations are advisory and never block a load plan.
//!
//! ```
//! use stratum_graph::{ComponentDescriptor, ComponentRegistry, GraphBuilder};
//! use stratum_layers::{LayerClassifier, LayerTable, PrefixTable, Severity, ViolationReporter};
//!
//! let layers = LayerTable::from_ordered(["core", "infra", "ui"])?;
//! let prefixes = PrefixTable::new([("infra_", "infra"), ("ui_", "ui")], &layers)?;
//! let (registry, _) = ComponentRegistry::from_descriptors([
//!     ComponentDescriptor::new("infra_widget").with_static_dependencies(["ui_panel"]),
//!     ComponentDescriptor::new("ui_panel"),
//! ]);
//! let graph = GraphBuilder::new(&registry).build().graph;
//!
//! let assignments = LayerClassifier::new(&layers, &prefixes).classify_all(&graph);
//! let report = ViolationReporter::default().report(&graph, &assignments);
//! assert_eq!(report.len(), 1);
//! assert_eq!(report.highest_severity(), Some(Severity::Low));
//! # Ok::<(), stratum_layers::LayerError>(())
//! ```

mod classifier;
mod error;
mod layer;
mod prefix;
mod severity;
mod violation;

pub use classifier::{Classification, LayerAssignments, LayerClassifier, LayerSource};
pub use error::LayerError;
pub use layer::{Layer, LayerTable};
pub use prefix::PrefixTable;
pub use severity::{Severity, SeverityThresholds};
pub use violation::{PatternSummary, ViolationRecord, ViolationReport, ViolationReporter};

/// Tracing target for layer classification and violation reporting.
pub(crate) const LOG_TARGET: &str = "stratum::layers";
