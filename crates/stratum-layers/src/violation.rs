//! Detection and grouping of layering violations.

use std::collections::BTreeMap;

use serde::Serialize;
use stratum_graph::{ComponentId, DependencyEdge, DependencyGraph};
use tracing::{debug, warn};

use crate::LOG_TARGET;
use crate::classifier::LayerAssignments;
use crate::layer::Layer;
use crate::severity::{Severity, SeverityThresholds};

/// An edge that points from a lower tier up to a higher one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationRecord {
    edge: DependencyEdge,
    source_layer: Layer,
    target_layer: Layer,
    severity: Severity,
    distance: u32,
}

impl ViolationRecord {
    /// Returns the offending edge.
    #[must_use]
    pub const fn edge(&self) -> &DependencyEdge {
        &self.edge
    }

    /// Returns the layer of the dependent component.
    #[must_use]
    pub const fn source_layer(&self) -> &Layer {
        &self.source_layer
    }

    /// Returns the layer of the dependency.
    #[must_use]
    pub const fn target_layer(&self) -> &Layer {
        &self.target_layer
    }

    /// Returns the severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the number of tiers crossed.
    #[must_use]
    pub const fn distance(&self) -> u32 {
        self.distance
    }
}

/// Aggregate of all violations sharing a `(from_layer, to_layer)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternSummary {
    /// Layer of the dependent side.
    pub from_layer: String,
    /// Layer of the dependency side.
    pub to_layer: String,
    /// Number of edges with this pattern.
    pub count: usize,
    /// Highest severity among those edges.
    pub severity: Severity,
}

/// All violations found in one graph, sorted by edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationReport {
    records: Vec<ViolationRecord>,
}

impl ViolationReport {
    /// Returns every record.
    #[must_use]
    pub fn records(&self) -> &[ViolationRecord] {
        &self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether no violation was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records.
    pub fn iter(&self) -> impl Iterator<Item = &ViolationRecord> {
        self.records.iter()
    }

    /// Groups records by the dependent component.
    #[must_use]
    pub fn by_source(&self) -> BTreeMap<&ComponentId, Vec<&ViolationRecord>> {
        let mut groups: BTreeMap<&ComponentId, Vec<&ViolationRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.edge.from()).or_default().push(record);
        }
        groups
    }

    /// Groups records by `(from_layer, to_layer)`.
    #[must_use]
    pub fn by_pattern(&self) -> BTreeMap<(&str, &str), Vec<&ViolationRecord>> {
        let mut groups: BTreeMap<(&str, &str), Vec<&ViolationRecord>> = BTreeMap::new();
        for record in &self.records {
            let key = (record.source_layer.name(), record.target_layer.name());
            groups.entry(key).or_default().push(record);
        }
        groups
    }

    /// Summarises each pattern with its count and highest severity.
    #[must_use]
    pub fn patterns(&self) -> Vec<PatternSummary> {
        self.by_pattern()
            .into_iter()
            .map(|((from_layer, to_layer), records)| PatternSummary {
                from_layer: from_layer.to_owned(),
                to_layer: to_layer.to_owned(),
                count: records.len(),
                severity: records
                    .iter()
                    .map(|record| record.severity)
                    .max()
                    .unwrap_or(Severity::Low),
            })
            .collect()
    }

    /// Counts records of the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.records
            .iter()
            .filter(|record| record.severity == severity)
            .count()
    }

    /// Returns the worst severity present, if any.
    #[must_use]
    pub fn highest_severity(&self) -> Option<Severity> {
        self.records.iter().map(|record| record.severity).max()
    }
}

impl<'a> IntoIterator for &'a ViolationReport {
    type Item = &'a ViolationRecord;
    type IntoIter = std::slice::Iter<'a, ViolationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Checks every edge against the layer order.
///
/// An edge is allowed when `rank(from) >= rank(to)`. Edges touching an
/// unclassified component are skipped. Reporting never alters the graph or
/// the load plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViolationReporter {
    thresholds: SeverityThresholds,
}

impl ViolationReporter {
    /// Creates a reporter with the given thresholds.
    #[must_use]
    pub const fn new(thresholds: SeverityThresholds) -> Self {
        Self { thresholds }
    }

    /// Returns the thresholds in use.
    #[must_use]
    pub const fn thresholds(&self) -> SeverityThresholds {
        self.thresholds
    }

    /// Walks every edge of `graph` and records the violating ones.
    ///
    /// A dependency pair carried by several origins yields a single record,
    /// kept for its first edge in `(from, to, origin)` order.
    #[must_use]
    pub fn report(&self, graph: &DependencyGraph, assignments: &LayerAssignments) -> ViolationReport {
        let mut records: Vec<ViolationRecord> = graph
            .edges()
            .filter_map(|edge| self.check(edge, assignments))
            .collect();
        records.sort_by(|left, right| left.edge.cmp(&right.edge));
        // One record per dependency pair, whichever origins it carries.
        records.dedup_by(|later, earlier| {
            later.edge.from() == earlier.edge.from() && later.edge.to() == earlier.edge.to()
        });

        for record in &records {
            warn!(
                target: LOG_TARGET,
                from = %record.edge.from(),
                to = %record.edge.to(),
                from_layer = record.source_layer.name(),
                to_layer = record.target_layer.name(),
                severity = %record.severity,
                "layering violation"
            );
        }
        debug!(target: LOG_TARGET, violations = records.len(), "violation check finished");
        ViolationReport { records }
    }

    fn check(&self, edge: &DependencyEdge, assignments: &LayerAssignments) -> Option<ViolationRecord> {
        let source = assignments.layer_of(edge.from().as_str())?;
        let target = assignments.layer_of(edge.to().as_str())?;
        if source.rank() >= target.rank() {
            return None;
        }
        let distance = source.distance(target);
        Some(ViolationRecord {
            edge: edge.clone(),
            source_layer: source.clone(),
            target_layer: target.clone(),
            severity: self.thresholds.classify(distance),
            distance,
        })
    }
}
