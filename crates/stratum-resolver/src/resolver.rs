//! The resolver entry point: scan, build, cycle, sort, classify.

use std::collections::{BTreeMap, BTreeSet};

use stratum_graph::{
    ComponentDescriptor, ComponentId, ComponentRegistry, CycleError, DependencyGraph,
    EdgeRejection, GraphBuilder, LoadPlan, Suppression, apply_forced_overrides,
    find_cycles, sequence,
};
use stratum_layers::{LayerAssignments, LayerClassifier, ViolationReport, ViolationReporter};
use tracing::{info, warn};

use crate::LOG_TARGET;
use crate::cache::ScanCache;
use crate::error::{EmitError, ResolveError, ScanError};
use crate::events::{DiagnosticEvent, EventSink, RunStatus};
use crate::policy::ResolverPolicy;
use crate::scan::{CacheStats, scan_sources};
use crate::source::ComponentSource;
use crate::timing::{Stage, StageTimings};

/// Runs the resolution pipeline for one set of components.
///
/// The resolver performs no I/O of its own; diagnostics are returned in the
/// [`Resolution`] and written only through an [`EventSink`].
#[derive(Debug)]
pub struct Resolver<'p, 'c> {
    policy: &'p ResolverPolicy,
    cache: Option<&'c mut ScanCache>,
}

impl<'p, 'c> Resolver<'p, 'c> {
    /// Creates a resolver without a scan cache.
    #[must_use]
    pub const fn new(policy: &'p ResolverPolicy) -> Self {
        Self {
            policy,
            cache: None,
        }
    }

    /// Memoises scan results in `cache`; `None` disables the cache.
    #[must_use]
    pub fn with_cache(mut self, cache: impl Into<Option<&'c mut ScanCache>>) -> Self {
        self.cache = cache.into();
        self
    }

    /// Resolves `sources` into a load plan and diagnostics.
    ///
    /// Per-component and per-edge problems are collected in the report and
    /// never abort the run; only a cycle that survives every forced override
    /// leaves the run without a plan.
    #[must_use]
    pub fn resolve(self, sources: impl IntoIterator<Item = ComponentSource>) -> Resolution {
        let policy = self.policy;
        let mut timings = StageTimings::default();
        let (unique, duplicates) = deduplicate(sources);

        let scanned = timings.record(Stage::Scan, || {
            scan_sources(&unique, policy.markers(), policy.package_roots(), self.cache)
        });

        let outcome = timings.record(Stage::Build, || {
            let descriptors = unique
                .iter()
                .map(|source| describe(source, policy, &scanned.dependencies));
            let (registry, _) = ComponentRegistry::from_descriptors(descriptors);
            GraphBuilder::new(&registry)
                .with_forced_orders(policy.forced_orders().iter().cloned())
                .build()
        });

        let (resolved, cycle_error) = timings.record(Stage::Cycle, || {
            let resolved = apply_forced_overrides(&outcome.graph);
            let cycles = find_cycles(resolved.graph());
            for cycle in &cycles {
                warn!(target: LOG_TARGET, path = %cycle, "unresolvable dependency cycle");
            }
            let error = (!cycles.is_empty()).then(|| CycleError::new(cycles));
            (resolved, error)
        });
        let suppressions = resolved.suppressions().to_vec();
        let graph = resolved.into_graph();

        let plan =
            cycle_error.map_or_else(|| timings.record(Stage::Sort, || sequence(&graph)), Err);

        let (assignments, violations) = timings.record(Stage::Classify, || {
            let assignments =
                LayerClassifier::new(policy.layers(), policy.prefixes()).classify_all(&graph);
            let violations =
                ViolationReporter::new(policy.thresholds()).report(&graph, &assignments);
            (assignments, violations)
        });

        let resolution = Resolution {
            plan,
            graph,
            report: ResolutionReport {
                scan_errors: scanned.errors,
                duplicates,
                rejected: outcome.rejected,
                suppressions,
                assignments,
                violations,
                timings,
                cache_stats: scanned.stats,
            },
        };
        resolution.log_summary();
        resolution
    }
}

fn deduplicate(
    sources: impl IntoIterator<Item = ComponentSource>,
) -> (Vec<ComponentSource>, Vec<ComponentId>) {
    let mut seen = BTreeSet::new();
    let mut unique = Vec::new();
    let mut duplicates = Vec::new();
    for source in sources {
        if seen.insert(source.id().clone()) {
            unique.push(source);
        } else {
            warn!(target: LOG_TARGET, component = %source.id(), "duplicate component id ignored");
            duplicates.push(source.id().clone());
        }
    }
    duplicates.sort();
    (unique, duplicates)
}

fn describe(
    source: &ComponentSource,
    policy: &ResolverPolicy,
    scanned: &BTreeMap<ComponentId, BTreeSet<ComponentId>>,
) -> ComponentDescriptor {
    let id = source.id();
    let statics = scanned.get(id).into_iter().flatten().cloned();
    let manual = source
        .manual_dependencies()
        .iter()
        .chain(policy.manual_dependencies(id.as_str()))
        .cloned();
    let descriptor = ComponentDescriptor::new(id.clone())
        .with_static_dependencies(statics)
        .with_manual_dependencies(manual);
    let Some(layer) = source
        .declared_layer()
        .or_else(|| policy.declared_layer(id.as_str()))
    else {
        return descriptor;
    };
    descriptor.with_declared_layer(layer)
}

/// Everything a run found besides the plan itself.
#[derive(Debug, Clone)]
pub struct ResolutionReport {
    scan_errors: Vec<ScanError>,
    duplicates: Vec<ComponentId>,
    rejected: Vec<EdgeRejection>,
    suppressions: Vec<Suppression>,
    assignments: LayerAssignments,
    violations: ViolationReport,
    timings: StageTimings,
    cache_stats: CacheStats,
}

impl ResolutionReport {
    /// Returns components whose source could not be analysed.
    #[must_use]
    pub fn scan_errors(&self) -> &[ScanError] {
        &self.scan_errors
    }

    /// Returns repeated component ids; the first registration was kept.
    #[must_use]
    pub fn duplicates(&self) -> &[ComponentId] {
        &self.duplicates
    }

    /// Returns dropped dangling and self edges.
    #[must_use]
    pub fn rejected(&self) -> &[EdgeRejection] {
        &self.rejected
    }

    /// Returns edges removed by forced overrides.
    #[must_use]
    pub fn suppressions(&self) -> &[Suppression] {
        &self.suppressions
    }

    /// Returns components whose declared layer is not in the layer table.
    pub fn unknown_layers(&self) -> impl Iterator<Item = (&ComponentId, &str)> {
        self.assignments.unknown_declared()
    }

    /// Returns the layer of every component.
    #[must_use]
    pub const fn assignments(&self) -> &LayerAssignments {
        &self.assignments
    }

    /// Returns the layering violations.
    #[must_use]
    pub const fn violations(&self) -> &ViolationReport {
        &self.violations
    }

    /// Returns the timings of the stages that ran.
    #[must_use]
    pub const fn timings(&self) -> &StageTimings {
        &self.timings
    }

    /// Returns scan cache hits and misses.
    #[must_use]
    pub const fn cache_stats(&self) -> CacheStats {
        self.cache_stats
    }

    fn component_events(&self) -> Vec<DiagnosticEvent> {
        let mut events: Vec<DiagnosticEvent> = self
            .assignments
            .iter()
            .map(|(id, classification)| DiagnosticEvent::Node {
                id: id.clone(),
                layer: classification.layer().map(|layer| layer.name().to_owned()),
                layer_source: classification.source(),
            })
            .collect();
        events.extend(self.scan_errors.iter().map(|error| DiagnosticEvent::ScanError {
            id: error.id().clone(),
            message: error.message().to_owned(),
            line: error.line(),
            column: error.column(),
        }));
        events.extend(
            self.duplicates
                .iter()
                .map(|id| DiagnosticEvent::DuplicateComponent { id: id.clone() }),
        );
        events.extend(
            self.unknown_layers()
                .map(|(id, layer)| DiagnosticEvent::UnknownLayer {
                    id: id.clone(),
                    layer: layer.to_owned(),
                }),
        );
        events
    }

    fn violation_events(&self) -> Vec<DiagnosticEvent> {
        let mut events: Vec<DiagnosticEvent> = self
            .violations
            .iter()
            .map(|record| DiagnosticEvent::Violation {
                from: record.edge().from().clone(),
                to: record.edge().to().clone(),
                from_layer: record.source_layer().name().to_owned(),
                to_layer: record.target_layer().name().to_owned(),
                severity: record.severity(),
            })
            .collect();
        events.extend(self.violations.patterns().into_iter().map(|pattern| {
            DiagnosticEvent::ViolationPattern {
                from_layer: pattern.from_layer,
                to_layer: pattern.to_layer,
                count: pattern.count,
                severity: pattern.severity,
            }
        }));
        events
    }
}

/// Outcome of one resolution run.
#[derive(Debug, Clone)]
pub struct Resolution {
    plan: Result<LoadPlan, CycleError>,
    graph: DependencyGraph,
    report: ResolutionReport,
}

impl Resolution {
    /// Returns the load plan, or the cycle that prevented one.
    ///
    /// # Errors
    ///
    /// Returns the [`CycleError`] when no acyclic order exists.
    pub fn plan(&self) -> Result<&LoadPlan, &CycleError> {
        self.plan.as_ref()
    }

    /// Consumes the resolution and returns the plan.
    ///
    /// # Errors
    ///
    /// Returns the [`CycleError`] when no acyclic order exists.
    pub fn into_plan(self) -> Result<LoadPlan, CycleError> {
        self.plan
    }

    /// Returns whether a plan was produced.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.plan.is_ok()
    }

    /// Returns the effective graph, after forced overrides.
    #[must_use]
    pub const fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Returns the diagnostics of the run.
    #[must_use]
    pub const fn report(&self) -> &ResolutionReport {
        &self.report
    }

    /// Returns the diagnostic stream of the run, in its fixed order.
    ///
    /// Nodes come first, then per-component and per-edge diagnostics, the
    /// effective edges, the plan or its cycles, violations, timings and a
    /// closing outcome.
    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        let mut events = self.report.component_events();
        events.extend(self.edge_events());
        events.extend(self.plan_events());
        events.extend(self.report.violation_events());
        events.extend(self.report.timings.iter().map(|timing| DiagnosticEvent::Timing {
            stage: timing.stage(),
            millis: timing.millis(),
        }));
        events.push(DiagnosticEvent::Outcome {
            status: self.status(),
            components: self.graph.node_count(),
            edges: self.graph.edge_count(),
            violations: self.report.violations.len(),
        });
        events
    }

    /// Returns the final status of the run.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        if self.plan.is_ok() {
            RunStatus::Ok
        } else {
            RunStatus::Cycle
        }
    }

    fn edge_events(&self) -> Vec<DiagnosticEvent> {
        let report = &self.report;
        let mut events: Vec<DiagnosticEvent> =
            report.rejected.iter().map(rejection_event).collect();
        events.extend(self.graph.edges().map(|edge| DiagnosticEvent::Edge {
            from: edge.from().clone(),
            to: edge.to().clone(),
            origin: edge.origin(),
        }));
        events.extend(report.suppressions.iter().map(|suppression| {
            DiagnosticEvent::SuppressedEdge {
                from: suppression.edge().from().clone(),
                to: suppression.edge().to().clone(),
                origin: suppression.edge().origin(),
                forced_from: suppression.forced_by().from().clone(),
                forced_to: suppression.forced_by().to().clone(),
            }
        }));
        events
    }

    fn plan_events(&self) -> Vec<DiagnosticEvent> {
        match &self.plan {
            Ok(plan) => vec![DiagnosticEvent::LoadOrder {
                sequence: plan.clone(),
            }],
            Err(error) => error
                .cycles()
                .iter()
                .map(|path| DiagnosticEvent::Cycle { path: path.clone() })
                .collect(),
        }
    }

    /// Writes the diagnostic stream to `sink` and finishes it.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmitError`] raised by the sink.
    pub fn emit<S: EventSink + ?Sized>(&self, sink: &mut S) -> Result<(), EmitError> {
        for event in self.events() {
            sink.emit(&event)?;
        }
        sink.finish()
    }

    fn log_summary(&self) {
        let report = &self.report;
        info!(
            target: LOG_TARGET,
            status = ?self.status(),
            components = self.graph.node_count(),
            edges = self.graph.edge_count(),
            violations = report.violations.len(),
            scan_errors = report.scan_errors.len(),
            rejected = report.rejected.len(),
            cache_hits = report.cache_stats.hits,
            cache_misses = report.cache_stats.misses,
            millis = u64::try_from(report.timings.total().as_millis()).unwrap_or(u64::MAX),
            "resolution finished"
        );
    }
}

fn rejection_event(rejection: &EdgeRejection) -> DiagnosticEvent {
    match rejection {
        EdgeRejection::Dangling { edge, missing } => DiagnosticEvent::DanglingEdge {
            from: edge.from().clone(),
            to: edge.to().clone(),
            origin: edge.origin(),
            missing: missing.clone(),
        },
        EdgeRejection::SelfReferential { edge } => DiagnosticEvent::SelfEdge {
            id: edge.from().clone(),
            origin: edge.origin(),
        },
    }
}

/// Resolves `sources`, writes the diagnostic stream, then returns the plan.
///
/// Events are emitted whether or not a plan exists.
///
/// # Errors
///
/// Returns [`ResolveError::Emit`] when the sink fails, otherwise
/// [`ResolveError::Cycle`] when no acyclic order exists.
pub fn resolve_and_emit<S: EventSink + ?Sized>(
    policy: &ResolverPolicy,
    cache: Option<&mut ScanCache>,
    sources: impl IntoIterator<Item = ComponentSource>,
    sink: &mut S,
) -> Result<LoadPlan, ResolveError> {
    let resolution = Resolver::new(policy).with_cache(cache).resolve(sources);
    resolution.emit(sink)?;
    Ok(resolution.into_plan()?)
}
