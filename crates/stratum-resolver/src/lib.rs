//! Component load-order resolution for Stratum.
//!
//! The [`Resolver`] ties the pipeline together:
//!
//! 1. scan each [`ComponentSource`] for static references and map them onto
//!    known component ids, memoised by an optional [`ScanCache`]
//! 2. merge static, manual and forced dependencies into a graph
//! 3. apply forced overrides and detect any cycle that survives them
//! 4. sequence the graph into a deterministic [`LoadPlan`]
//! 5. classify components into layers and report violations
//!
//! Only an unresolvable cycle denies a plan; every other problem is recorded
//! in the [`ResolutionReport`] and surfaces as a [`DiagnosticEvent`].
//!
//! ```
//! use stratum_resolver::{ComponentSource, Resolver, ResolverPolicy};
//!
//! let policy = ResolverPolicy::default();
//! let resolution = Resolver::new(&policy).resolve([
//!     ComponentSource::new("app", "import store\n"),
//!     ComponentSource::new("store", "x = 1\n"),
//! ]);
//! let plan = resolution.plan().map_err(Clone::clone)?;
//! let order: Vec<&str> = plan.iter().map(|id| id.as_str()).collect();
//! assert_eq!(order, ["store", "app"]);
//! # Ok::<(), stratum_resolver::CycleError>(())
//! ```

mod cache;
mod error;
mod events;
mod policy;
mod resolver;
mod scan;
mod source;
mod timing;

pub use cache::{ScanCache, content_digest};
pub use error::{CacheError, EmitError, PolicyError, ResolveError, ScanError};
pub use events::{DiagnosticEvent, EventSink, JsonLinesSink, RunStatus};
pub use policy::ResolverPolicy;
pub use resolver::{Resolution, ResolutionReport, Resolver, resolve_and_emit};
pub use scan::{CacheStats, resolve_reference};
pub use source::ComponentSource;
pub use stratum_graph::{ComponentId, CycleError, LoadPlan};
pub use stratum_layers::{LayerSource, Severity};
pub use stratum_syntax::SupportedLanguage;
pub use timing::{Stage, StageTiming, StageTimings};

/// Tracing target for pipeline orchestration.
pub(crate) const LOG_TARGET: &str = "stratum::resolver";

/// Tracing target for source scanning and the scan cache.
pub(crate) const SCAN_LOG_TARGET: &str = "stratum::scan";

#[cfg(test)]
mod tests;
