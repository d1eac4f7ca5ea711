//! Scan stage: sources to static dependencies.

use std::collections::{BTreeMap, BTreeSet};

use stratum_graph::ComponentId;
use stratum_syntax::{MarkerSet, ModuleReference, SourceScanner, SyntaxError};
use tracing::{debug, warn};

use crate::SCAN_LOG_TARGET;
use crate::cache::{ScanCache, content_digest};
use crate::error::ScanError;
use crate::source::ComponentSource;

/// Maps a reference onto a known component id.
///
/// Matching is anchored at the first segment: the longest leading run of
/// segments whose dotted join is in `known` wins, so `os.path` never
/// resolves to a component named `path`. A reference that starts with one
/// of `package_roots` (dotted, such as `addon` or `bl_ext.user.addon`) is
/// first matched with that root removed. References matching nothing, such
/// as host facilities, yield `None`.
#[must_use]
pub fn resolve_reference(
    reference: &ModuleReference,
    known: &BTreeSet<ComponentId>,
    package_roots: &[String],
) -> Option<ComponentId> {
    let segments = reference.segments();
    package_roots
        .iter()
        .filter_map(|root| strip_root(segments, root))
        .find_map(|rest| longest_leading_match(rest, known))
        .or_else(|| longest_leading_match(segments, known))
}

fn longest_leading_match(
    segments: &[String],
    known: &BTreeSet<ComponentId>,
) -> Option<ComponentId> {
    (1..=segments.len()).rev().find_map(|len| {
        let joined = segments.get(..len)?.join(".");
        known.get(joined.as_str()).cloned()
    })
}

fn strip_root<'a>(segments: &'a [String], root: &str) -> Option<&'a [String]> {
    let mut rest = segments;
    for part in root.split('.') {
        let (first, tail) = rest.split_first()?;
        if first != part {
            return None;
        }
        rest = tail;
    }
    Some(rest)
}

/// Cache effectiveness over one scan stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Sources whose references came from the cache.
    pub hits: usize,
    /// Sources that had to be parsed.
    pub misses: usize,
}

/// Result of scanning every component of a run.
#[derive(Debug, Default)]
pub(crate) struct ScanOutcome {
    pub(crate) dependencies: BTreeMap<ComponentId, BTreeSet<ComponentId>>,
    pub(crate) errors: Vec<ScanError>,
    pub(crate) stats: CacheStats,
}

/// Scans `sources`, which must have distinct ids, in ascending id order.
pub(crate) fn scan_sources(
    sources: &[ComponentSource],
    markers: &MarkerSet,
    package_roots: &[String],
    mut cache: Option<&mut ScanCache>,
) -> ScanOutcome {
    let known: BTreeSet<ComponentId> = sources.iter().map(|source| source.id().clone()).collect();
    let mut ordered: Vec<&ComponentSource> = sources.iter().collect();
    ordered.sort_by(|left, right| left.id().cmp(right.id()));
    let mut scanner = SourceScanner::new(markers.clone());
    let mut outcome = ScanOutcome::default();

    for source in ordered {
        let scanned = references_for(
            source,
            markers,
            &mut scanner,
            cache.as_deref_mut(),
            &mut outcome.stats,
        );
        let references = match scanned {
            Ok(references) => references,
            Err(error) => {
                warn!(
                    target: SCAN_LOG_TARGET,
                    component = %error.id(),
                    line = error.line(),
                    "{}",
                    error.message()
                );
                outcome.errors.push(error);
                continue;
            }
        };

        let dependencies: BTreeSet<ComponentId> = references
            .iter()
            .filter_map(|reference| resolve_reference(reference, &known, package_roots))
            .filter(|id| id != source.id())
            .collect();
        debug!(
            target: SCAN_LOG_TARGET,
            component = %source.id(),
            references = references.len(),
            dependencies = dependencies.len(),
            "component scanned"
        );
        outcome.dependencies.insert(source.id().clone(), dependencies);
    }

    if let Some(store) = cache {
        store.retain_ids(&known);
    }
    debug!(
        target: SCAN_LOG_TARGET,
        hits = outcome.stats.hits,
        misses = outcome.stats.misses,
        errors = outcome.errors.len(),
        "scan finished"
    );
    outcome
}

fn references_for(
    source: &ComponentSource,
    markers: &MarkerSet,
    scanner: &mut SourceScanner,
    cache: Option<&mut ScanCache>,
    stats: &mut CacheStats,
) -> Result<Vec<ModuleReference>, ScanError> {
    let Some(language) = source.language() else {
        let error = source.path().map_or_else(
            || ScanError::new(source.id().clone(), "source language is unknown"),
            |path| {
                ScanError::from_syntax(
                    source.id().clone(),
                    &SyntaxError::unknown_language(path.to_path_buf()),
                )
            },
        );
        return Err(error);
    };

    let digest = content_digest(language, markers, source.source_text());
    if let Some(cached) = cache
        .as_deref()
        .and_then(|store| store.lookup(source.id().as_str(), &digest))
    {
        stats.hits = stats.hits.saturating_add(1);
        return Ok(cached.to_vec());
    }

    stats.misses = stats.misses.saturating_add(1);
    match scanner.scan(language, source.source_text()) {
        Ok(references) => {
            if let Some(store) = cache {
                store.store(source.id().clone(), digest, references.clone());
            }
            Ok(references)
        }
        Err(error) => {
            if let Some(store) = cache {
                store.invalidate(source.id().as_str());
            }
            Err(ScanError::from_syntax(source.id().clone(), &error))
        }
    }
}
