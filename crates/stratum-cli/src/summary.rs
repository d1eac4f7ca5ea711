//! Human-readable run summary for `stratum check`.

use std::io::{self, Write};

use stratum_resolver::{Resolution, Severity};

const SEVERITIES: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

/// Writes the plan or its cycles, followed by diagnostic counts.
pub(crate) fn write_summary<W: Write>(resolution: &Resolution, out: &mut W) -> io::Result<()> {
    match resolution.plan() {
        Ok(plan) => {
            let order: Vec<&str> = plan.iter().map(|id| id.as_str()).collect();
            writeln!(out, "load order: {}", order.join(", "))?;
        }
        Err(error) => {
            for cycle in error.cycles() {
                writeln!(out, "cycle: {cycle}")?;
            }
        }
    }

    let report = resolution.report();
    let graph = resolution.graph();
    writeln!(
        out,
        "components: {}, edges: {}",
        graph.node_count(),
        graph.edge_count()
    )?;
    let violations = report.violations();
    let breakdown: Vec<String> = SEVERITIES
        .iter()
        .map(|severity| format!("{severity} {}", violations.count(*severity)))
        .collect();
    writeln!(
        out,
        "violations: {} ({})",
        violations.len(),
        breakdown.join(", ")
    )?;
    for pattern in violations.patterns() {
        writeln!(
            out,
            "  {} -> {}: {} ({})",
            pattern.from_layer, pattern.to_layer, pattern.count, pattern.severity
        )?;
    }
    writeln!(out, "scan errors: {}", report.scan_errors().len())?;
    for error in report.scan_errors() {
        writeln!(out, "  {error}")?;
    }
    out.flush()
}
