//! Human-readable run report. Free-form text, not a machine contract.

use std::fmt::Write;

use crate::coordinator::RunResults;

/// Render the final listing: one line per resource (sorted by identifier),
/// followed by the total and, if the deadline cut the run short, a note.
pub fn format_report(results: &RunResults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n ******** RESULT **********");

    let mut entries: Vec<_> = results.outcomes.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let width = entries.iter().map(|(id, _)| id.len()).max().unwrap_or(0);
    for (id, outcome) in entries {
        let _ = writeln!(out, "{:<width$}  -  {}", id, outcome, width = width);
    }

    let _ = writeln!(
        out,
        "\ntotal: {} bytes from {} page(s), {} failed",
        results.total,
        results.outcomes.len() - results.failed_count(),
        results.failed_count()
    );
    if results.timed_out {
        let _ = writeln!(
            out,
            "deadline reached after {:.1}s: {} of {} target(s) recorded",
            results.elapsed.as_secs_f64(),
            results.outcomes.len(),
            results.targets
        );
    }
    out
}
