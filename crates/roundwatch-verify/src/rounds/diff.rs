//! Human-readable differences between two versions of a round

use roundwatch_core::ConsensusRound;
use std::fmt::Write;

/// Describe how `actual` differs from `expected`, or `None` if they are equal.
///
/// Event counts are compared first; when they match, mismatching events are
/// listed one by one, followed by any round metadata differences.
pub fn diff_rounds(expected: &ConsensusRound, actual: &ConsensusRound) -> Option<String> {
    if expected == actual {
        return None;
    }

    let mut out = String::new();
    if expected.event_count() != actual.event_count() {
        let _ = writeln!(
            out,
            "  event count differs\n    expected: {}\n    actual:   {}",
            expected.event_count(),
            actual.event_count()
        );
    }

    let shared = expected.event_count().min(actual.event_count());
    for (index, (left, right)) in expected.events[..shared]
        .iter()
        .zip(&actual.events[..shared])
        .enumerate()
    {
        if left != right {
            let _ = writeln!(
                out,
                "  event #{index} differs\n    expected: {left}\n    actual:   {right}"
            );
        }
    }
    for (index, extra) in expected.events.iter().enumerate().skip(shared) {
        let _ = writeln!(out, "  event #{index} missing\n    expected: {extra}");
    }
    for (index, extra) in actual.events.iter().enumerate().skip(shared) {
        let _ = writeln!(out, "  event #{index} unexpected\n    actual:   {extra}");
    }

    if expected.round_num != actual.round_num {
        let _ = writeln!(
            out,
            "  round number differs\n    expected: {}\n    actual:   {}",
            expected.round_num, actual.round_num
        );
    }
    if expected.ancient_threshold != actual.ancient_threshold {
        let _ = writeln!(
            out,
            "  ancient threshold differs\n    expected: {}\n    actual:   {}",
            expected.ancient_threshold, actual.ancient_threshold
        );
    }

    Some(out.trim_end().to_string())
}
