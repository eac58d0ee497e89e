//! # Repack decision
//!
//! The gate between conversion and repackaging. Repacking and swapping the
//! archive is the only destructive step in the pipeline, so it runs only
//! when the batch converted cleanly *and* the size win clears the margin.
//!
//! A reduction under the configured margin (5% by default) is not worth the
//! risk of touching the original; that verdict is durable — the caller
//! records it in the outcome store so future runs skip the archive outright.

use crate::scheduler::ConversionReport;
use std::path::PathBuf;

/// Verdict for one archive after conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepackOutcome {
    /// Converted output is worth packing and swapping in
    Proceed,
    /// At least one image failed to convert; never repack partial results
    AbortPartialFailure { failed: usize },
    /// Conversion produced no output files at all
    AbortNoOutputs,
    /// Converted total did not clear the reduction margin
    AbortSizeNotReduced { original: u64, converted: u64 },
}

impl RepackOutcome {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Size-gated repack-or-discard decision
pub struct RepackDecision {
    ratio: f64,
}

impl RepackDecision {
    /// `ratio` is the keep threshold: proceed only if
    /// `converted < original * ratio`.
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    pub fn decide(
        &self,
        report: &ConversionReport,
        outputs: &[PathBuf],
        original_total: u64,
        converted_total: u64,
    ) -> RepackOutcome {
        if !report.all_converted() {
            return RepackOutcome::AbortPartialFailure {
                failed: report.failed.len(),
            };
        }

        if report.converted == 0 || outputs.is_empty() {
            return RepackOutcome::AbortNoOutputs;
        }

        if converted_total as f64 >= original_total as f64 * self.ratio {
            return RepackOutcome::AbortSizeNotReduced {
                original: original_total,
                converted: converted_total,
            };
        }

        RepackOutcome::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_report(converted: usize) -> ConversionReport {
        ConversionReport {
            failed: Vec::new(),
            converted,
        }
    }

    fn outputs(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("{i}.webp"))).collect()
    }

    #[test]
    fn test_proceeds_on_clear_reduction() {
        let decision = RepackDecision::new(0.95);
        let outcome = decision.decide(&clean_report(3), &outputs(3), 1000, 400);
        assert_eq!(outcome, RepackOutcome::Proceed);
    }

    #[test]
    fn test_partial_failure_is_a_strict_gate() {
        let decision = RepackDecision::new(0.95);
        let report = ConversionReport {
            failed: vec![PathBuf::from("bad.jpg")],
            converted: 2,
        };
        // even a huge size win cannot override a failed image
        let outcome = decision.decide(&report, &outputs(2), 1000, 10);
        assert_eq!(outcome, RepackOutcome::AbortPartialFailure { failed: 1 });
    }

    #[test]
    fn test_no_outputs_aborts() {
        let decision = RepackDecision::new(0.95);
        assert_eq!(
            decision.decide(&clean_report(0), &outputs(0), 1000, 0),
            RepackOutcome::AbortNoOutputs
        );
        // converted count positive but nothing on disk is equally suspect
        assert_eq!(
            decision.decide(&clean_report(3), &outputs(0), 1000, 0),
            RepackOutcome::AbortNoOutputs
        );
    }

    #[test]
    fn test_size_gate_boundary() {
        let decision = RepackDecision::new(0.95);

        // exactly at the threshold: not reduced enough
        assert_eq!(
            decision.decide(&clean_report(1), &outputs(1), 1000, 950),
            RepackOutcome::AbortSizeNotReduced {
                original: 1000,
                converted: 950
            }
        );

        // just under: proceed
        assert_eq!(
            decision.decide(&clean_report(1), &outputs(1), 1000, 949),
            RepackOutcome::Proceed
        );

        // converted larger than original
        assert!(!decision
            .decide(&clean_report(1), &outputs(1), 1000, 1200)
            .is_proceed());
    }
}
