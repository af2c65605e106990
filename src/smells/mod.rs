//! The six smell detectors and the runner that drives them.
//!
//! Detectors are stateless: each reads the shared [`SymbolIndex`] and
//! the thresholds, and returns its findings with severity already
//! assigned. The runner executes enabled detectors in parallel but
//! always concatenates results in declared order, so reports are
//! deterministic regardless of scheduling.

pub mod duplication;
pub mod feature_envy;
pub mod god_class;
pub mod large_parameter_list;
pub mod long_method;
pub mod magic_numbers;

use crate::config::SmellConfig;
use crate::core::{DetectorWarning, Finding, SmellType};
use crate::index::SymbolIndex;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub use duplication::DuplicatedCodeDetector;
pub use feature_envy::FeatureEnvyDetector;
pub use god_class::GodClassDetector;
pub use large_parameter_list::LargeParameterListDetector;
pub use long_method::LongMethodDetector;
pub use magic_numbers::MagicNumbersDetector;

use crate::config::Thresholds;

pub trait SmellDetector: Sync {
    fn smell_type(&self) -> SmellType;

    fn detect(&self, index: &SymbolIndex<'_>, thresholds: &Thresholds) -> Vec<Finding>;
}

/// All detectors in the fixed declared order.
pub fn all_detectors() -> Vec<Box<dyn SmellDetector>> {
    vec![
        Box::new(LongMethodDetector),
        Box::new(GodClassDetector),
        Box::new(DuplicatedCodeDetector),
        Box::new(LargeParameterListDetector),
        Box::new(MagicNumbersDetector),
        Box::new(FeatureEnvyDetector),
    ]
}

/// Run every enabled detector and concatenate findings in declared
/// order. A panicking detector contributes no findings and is recorded
/// as a warning instead of aborting the run.
pub fn run_detectors(
    index: &SymbolIndex<'_>,
    config: &SmellConfig,
) -> (Vec<Finding>, Vec<DetectorWarning>) {
    let detectors: Vec<Box<dyn SmellDetector>> = all_detectors()
        .into_iter()
        .filter(|detector| config.enabled_smells.is_enabled(detector.smell_type()))
        .collect();

    // par_iter + collect preserves input order, which is declared order.
    let outcomes: Vec<_> = detectors
        .par_iter()
        .map(|detector| run_single(detector.as_ref(), index, &config.thresholds))
        .collect();

    let mut findings = Vec::new();
    let mut warnings = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(detected) => findings.extend(detected),
            Err(warning) => warnings.push(warning),
        }
    }
    (findings, warnings)
}

/// One isolated detector invocation. Panics become warnings here; they
/// never cross the detector boundary.
fn run_single(
    detector: &dyn SmellDetector,
    index: &SymbolIndex<'_>,
    thresholds: &Thresholds,
) -> std::result::Result<Vec<Finding>, DetectorWarning> {
    let smell_type = detector.smell_type();
    catch_unwind(AssertUnwindSafe(|| detector.detect(index, thresholds))).map_err(|payload| {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "detector failed with a non-string panic payload".to_string()
        };
        log::warn!("{smell_type} detector failed: {message}");
        DetectorWarning {
            smell_type,
            message,
        }
    })
}
