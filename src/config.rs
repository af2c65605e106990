//! Analysis configuration: per-smell enablement plus numeric
//! thresholds, loadable from TOML and validated before any detector
//! runs.

use crate::core::{Error, Result, SmellType};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmellConfig {
    #[serde(rename = "smells", default)]
    pub enabled_smells: EnabledSmells,
    #[serde(default)]
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnabledSmells {
    #[serde(rename = "LongMethod", default = "default_true")]
    pub long_method: bool,
    #[serde(rename = "GodClass", default = "default_true")]
    pub god_class: bool,
    #[serde(rename = "DuplicatedCode", default = "default_true")]
    pub duplicated_code: bool,
    #[serde(rename = "LargeParameterList", default = "default_true")]
    pub large_parameter_list: bool,
    #[serde(rename = "MagicNumbers", default = "default_true")]
    pub magic_numbers: bool,
    #[serde(rename = "FeatureEnvy", default = "default_true")]
    pub feature_envy: bool,
}

impl Default for EnabledSmells {
    fn default() -> Self {
        Self {
            long_method: true,
            god_class: true,
            duplicated_code: true,
            large_parameter_list: true,
            magic_numbers: true,
            feature_envy: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Long method: source lines of code.
    #[serde(default = "default_long_method_sloc")]
    pub long_method_sloc: usize,
    /// Long method: cyclomatic complexity.
    #[serde(default = "default_long_method_cyclomatic")]
    pub long_method_cyclomatic: usize,
    /// God class: method count.
    #[serde(default = "default_god_class_methods")]
    pub god_class_methods: usize,
    /// God class: field count.
    #[serde(default = "default_god_class_fields")]
    pub god_class_fields: usize,
    /// Large parameter list: parameter count.
    #[serde(default = "default_large_parameter_list")]
    pub large_parameter_list: usize,
    /// Magic numbers: minimum occurrences of one value.
    #[serde(default = "default_magic_number_occurrences")]
    pub magic_number_occurrences: usize,
    /// Duplicated code: Jaccard similarity in [0, 1].
    #[serde(default = "default_duplication_similarity")]
    pub duplication_similarity: f64,
    /// Feature envy: minimum method size to consider.
    #[serde(default = "default_envy_min_sloc")]
    pub envy_min_sloc: usize,
    /// Feature envy: minimum foreign accesses.
    #[serde(default = "default_envy_min_foreign_accesses")]
    pub envy_min_foreign_accesses: usize,
    /// Feature envy: minimum foreign-to-self ratio, strictly positive.
    #[serde(default = "default_envy_min_ratio")]
    pub envy_min_ratio: f64,
}

fn default_true() -> bool {
    true
}

fn default_long_method_sloc() -> usize {
    30
}

fn default_long_method_cyclomatic() -> usize {
    12
}

fn default_god_class_methods() -> usize {
    20
}

fn default_god_class_fields() -> usize {
    15
}

fn default_large_parameter_list() -> usize {
    6
}

fn default_magic_number_occurrences() -> usize {
    3
}

fn default_duplication_similarity() -> f64 {
    0.85
}

fn default_envy_min_sloc() -> usize {
    10
}

fn default_envy_min_foreign_accesses() -> usize {
    3
}

fn default_envy_min_ratio() -> f64 {
    1.5
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            long_method_sloc: default_long_method_sloc(),
            long_method_cyclomatic: default_long_method_cyclomatic(),
            god_class_methods: default_god_class_methods(),
            god_class_fields: default_god_class_fields(),
            large_parameter_list: default_large_parameter_list(),
            magic_number_occurrences: default_magic_number_occurrences(),
            duplication_similarity: default_duplication_similarity(),
            envy_min_sloc: default_envy_min_sloc(),
            envy_min_foreign_accesses: default_envy_min_foreign_accesses(),
            envy_min_ratio: default_envy_min_ratio(),
        }
    }
}

impl EnabledSmells {
    pub fn is_enabled(&self, smell: SmellType) -> bool {
        match smell {
            SmellType::LongMethod => self.long_method,
            SmellType::GodClass => self.god_class,
            SmellType::DuplicatedCode => self.duplicated_code,
            SmellType::LargeParameterList => self.large_parameter_list,
            SmellType::MagicNumbers => self.magic_numbers,
            SmellType::FeatureEnvy => self.feature_envy,
        }
    }

    fn set(&mut self, smell: SmellType, value: bool) {
        match smell {
            SmellType::LongMethod => self.long_method = value,
            SmellType::GodClass => self.god_class = value,
            SmellType::DuplicatedCode => self.duplicated_code = value,
            SmellType::LargeParameterList => self.large_parameter_list = value,
            SmellType::MagicNumbers => self.magic_numbers = value,
            SmellType::FeatureEnvy => self.feature_envy = value,
        }
    }
}

impl SmellConfig {
    /// Load from a TOML file. A missing file is an error; callers that
    /// want defaults pass no path at all.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SmellConfig = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range thresholds outright rather than clamping;
    /// silently adjusted limits would make reports lie about what was
    /// checked.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        let positive: [(&str, usize); 8] = [
            ("long_method_sloc", t.long_method_sloc),
            ("long_method_cyclomatic", t.long_method_cyclomatic),
            ("god_class_methods", t.god_class_methods),
            ("god_class_fields", t.god_class_fields),
            ("large_parameter_list", t.large_parameter_list),
            ("magic_number_occurrences", t.magic_number_occurrences),
            ("envy_min_sloc", t.envy_min_sloc),
            ("envy_min_foreign_accesses", t.envy_min_foreign_accesses),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(Error::configuration(format!(
                    "threshold '{name}' must be a positive integer, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&t.duplication_similarity) {
            return Err(Error::configuration(format!(
                "threshold 'duplication_similarity' must be within [0.0, 1.0], got {}",
                t.duplication_similarity
            )));
        }
        if !(t.envy_min_ratio > 0.0) || !t.envy_min_ratio.is_finite() {
            return Err(Error::configuration(format!(
                "threshold 'envy_min_ratio' must be a positive number, got {}",
                t.envy_min_ratio
            )));
        }
        Ok(())
    }

    /// Restrict the run to exactly these smells.
    pub fn retain_only(&mut self, smells: &[SmellType]) {
        for smell in SmellType::ALL {
            self.enabled_smells.set(smell, smells.contains(&smell));
        }
    }

    /// Disable these smells on top of the current enablement.
    pub fn exclude(&mut self, smells: &[SmellType]) {
        for &smell in smells {
            self.enabled_smells.set(smell, false);
        }
    }

    /// Enabled smells in declared detector order.
    pub fn active(&self) -> Vec<SmellType> {
        SmellType::ALL
            .into_iter()
            .filter(|&smell| self.enabled_smells.is_enabled(smell))
            .collect()
    }
}
