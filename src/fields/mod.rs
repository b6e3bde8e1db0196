//! User-facing field labels and their dataset columns.
//!
//! The table is data, not code: a list of `FieldSpec`s that can come from the
//! built-in defaults or from a JSON file. It is checked once at startup; a
//! broken table stops the program before any view is shown.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{FieldKey, ViewMode};
use crate::error::{AppError, ConfigError, EXIT_INPUT};

/// One selectable label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub label: String,
    pub key: FieldKey,
    /// Divisor for the raw stored value in single-series mode.
    pub scale: f64,
    /// Divisor for the raw stored value in comparison mode.
    ///
    /// Configured separately from `scale`: the two views do not have to agree.
    #[serde(default)]
    pub comparison_scale: Option<f64>,
    /// Views offering this label.
    #[serde(default = "all_views")]
    pub views: Vec<ViewMode>,
}

fn all_views() -> Vec<ViewMode> {
    vec![ViewMode::Single, ViewMode::Comparison]
}

impl FieldSpec {
    fn new(label: &str, key: FieldKey, scale: f64, comparison_scale: f64, views: &[ViewMode]) -> Self {
        Self {
            label: label.to_string(),
            key,
            scale,
            comparison_scale: Some(comparison_scale),
            views: views.to_vec(),
        }
    }

    /// Divisor applied to raw values in the given view.
    pub fn scale_for(&self, mode: ViewMode) -> f64 {
        match mode {
            ViewMode::Single => self.scale,
            ViewMode::Comparison => self.comparison_scale.unwrap_or(self.scale),
        }
    }

    pub fn offered_in(&self, mode: ViewMode) -> bool {
        self.views.contains(&mode)
    }
}

#[derive(Debug, Deserialize)]
struct FieldFile {
    fields: Vec<FieldSpec>,
}

/// Label -> field lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRegistry {
    specs: Vec<FieldSpec>,
}

impl FieldRegistry {
    /// Build and self-check a registry.
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        let registry = Self { specs };
        registry.self_check()?;
        Ok(registry)
    }

    /// Load a `{ "fields": [...] }` JSON table.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(EXIT_INPUT, format!("Failed to open field table '{}': {e}", path.display()))
        })?;
        let parsed: FieldFile = serde_json::from_reader(file).map_err(|e| {
            AppError::new(EXIT_INPUT, format!("Invalid field table '{}': {e}", path.display()))
        })?;
        Ok(Self::new(parsed.fields)?)
    }

    /// Exact-label lookup. Unknown labels yield `None`, never a fallback field.
    pub fn resolve(&self, label: &str) -> Option<&FieldSpec> {
        self.specs.iter().find(|spec| spec.label == label)
    }

    /// Command-line lookup: an exact label, or a key name, offered in `mode`.
    ///
    /// A key name picks the first label in `mode` that maps to that key.
    pub fn resolve_for(&self, mode: ViewMode, arg: &str) -> Option<&FieldSpec> {
        if let Some(spec) = self.resolve(arg).filter(|s| s.offered_in(mode)) {
            return Some(spec);
        }
        let key = FieldKey::from_column(arg)?;
        self.in_view(mode).find(|spec| spec.key == key)
    }

    pub fn in_view(&self, mode: ViewMode) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter().filter(move |spec| spec.offered_in(mode))
    }

    /// Labels offered in `mode`, in declared order.
    pub fn labels(&self, mode: ViewMode) -> Vec<&str> {
        self.in_view(mode).map(|spec| spec.label.as_str()).collect()
    }

    /// The `idx`-th label of `mode`, wrapping around.
    pub fn nth(&self, mode: ViewMode, idx: usize) -> Option<&FieldSpec> {
        let count = self.in_view(mode).count();
        if count == 0 {
            return None;
        }
        self.in_view(mode).nth(idx % count)
    }

    /// Startup check of the table's contract.
    ///
    /// Labels must be unique with usable scales, and each view must offer at
    /// least one label. Whether the labels resolve to data is checked against
    /// the loaded dataset by [`FieldRegistry::check_columns`].
    pub fn self_check(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for spec in &self.specs {
            if !seen.insert(spec.label.as_str()) {
                return Err(ConfigError::DuplicateLabel(spec.label.clone()));
            }
            check_scale(&spec.label, "single", spec.scale)?;
            if let Some(scale) = spec.comparison_scale {
                check_scale(&spec.label, "comparison", scale)?;
            }
        }

        for mode in [ViewMode::Single, ViewMode::Comparison] {
            let labels = self.labels(mode);
            if labels.is_empty() {
                return Err(ConfigError::EmptyView(mode.display_name()));
            }
        }

        debug!(labels = self.specs.len(), "field table checked");
        Ok(())
    }

    /// Every offered label must map to a column the dataset provides.
    pub fn check_columns(&self, has_column: impl Fn(FieldKey) -> bool) -> Result<(), ConfigError> {
        for mode in [ViewMode::Single, ViewMode::Comparison] {
            if let Some(spec) = self.in_view(mode).find(|spec| !has_column(spec.key)) {
                return Err(ConfigError::Unresolved(spec.label.clone()));
            }
        }
        Ok(())
    }
}

fn check_scale(label: &str, which: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidScale {
            label: label.to_string(),
            which,
            value,
        })
    }
}

impl Default for FieldRegistry {
    /// The reference deployment's table.
    ///
    /// Prices are stored in thousandths of a złoty; crude oil is shown as stored
    /// in the single view and divided by a further 100 in the comparison view.
    fn default() -> Self {
        use ViewMode::{Comparison, Single};
        Self {
            specs: vec![
                FieldSpec::new(
                    "Ekodiesel wholesale net price (PLN/litre)",
                    FieldKey::Diesel,
                    1000.0,
                    1000.0,
                    &[Single, Comparison],
                ),
                FieldSpec::new(
                    "Eurosuper 95 wholesale net price (PLN/litre)",
                    FieldKey::Super95,
                    1000.0,
                    1000.0,
                    &[Single, Comparison],
                ),
                FieldSpec::new("Crude oil price (USD per barrel)", FieldKey::CrudeOil, 1.0, 100.0, &[Single]),
                FieldSpec::new(
                    "Crude oil price (USDx100 per barrel)",
                    FieldKey::CrudeOil,
                    1.0,
                    100.0,
                    &[Comparison],
                ),
                FieldSpec::new("USD/PLN exchange rate", FieldKey::UsdPln, 1.0, 1.0, &[Single, Comparison]),
                FieldSpec::new(
                    "Predicted Ekodiesel wholesale net price (PLN/litre)",
                    FieldKey::DieselPrediction,
                    1000.0,
                    1000.0,
                    &[Comparison],
                ),
                FieldSpec::new(
                    "Predicted Eurosuper 95 wholesale net price (PLN/litre)",
                    FieldKey::Super95Prediction,
                    1000.0,
                    1000.0,
                    &[Comparison],
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_passes_self_check() {
        let registry = FieldRegistry::default();
        registry.self_check().unwrap();
        assert_eq!(registry.labels(ViewMode::Single).len(), 4);
        assert_eq!(registry.labels(ViewMode::Comparison).len(), 6);
    }

    #[test]
    fn unknown_label_is_none() {
        let registry = FieldRegistry::default();
        assert!(registry.resolve("Heating oil").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn both_oil_labels_share_one_column() {
        let registry = FieldRegistry::default();
        let usd = registry.resolve("Crude oil price (USD per barrel)").unwrap();
        let usd100 = registry.resolve("Crude oil price (USDx100 per barrel)").unwrap();
        assert_eq!(usd.key, usd100.key);
        assert_eq!(usd.scale_for(ViewMode::Single), 1.0);
        assert_eq!(usd100.scale_for(ViewMode::Comparison), 100.0);
    }

    #[test]
    fn resolve_for_accepts_key_names_within_view() {
        let registry = FieldRegistry::default();
        let oil = registry.resolve_for(ViewMode::Comparison, "crude_oil").unwrap();
        assert_eq!(oil.label, "Crude oil price (USDx100 per barrel)");
        assert!(registry.resolve_for(ViewMode::Single, "diesel_prediction").is_none());
        assert!(
            registry
                .resolve_for(ViewMode::Single, "Crude oil price (USDx100 per barrel)")
                .is_none()
        );
    }

    #[test]
    fn duplicate_labels_fail_the_check() {
        let spec = FieldSpec::new("Diesel", FieldKey::Diesel, 1000.0, 1000.0, &[ViewMode::Single, ViewMode::Comparison]);
        let err = FieldRegistry::new(vec![spec.clone(), spec]).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateLabel("Diesel".to_string()));
    }

    #[test]
    fn zero_scale_fails_the_check() {
        let spec = FieldSpec::new("Diesel", FieldKey::Diesel, 0.0, 1000.0, &[ViewMode::Single, ViewMode::Comparison]);
        assert!(matches!(
            FieldRegistry::new(vec![spec]),
            Err(ConfigError::InvalidScale { which: "single", .. })
        ));
    }

    #[test]
    fn a_view_without_labels_fails_the_check() {
        let spec = FieldSpec::new("Diesel", FieldKey::Diesel, 1000.0, 1000.0, &[ViewMode::Single]);
        assert_eq!(
            FieldRegistry::new(vec![spec]).unwrap_err(),
            ConfigError::EmptyView("comparison")
        );
    }

    #[test]
    fn json_table_uses_defaults_for_optional_fields() {
        let parsed: FieldFile = serde_json::from_str(
            r#"{ "fields": [ { "label": "Oil", "key": "crude_oil", "scale": 1.0 } ] }"#,
        )
        .unwrap();
        let registry = FieldRegistry::new(parsed.fields).unwrap();
        let oil = registry.resolve("Oil").unwrap();
        assert!(oil.offered_in(ViewMode::Comparison));
        assert_eq!(oil.scale_for(ViewMode::Comparison), 1.0);
    }

    #[test]
    fn labels_without_a_dataset_column_are_unresolved() {
        let registry = FieldRegistry::default();
        registry.check_columns(|_| true).unwrap();

        let err = registry
            .check_columns(|key| key != FieldKey::DieselPrediction)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Unresolved("Predicted Ekodiesel wholesale net price (PLN/litre)".to_string())
        );
    }

    #[test]
    fn nth_wraps_around() {
        let registry = FieldRegistry::default();
        let first = registry.nth(ViewMode::Single, 0).unwrap();
        let wrapped = registry.nth(ViewMode::Single, 4).unwrap();
        assert_eq!(first.label, wrapped.label);
    }
}
