//! Conformance suites: a schema, its referenced datatypes and data cases
//!
//! A suite file looks like
//!
//! ```yaml
//! name: person
//! openAPIV3Schema:
//!   type: object
//!   properties:
//!     home:
//!       $ref: Address
//! additionalSchemes:
//!   Address:
//!     type: object
//! tests:
//!   - data: {home: {}}
//!     result: true
//!   - data: {home: 1}
//!     result: false
//!     focus: true
//! ```
//!
//! When any case is focused, only focused cases run. A single suite applies
//! this to its own cases; a run over several suites applies it across all of
//! them, so unfocused suites are skipped entirely.
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use crate::loader::{LoaderError, LoaderResult, SchemaParser};
use crate::model::SchemaResult;
use crate::registry::{Registry, RegistryBuilder};
use crate::validation::{ValidationConfig, ValidationErrors, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A named schema with the data cases it must accept or reject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    #[serde(rename = "openAPIV3Schema")]
    pub open_api_v3_schema: Value,
    #[serde(rename = "additionalSchemes", default)]
    pub additional_schemes: BTreeMap<String, Value>,
    #[serde(default)]
    pub tests: Vec<TestCase>,
}

/// One data value and whether it should conform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub data: Value,
    pub result: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub focus: bool,
}

impl TestSuite {
    /// Read a suite from a YAML or JSON file
    pub fn from_file(path: &Path) -> LoaderResult<Self> {
        let value = SchemaParser::new().parse_file(path)?;
        serde_json::from_value(value)
            .map_err(|e| LoaderError::invalid_document(path, e.to_string()))
    }

    /// Build the registry for this suite; additional schemes are registered by name
    pub fn registry(&self) -> SchemaResult<Registry> {
        self.additional_schemes
            .iter()
            .fold(
                RegistryBuilder::new(self.open_api_v3_schema.clone()),
                |builder, (name, raw)| builder.referenced(name.clone(), raw.clone()),
            )
            .build()
    }

    /// Whether any case is focused
    pub fn is_focused(&self) -> bool {
        self.tests.iter().any(|case| case.focus)
    }

    /// Build the registry and run every selected case with the default configuration
    pub fn run(&self) -> SchemaResult<SuiteReport> {
        let registry = self.registry()?;
        Ok(self.run_with(&registry, &ValidationConfig::default()))
    }

    /// Indices of the cases that run: the focused ones if any, otherwise all
    pub fn selected_cases(&self) -> Vec<usize> {
        self.selected_cases_with(self.is_focused())
    }

    /// Indices of the cases that run when focus is active for the whole run
    pub fn selected_cases_with(&self, focused: bool) -> Vec<usize> {
        self.tests
            .iter()
            .enumerate()
            .filter(|(_, case)| !focused || case.focus)
            .map(|(index, _)| index)
            .collect()
    }

    /// Run the selected cases against an already built registry
    pub fn run_with(&self, registry: &Registry, config: &ValidationConfig) -> SuiteReport {
        let validator = Validator::new(registry).with_config(config.clone());
        let selected = self.selected_cases();

        let outcomes: Vec<CaseOutcome> = selected
            .iter()
            .map(|&index| {
                let case = &self.tests[index];
                CaseOutcome::new(index, case.result, validator.validate(&case.data))
            })
            .collect();

        SuiteReport::new(&self.name, outcomes, self.tests.len() - selected.len())
    }
}

/// Result of one executed case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    /// Position of the case in the suite
    pub index: usize,
    /// Whether the data was expected to conform
    pub expected: bool,
    pub errors: ValidationErrors,
}

impl CaseOutcome {
    pub fn new(index: usize, expected: bool, errors: ValidationErrors) -> Self {
        Self {
            index,
            expected,
            errors,
        }
    }

    /// Whether the data actually conformed
    pub fn actual(&self) -> bool {
        self.errors.is_valid()
    }

    pub fn passed(&self) -> bool {
        self.expected == self.actual()
    }
}

/// Outcomes of one suite run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub outcomes: Vec<CaseOutcome>,
    /// Cases left out because other cases were focused
    pub skipped: usize,
}

impl SuiteReport {
    pub fn new(name: impl Into<String>, outcomes: Vec<CaseOutcome>, skipped: usize) -> Self {
        Self {
            name: name.into(),
            outcomes,
            skipped,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(CaseOutcome::passed)
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }
}

/// Every suite file directly inside `dir`, sorted by file name
pub fn load_suites(dir: &Path) -> LoaderResult<Vec<(PathBuf, TestSuite)>> {
    crate::loader::DatatypeLoader::new()
        .collect_documents(dir)?
        .into_iter()
        .map(|path| TestSuite::from_file(&path).map(|suite| (path, suite)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn suite(yaml: &str) -> TestSuite {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        serde_json::from_value(serde_json::to_value(value).unwrap()).unwrap()
    }

    const SUITE: &str = r#"
name: person
openAPIV3Schema:
  type: object
  properties:
    home:
      $ref: Address
additionalSchemes:
  Address:
    type: object
    required: [street]
    properties:
      street:
        type: string
tests:
  - data: {home: {street: Main}}
    result: true
  - data: {home: {}}
    result: false
  - data: {home: {}}
    result: true
"#;

    #[test]
    fn test_run_reports_each_case() {
        let report = suite(SUITE).run().unwrap();
        assert_eq!(report.name, "person");
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.passed(), 2);
        assert!(!report.is_success());

        let failed: Vec<_> = report.failures().map(|o| o.index).collect();
        assert_eq!(failed, vec![2]);
        assert!(!report.outcomes[2].actual());
    }

    #[test]
    fn test_focus_limits_cases() {
        let mut suite = suite(SUITE);
        suite.tests[1].focus = true;

        let report = suite.run().unwrap();
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.skipped, 2);
        assert!(report.is_success());
    }

    #[test]
    fn test_focus_from_another_suite() {
        let suite = suite(SUITE);
        assert!(!suite.is_focused());
        assert_eq!(suite.selected_cases_with(false), vec![0, 1, 2]);
        assert!(suite.selected_cases_with(true).is_empty());
    }

    #[test]
    fn test_missing_data_is_null() {
        let suite = suite(
            "name: nulls\n\
             openAPIV3Schema: {type: string, nullable: true}\n\
             tests:\n  - result: true\n",
        );
        assert_eq!(suite.tests[0].data, Value::Null);
        assert!(suite.run().unwrap().is_success());
    }

    #[test]
    fn test_invalid_schema_fails_registry() {
        let suite = suite("name: bad\nopenAPIV3Schema: {type: tuple}\n");
        assert!(suite.run().is_err());
    }
}
