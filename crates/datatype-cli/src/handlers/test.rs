//! Conformance suite command handler
//!
//! Suites run concurrently: every suite is a task sharing one registry, and
//! its cases are validated on the blocking pool, at most `--jobs` at a time.

use crate::cli::{OutputFormat, TestArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, SuiteResult, TestSummary};
use datatype_schemas::fixture::{CaseOutcome, SuiteReport, TestSuite};
use datatype_schemas::{DatatypeLoader, LoaderError, Registry, ValidationConfig, Validator};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

/// Handle the test command
#[instrument(skip_all, fields(paths = args.paths.len()))]
pub async fn handle_test(args: TestArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::new("test_command");
    let validation = super::validation_config(&config.validation, args.max_depth, None)?;
    let jobs = match args.jobs {
        Some(0) => return Err(Error::invalid_args("--jobs must be at least 1")),
        Some(jobs) => jobs,
        None => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
    };

    let files = collect_suite_files(&args.paths)?;
    if files.is_empty() {
        return Err(Error::invalid_args("No suite files (.yaml, .yml, .json) found"));
    }

    let mut suites = Vec::with_capacity(files.len());
    let mut names = HashSet::new();
    for path in files {
        let suite = TestSuite::from_file(&path)?;
        if !names.insert(suite.name.clone()) {
            warn!(suite = %suite.name, path = %path.display(), "Duplicate suite name");
            output.warning(&format!("Suite name '{}' is used more than once", suite.name))?;
        }
        suites.push((path, suite));
    }
    let focused = suites.iter().any(|(_, suite)| suite.is_focused());
    info!(suites = suites.len(), jobs, focused, "Running conformance suites");
    if focused {
        output.warning("Focused cases found; unfocused cases in every suite are skipped")?;
    }

    let total_cases: usize = suites
        .iter()
        .map(|(_, suite)| suite.selected_cases_with(focused).len())
        .sum();
    let progress = output.progress_bar(total_cases as u64, "cases");
    let limiter = Arc::new(Semaphore::new(jobs));

    let mut handles = Vec::with_capacity(suites.len());
    for (path, suite) in suites {
        let registry = suite
            .registry()
            .map_err(|e| LoaderError::schema_error(&path, e))?;
        handles.push(tokio::spawn(run_suite(
            path,
            Arc::new(suite),
            Arc::new(registry),
            focused,
            validation.clone(),
            Arc::clone(&limiter),
            progress.clone(),
        )));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await??);
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let summary = TestSummary::new(results);
    write_summary(output, &summary, timer.elapsed().as_secs_f64())?;

    info!(
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        "Conformance run finished"
    );
    if summary.is_success() {
        Ok(())
    } else {
        Err(Error::TestsFailed {
            failed: summary.failed,
            total: summary.total(),
        })
    }
}

/// Suite files named directly or found inside directories, directories in file name order
fn collect_suite_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let loader = DatatypeLoader::new();
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(loader.collect_documents(path)?);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(Error::FileNotFound { path: path.clone() });
        }
    }
    Ok(files)
}

async fn run_suite(
    path: PathBuf,
    suite: Arc<TestSuite>,
    registry: Arc<Registry>,
    focused: bool,
    config: ValidationConfig,
    limiter: Arc<Semaphore>,
    progress: Option<ProgressBar>,
) -> Result<SuiteResult> {
    let selected = suite.selected_cases_with(focused);
    debug!(suite = %suite.name, cases = selected.len(), "Running suite");

    let mut cases = Vec::with_capacity(selected.len());
    for index in selected {
        let permit = Arc::clone(&limiter)
            .acquire_owned()
            .await
            .map_err(|e| Error::other(format!("Case limiter closed: {}", e)))?;
        let suite = Arc::clone(&suite);
        let registry = Arc::clone(&registry);
        let config = config.clone();
        let progress = progress.clone();

        cases.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let case = &suite.tests[index];
            let errors = Validator::new(&registry).with_config(config).validate(&case.data);
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            CaseOutcome::new(index, case.result, errors)
        }));
    }

    let mut outcomes = Vec::with_capacity(cases.len());
    for case in cases {
        outcomes.push(case.await?);
    }

    let skipped = suite.tests.len() - outcomes.len();
    Ok(SuiteResult {
        path,
        report: SuiteReport::new(suite.name.as_str(), outcomes, skipped),
    })
}

fn write_summary(output: &mut OutputWriter, summary: &TestSummary, seconds: f64) -> Result<()> {
    if output.format() != OutputFormat::Human {
        return output.data(summary);
    }

    for result in &summary.suites {
        output.suite_result(result)?;
    }

    if output.is_verbose() {
        output.section("Summary")?;
        let rows = summary
            .suites
            .iter()
            .map(|s| {
                vec![
                    s.report.name.clone(),
                    s.report.passed().to_string(),
                    (s.report.outcomes.len() - s.report.passed()).to_string(),
                    s.report.skipped.to_string(),
                    display_path(&s.path),
                ]
            })
            .collect();
        output.table(&["Suite", "Passed", "Failed", "Skipped", "File"], rows)?;
    }

    output.writeln("")?;
    let line = format!(
        "{} passed, {} failed, {} skipped in {} suite(s) ({:.2}s)",
        summary.passed,
        summary.failed,
        summary.skipped,
        summary.suites.len(),
        seconds
    );
    if summary.is_success() {
        output.success(&line)
    } else {
        output.error(&line)
    }
}

fn display_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const PASSING: &str = r#"
name: strings
openAPIV3Schema:
  type: string
  minLength: 2
tests:
  - data: ab
    result: true
  - data: a
    result: false
  - data: 3
    result: false
"#;

    const FAILING: &str = r#"
name: tree
openAPIV3Schema:
  $ref: Node
additionalSchemes:
  Node:
    type: object
    properties:
      children:
        type: array
        items:
          $ref: Node
tests:
  - data: {children: [{}, {children: []}]}
    result: true
  - data: {children: [1]}
    result: true
"#;

    const FOCUSED: &str = r#"
name: strings
openAPIV3Schema:
  type: string
  minLength: 2
tests:
  - data: ab
    result: true
  - data: a
    result: false
    focus: true
  - data: 3
    result: false
"#;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn suites_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn args(dir: &TempDir) -> TestArgs {
        TestArgs {
            paths: vec![dir.path().to_path_buf()],
            jobs: Some(2),
            max_depth: None,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_passing_suites() {
        let dir = suites_dir(&[("strings.yaml", PASSING)]);
        let buffer = SharedBuffer::default();
        let mut output = OutputWriter::with_writer(
            OutputFormat::Json,
            false,
            false,
            0,
            Box::new(buffer.clone()),
        );

        handle_test(args(&dir), &Config::default(), &mut output).await.unwrap();

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(summary["passed"], 3);
        assert_eq!(summary["failed"], 0);
        assert_eq!(summary["suites"][0]["name"], "strings");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failing_case_is_reported() {
        let dir = suites_dir(&[("a-strings.yaml", PASSING), ("b-tree.yaml", FAILING)]);
        let buffer = SharedBuffer::default();
        let mut output = OutputWriter::with_writer(
            OutputFormat::Human,
            false,
            false,
            0,
            Box::new(buffer.clone()),
        );

        let err = handle_test(args(&dir), &Config::default(), &mut output)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TestsFailed { failed: 1, total: 5 }));

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let strings = text.find("✓ strings (3 passed)").unwrap();
        let tree = text.find("✗ tree (1/2 passed)").unwrap();
        assert!(strings < tree);
        assert!(text.contains("case 1: expected valid, got 1 error(s)"));
        assert!(text.contains("$.children[0]  [type_mismatch]"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_focus_applies_across_suites() {
        let dir = suites_dir(&[("a-strings.yaml", FOCUSED), ("b-tree.yaml", FAILING)]);
        let buffer = SharedBuffer::default();
        let mut output = OutputWriter::with_writer(
            OutputFormat::Json,
            false,
            false,
            0,
            Box::new(buffer.clone()),
        );

        handle_test(args(&dir), &Config::default(), &mut output).await.unwrap();

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(summary["passed"], 1);
        assert_eq!(summary["failed"], 0);
        assert_eq!(summary["skipped"], 4);
        assert_eq!(summary["suites"][1]["skipped"], 2);
    }

    #[tokio::test]
    async fn test_empty_directory_is_usage_error() {
        let dir = suites_dir(&[]);
        let mut output = OutputWriter::with_writer(
            OutputFormat::Human,
            false,
            true,
            0,
            Box::new(std::io::sink()),
        );

        let err = handle_test(args(&dir), &Config::default(), &mut output)
            .await
            .unwrap_err();
        assert!(err.should_show_help());
    }

    #[tokio::test]
    async fn test_invalid_schema_names_the_file() {
        let dir = suites_dir(&[("bad.yaml", "name: bad\nopenAPIV3Schema: {type: tuple}\n")]);
        let mut output = OutputWriter::with_writer(
            OutputFormat::Human,
            false,
            true,
            0,
            Box::new(std::io::sink()),
        );

        let err = handle_test(args(&dir), &Config::default(), &mut output)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Loader(LoaderError::SchemaError { .. })));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_missing_path() {
        let err = collect_suite_files(&[PathBuf::from("/nonexistent/suites")]).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
