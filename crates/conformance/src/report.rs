//! Append-only log of case outcomes

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::ConformanceResult;

/// How a case ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    /// A prerequisite (token or discovered id) was missing
    Skipped,
}

/// Result of one case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub group: String,
    pub outcome: Outcome,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    pub fn failed(&self) -> bool {
        self.outcome == Outcome::Failed
    }
}

/// Totals for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub failures: Vec<TestResult>,
}

impl Summary {
    /// Percentage of executed cases that passed
    pub fn success_rate(&self) -> f64 {
        let executed = self.passed + self.failed;
        if executed == 0 {
            return 0.0;
        }
        self.passed as f64 / executed as f64 * 100.0
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Serialize)]
struct ResultsFile<'a> {
    summary: &'a Summary,
    results: &'a [TestResult],
}

/// Ordered record of every case the run executed
#[derive(Debug)]
pub struct ResultLog {
    results: Vec<TestResult>,
    group: String,
    started: Instant,
}

impl Default for ResultLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultLog {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            group: String::new(),
            started: Instant::now(),
        }
    }

    /// Tag subsequent results with a group name
    pub fn enter_group(&mut self, group: &str) {
        self.group = group.to_string();
    }

    pub fn record(&mut self, name: &str, success: bool, message: impl Into<String>) {
        self.push(name, success, message.into(), None);
    }

    pub fn record_with_data(
        &mut self,
        name: &str,
        success: bool,
        message: impl Into<String>,
        data: Value,
    ) {
        self.push(name, success, message.into(), Some(data));
    }

    /// Record a case that could not run
    pub fn skip(&mut self, name: &str, reason: impl Into<String>) {
        let message = reason.into();
        warn!("- SKIP: {} - {}", name, message);
        self.results.push(TestResult {
            name: name.to_string(),
            group: self.group.clone(),
            outcome: Outcome::Skipped,
            message,
            data: None,
        });
    }

    fn push(&mut self, name: &str, success: bool, message: String, data: Option<Value>) {
        if success {
            info!("✓ PASS: {} - {}", name, message);
        } else {
            error!("✗ FAIL: {} - {}", name, message);
        }
        self.results.push(TestResult {
            name: name.to_string(),
            group: self.group.clone(),
            outcome: if success { Outcome::Passed } else { Outcome::Failed },
            message,
            data,
        });
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summarize(&self) -> Summary {
        let passed = self.results.iter().filter(|r| r.passed()).count();
        let failures: Vec<TestResult> =
            self.results.iter().filter(|r| r.failed()).cloned().collect();
        let skipped = self
            .results
            .iter()
            .filter(|r| r.outcome == Outcome::Skipped)
            .count();

        Summary {
            total: self.results.len(),
            passed,
            failed: failures.len(),
            skipped,
            duration_ms: self.started.elapsed().as_millis() as u64,
            failures,
        }
    }

    /// Write every result plus the summary to `conformance-results.json`
    pub fn write_json(&self, output_dir: &Path) -> ConformanceResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;

        let summary = self.summarize();
        let path = output_dir.join("conformance-results.json");
        let json = serde_json::to_string_pretty(&ResultsFile {
            summary: &summary,
            results: &self.results,
        })?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
