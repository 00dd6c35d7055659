use std::fmt::{self, Write};

#[cfg(feature = "colorized_output")]
use console::style;

const TITLE: &str = "MRD Store Validation Report";

/// Result status of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Check passed with a finding worth a look
    Warning(String),
    /// Check failed
    Failed(String),
}

impl CheckStatus {
    /// Severity of this outcome
    pub fn severity(&self) -> Severity {
        match self {
            CheckStatus::Ok => Severity::Passed,
            CheckStatus::Warning(_) => Severity::Warning,
            CheckStatus::Failed(_) => Severity::Failed,
        }
    }

    fn detail(&self) -> Option<&str> {
        match self {
            CheckStatus::Ok => None,
            CheckStatus::Warning(msg) | CheckStatus::Failed(msg) => Some(msg.as_str()),
        }
    }
}

/// Ordered severity of a check outcome; the worst one decides the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// No finding
    Passed,
    /// Data is readable but something looks off
    Warning,
    /// Structural damage or an invalid document
    Failed,
}

impl Severity {
    fn symbol(self) -> &'static str {
        match self {
            Severity::Passed => "✓",
            Severity::Warning => "⚠",
            Severity::Failed => "✗",
        }
    }

    fn verdict(self) -> &'static str {
        match self {
            Severity::Passed => "Validation PASSED",
            Severity::Warning => "Validation PASSED with warnings",
            Severity::Failed => "Validation FAILED",
        }
    }
}

/// One named check and its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationCheck {
    /// Dataset the check belongs to, `None` for checks of the whole store
    pub dataset: Option<String>,
    /// Name of the check
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
}

impl ValidationCheck {
    fn with_status(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            dataset: None,
            name: name.into(),
            status,
        }
    }

    pub(crate) fn ok(name: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Ok)
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Warning(message.into()))
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, CheckStatus::Failed(message.into()))
    }

    /// Attach the check to a dataset label
    pub(crate) fn in_dataset(mut self, label: &str) -> Self {
        self.dataset = Some(label.to_string());
        self
    }
}

/// Check counts by outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Checks that passed
    pub passed: usize,
    /// Checks that warned
    pub warnings: usize,
    /// Checks that failed
    pub failed: usize,
}

/// Outcome of validating one store file
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Checks in the order they ran
    pub checks: Vec<ValidationCheck>,
    /// Path of the validated store
    pub file_path: String,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            file_path: file_path.into(),
        }
    }

    /// Record a check
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// Counts of passed, warned and failed checks
    pub fn tally(&self) -> Tally {
        self.checks.iter().fold(Tally::default(), |mut t, c| {
            match c.status.severity() {
                Severity::Passed => t.passed += 1,
                Severity::Warning => t.warnings += 1,
                Severity::Failed => t.failed += 1,
            }
            t
        })
    }

    /// Worst outcome over all checks
    pub fn worst(&self) -> Severity {
        self.checks
            .iter()
            .map(|c| c.status.severity())
            .max()
            .unwrap_or(Severity::Passed)
    }

    /// Whether any check failed
    pub fn has_failures(&self) -> bool {
        self.worst() == Severity::Failed
    }

    /// Whether any check warned
    pub fn has_warnings(&self) -> bool {
        self.tally().warnings > 0
    }

    /// Number of passed checks
    pub fn success_count(&self) -> usize {
        self.tally().passed
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.tally().warnings
    }

    /// Number of failures
    pub fn failure_count(&self) -> usize {
        self.tally().failed
    }

    /// Find a store-level check by name
    pub fn check(&self, name: &str) -> Option<&ValidationCheck> {
        self.checks
            .iter()
            .find(|c| c.dataset.is_none() && c.name == name)
    }

    /// Find a check of one dataset by name
    pub fn dataset_check(&self, label: &str, name: &str) -> Option<&ValidationCheck> {
        self.checks
            .iter()
            .find(|c| c.dataset.as_deref() == Some(label) && c.name == name)
    }

    /// Labels that have checks, in the order they were first checked
    pub fn datasets(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for label in self.checks.iter().filter_map(|c| c.dataset.as_deref()) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Worst outcome among the checks of one dataset
    pub fn dataset_severity(&self, label: &str) -> Severity {
        self.checks
            .iter()
            .filter(|c| c.dataset.as_deref() == Some(label))
            .map(|c| c.status.severity())
            .max()
            .unwrap_or(Severity::Passed)
    }

    /// Render with terminal colors when the `colorized_output` feature is on
    pub fn format_colored(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.render(&mut out, true);
        out
    }

    fn render(&self, out: &mut impl Write, colored: bool) -> fmt::Result {
        writeln!(out, "{}", heading(TITLE, colored))?;
        writeln!(out, "{}", "=".repeat(TITLE.len()))?;
        writeln!(out, "File: {}", self.file_path)?;

        let store_checks: Vec<_> = self.checks.iter().filter(|c| c.dataset.is_none()).collect();
        if !store_checks.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", heading("Store", colored))?;
            for check in store_checks {
                render_check(out, check, colored)?;
            }
        }

        for label in self.datasets() {
            writeln!(out)?;
            let title = format!("Dataset '{}'", label);
            writeln!(
                out,
                "{} {}",
                heading(&title, colored),
                paint(
                    self.dataset_severity(label).symbol(),
                    self.dataset_severity(label),
                    colored
                )
            )?;
            for check in self
                .checks
                .iter()
                .filter(|c| c.dataset.as_deref() == Some(label))
            {
                render_check(out, check, colored)?;
            }
        }

        let tally = self.tally();
        writeln!(out)?;
        writeln!(
            out,
            "Summary: {} passed, {} warnings, {} failed",
            tally.passed, tally.warnings, tally.failed
        )?;
        let worst = self.worst();
        writeln!(out, "{}", paint(worst.verdict(), worst, colored))
    }
}

fn render_check(out: &mut impl Write, check: &ValidationCheck, colored: bool) -> fmt::Result {
    let severity = check.status.severity();
    write!(
        out,
        "  [{}] {}",
        paint(severity.symbol(), severity, colored),
        check.name
    )?;
    match (severity, check.status.detail()) {
        (Severity::Warning, Some(msg)) => writeln!(out, " - WARNING: {}", msg),
        (Severity::Failed, Some(msg)) => writeln!(out, " - FAILED: {}", msg),
        _ => writeln!(out),
    }
}

#[cfg(feature = "colorized_output")]
fn paint(text: &str, severity: Severity, colored: bool) -> String {
    if !colored {
        return text.to_string();
    }
    let styled = style(text);
    match severity {
        Severity::Passed => styled.green(),
        Severity::Warning => styled.yellow().bold(),
        Severity::Failed => styled.red().bold(),
    }
    .to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn paint(text: &str, _severity: Severity, _colored: bool) -> String {
    text.to_string()
}

#[cfg(feature = "colorized_output")]
fn heading(text: &str, colored: bool) -> String {
    if colored {
        style(text).bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(not(feature = "colorized_output"))]
fn heading(text: &str, _colored: bool) -> String {
    text.to_string()
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, false)
    }
}
