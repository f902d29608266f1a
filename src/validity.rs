//! Validity reports
//!
//! Soft, user-facing diagnostics. Checks never fail; they describe what is
//! wrong and how to fix it, grouped by category, for batch display.

use std::collections::BTreeMap;
use std::fmt;

/// One recorded problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityIssue {
    /// Short message
    pub message: String,
    /// What exactly is wrong
    pub details: String,
    /// Suggested remedy
    pub solution: String,
    /// Display name of the offending object
    pub source: String,
}

/// Tree of categories collecting [`ValidityIssue`]s
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityReport {
    issues: Vec<ValidityIssue>,
    categories: BTreeMap<String, ValidityReport>,
}

impl ValidityReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sub-report for `category`, created on first use
    pub fn for_category(&mut self, category: &str) -> &mut ValidityReport {
        self.categories.entry(category.to_string()).or_default()
    }

    pub fn report_is_invalid(
        &mut self,
        message: impl Into<String>,
        details: impl Into<String>,
        solution: impl Into<String>,
        source: impl Into<String>,
    ) {
        self.issues.push(ValidityIssue {
            message: message.into(),
            details: details.into(),
            solution: solution.into(),
            source: source.into(),
        });
    }

    /// No issue here or in any category below
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty() && self.categories.values().all(ValidityReport::is_valid)
    }

    /// All issues with their category path, e.g. `["Sample A", "File path"]`
    pub fn invalid_entries(&self) -> Vec<(Vec<String>, &ValidityIssue)> {
        let mut entries = Vec::new();
        self.collect(&mut Vec::new(), &mut entries);
        entries
    }

    fn collect<'r>(&'r self, path: &mut Vec<String>, out: &mut Vec<(Vec<String>, &'r ValidityIssue)>) {
        for issue in &self.issues {
            out.push((path.clone(), issue));
        }
        for (name, category) in &self.categories {
            path.push(name.clone());
            category.collect(path, out);
            path.pop();
        }
    }

    pub fn clear(&mut self) {
        self.issues.clear();
        self.categories.clear();
    }
}

impl fmt::Display for ValidityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, issue) in self.invalid_entries() {
            let category = if path.is_empty() {
                "General".to_string()
            } else {
                path.join(" > ")
            };
            writeln!(f, "{}: {}", category, issue.message)?;
            if !issue.details.is_empty() {
                writeln!(f, "    {}", issue.details)?;
            }
            if !issue.solution.is_empty() {
                writeln!(f, "    Suggestion: {}", issue.solution)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid() {
        let mut report = ValidityReport::new();
        report.for_category("Samples").for_category("A");
        assert!(report.is_valid());
        assert!(report.invalid_entries().is_empty());
    }

    #[test]
    fn test_nested_issue_invalidates_root() {
        let mut report = ValidityReport::new();
        report.for_category("Sample A").for_category("File path").report_is_invalid(
            "File path is invalid!",
            "The selected file does not exist",
            "Please select a valid file.",
            "File",
        );

        assert!(!report.is_valid());
        let entries = report.invalid_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, vec!["Sample A".to_string(), "File path".to_string()]);
        assert!(report.to_string().starts_with("Sample A > File path: File path is invalid!"));
    }
}
