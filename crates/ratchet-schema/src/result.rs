//! # Validation Results
//!
//! A validation run produces data, not an error: an ordered list of errors
//! and a separate ordered list of warnings. Ratcheting moves entries from
//! the first list to the second; it never invents or drops one.

use std::fmt;

use serde::Serialize;

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the violation.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Outcome of validating one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Failures that reject the value.
    pub errors: Vec<Violation>,
    /// Failures that were forgiven, reported for information only.
    pub warnings: Vec<Violation>,
}

impl ValidationResult {
    /// True when there are no errors. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error.
    pub fn add_error(&mut self, violation: Violation) {
        self.errors.push(violation);
    }

    /// Append another result's errors and warnings to this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Append another result, reclassifying its errors as warnings.
    ///
    /// Errors come first, then the other result's existing warnings, so the
    /// relative order of everything reported below a node is preserved.
    pub fn merge_as_warnings(&mut self, other: ValidationResult) {
        self.warnings.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (label, list) in [("error", &self.errors), ("warning", &self.warnings)] {
            for v in list {
                if !first {
                    writeln!(f)?;
                }
                first = false;
                write!(f, "  {label}: {v}")?;
            }
        }
        Ok(())
    }
}
