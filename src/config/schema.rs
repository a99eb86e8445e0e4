use crate::python::{HintMode, MarkOptions};
use crate::tree::NodeKind;
use serde::Deserialize;
use std::fmt;

/// Largest accepted `[output] context`.
pub const MAX_CONTEXT: usize = 1000;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub marker: MarkerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.output.context > MAX_CONTEXT {
            issues.push(ValidationIssue::OutOfRange {
                field: "output.context",
                value: self.output.context,
                max: MAX_CONTEXT,
            });
        }
        for name in &self.output.kinds {
            if name.parse::<NodeKind>().is_err() {
                issues.push(ValidationIssue::UnknownKind {
                    field: "output.kinds",
                    value: name.clone(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn mark_options(&self) -> MarkOptions {
        MarkOptions {
            hints: self.marker.hints,
        }
    }

    /// `[output] kinds` as node kinds. Names are checked by [`Config::validate`].
    pub fn kinds(&self) -> Vec<NodeKind> {
        self.output
            .kinds
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct MarkerConfig {
    #[serde(default)]
    pub hints: HintMode,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub color: bool,
    /// Show comment and line-break tokens
    #[serde(default)]
    pub trivia: bool,
    /// Unchanged lines around each diff hunk
    #[serde(default = "default_context")]
    pub context: usize,
    /// Default kind filter for node listings
    #[serde(default)]
    pub kinds: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            trivia: false,
            context: default_context(),
            kinds: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_context() -> usize {
    3
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    OutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },
    UnknownKind {
        field: &'static str,
        value: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::OutOfRange { field, value, max } => {
                write!(f, "'{field}' is {value}, maximum is {max}")
            }
            ValidationIssue::UnknownKind { field, value } => {
                write!(f, "'{field}' names unknown node kind '{value}'")
            }
        }
    }
}
