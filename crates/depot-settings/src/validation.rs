//! Declarative field validation
//!
//! A [`RuleSet`] is an ordered list of [`Rule`]s evaluated fail-fast against
//! any record implementing [`Fields`]. Only the first violated rule is
//! reported; callers re-run validation after each correction.

use std::ops::Bound;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{SettingsError, ValidationError};

/// Borrowed view of one field of a record under validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Text field
    Text(&'a str),
    /// Numeric field
    Number(f64),
    /// Field absent or null
    Missing,
}

/// Records that expose their fields by name for validation
pub trait Fields {
    /// Value of the named field
    fn field(&self, name: &str) -> FieldValue<'_>;
}

/// A single named check within a pattern rule
#[derive(Debug, Clone)]
pub struct PatternCheck {
    regex: Regex,
}

impl PatternCheck {
    /// Wrap a compiled expression
    #[inline]
    #[must_use]
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }
}

/// One declarative validation rule
#[derive(Debug, Clone)]
pub enum Rule {
    /// Text must be non-empty after trimming; numbers must be present
    Required {
        /// Field name
        field: &'static str,
    },
    /// Number must be finite and within the bounds
    Range {
        /// Field name
        field: &'static str,
        /// Lower bound
        min: Bound<f64>,
        /// Upper bound
        max: Bound<f64>,
    },
    /// Text must match every check
    Pattern {
        /// Field name
        field: &'static str,
        /// Expressions that must all match
        checks: Vec<PatternCheck>,
        /// Message reported on failure
        description: &'static str,
    },
    /// Two text fields must be identical
    Matches {
        /// Field holding the original value
        field: &'static str,
        /// Field that must repeat it
        confirm_field: &'static str,
    },
    /// Two text fields must differ
    Differs {
        /// First field
        field: &'static str,
        /// Second field
        other: &'static str,
        /// Message reported on failure
        description: &'static str,
    },
}

impl Rule {
    fn check(&self, record: &impl Fields) -> Result<(), SettingsError> {
        match self {
            Self::Required { field } => match record.field(field) {
                FieldValue::Text(text) if !text.trim().is_empty() => Ok(()),
                FieldValue::Number(_) => Ok(()),
                _ => Err(ValidationError::new(*field, "is required").into()),
            },
            Self::Range { field, min, max } => match record.field(field) {
                FieldValue::Number(n) if n.is_finite() => {
                    if !above(n, *min) {
                        Err(ValidationError::new(*field, describe_min(*min)).into())
                    } else if !below(n, *max) {
                        Err(ValidationError::new(*field, describe_max(*max)).into())
                    } else {
                        Ok(())
                    }
                }
                FieldValue::Number(_) => {
                    Err(ValidationError::new(*field, "must be a finite number").into())
                }
                _ => Err(ValidationError::new(*field, "must be a number").into()),
            },
            Self::Pattern {
                field,
                checks,
                description,
            } => match record.field(field) {
                FieldValue::Text(text) if checks.iter().all(|c| c.regex.is_match(text)) => Ok(()),
                _ => Err(ValidationError::new(*field, *description).into()),
            },
            Self::Matches {
                field,
                confirm_field,
            } => {
                if record.field(field) == record.field(confirm_field) {
                    Ok(())
                } else {
                    Err(SettingsError::ConfirmationMismatch {
                        field: (*field).to_string(),
                        confirm_field: (*confirm_field).to_string(),
                    })
                }
            }
            Self::Differs {
                field,
                other,
                description,
            } => {
                if record.field(field) == record.field(other) {
                    Err(ValidationError::new(*field, *description).into())
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn above(n: f64, min: Bound<f64>) -> bool {
    match min {
        Bound::Included(m) => n >= m,
        Bound::Excluded(m) => n > m,
        Bound::Unbounded => true,
    }
}

fn below(n: f64, max: Bound<f64>) -> bool {
    match max {
        Bound::Included(m) => n <= m,
        Bound::Excluded(m) => n < m,
        Bound::Unbounded => true,
    }
}

fn describe_min(min: Bound<f64>) -> String {
    match min {
        Bound::Included(m) => format!("must be at least {m}"),
        Bound::Excluded(m) => format!("must be greater than {m}"),
        Bound::Unbounded => String::new(),
    }
}

fn describe_max(max: Bound<f64>) -> String {
    match max {
        Bound::Included(m) => format!("must be at most {m}"),
        Bound::Excluded(m) => format!("must be less than {m}"),
        Bound::Unbounded => String::new(),
    }
}

/// Ordered, fail-fast collection of rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Empty rule set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary rule
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append a required rule
    #[must_use]
    pub fn required(self, field: &'static str) -> Self {
        self.rule(Rule::Required { field })
    }

    /// Append a numeric range rule
    #[must_use]
    pub fn range(self, field: &'static str, min: Bound<f64>, max: Bound<f64>) -> Self {
        self.rule(Rule::Range { field, min, max })
    }

    /// Append a confirmation rule
    #[must_use]
    pub fn matches(self, field: &'static str, confirm_field: &'static str) -> Self {
        self.rule(Rule::Matches {
            field,
            confirm_field,
        })
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check `record` against every rule in order
    ///
    /// # Errors
    /// Returns the first violation as [`SettingsError::Validation`] or
    /// [`SettingsError::ConfirmationMismatch`]
    pub fn validate(&self, record: &impl Fields) -> Result<(), SettingsError> {
        self.rules.iter().try_for_each(|rule| rule.check(record))
    }
}

static LOWER: Lazy<Regex> = Lazy::new(|| Regex::new("[a-z]").expect("static regex"));
static UPPER: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Z]").expect("static regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]").expect("static regex"));
static SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new("[^A-Za-z0-9]").expect("static regex"));
static MIN_LENGTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s\S]{8,}$").expect("static regex"));

/// Password strength rule for `field`
///
/// Requires at least eight characters including a lower-case letter, an
/// upper-case letter, a digit and a symbol.
#[must_use]
pub fn password_strength(field: &'static str) -> Rule {
    Rule::Pattern {
        field,
        checks: [&LOWER, &UPPER, &DIGIT, &SYMBOL, &MIN_LENGTH]
            .into_iter()
            .map(|re| PatternCheck::new(Regex::clone(re)))
            .collect(),
        description: "must be at least 8 characters and include a lower-case letter, \
                      an upper-case letter, a digit and a symbol",
    }
}
