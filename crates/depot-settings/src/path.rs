//! Settings paths
//!
//! Provides [`SettingsPath`] for addressing a section (`"pricing"`) or a
//! subsection (`"notifications.email"`) inside the settings tree.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Maximum number of segments a settings path may carry.
pub const MAX_DEPTH: usize = 2;

/// Address of a section or subsection within the settings tree
///
/// Fields are addressed separately, so `notifications.email.smtpHost` is the
/// path `notifications.email` plus the field `smtpHost`.
///
/// # Examples
/// - `"business"` → section `business`
/// - `"notifications.sms"` → subsection `sms` of section `notifications`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SettingsPath {
    section: String,
    subsection: Option<String>,
}

impl SettingsPath {
    /// Path addressing a whole section
    ///
    /// # Errors
    /// Returns error if `name` is not a valid key
    pub fn section(name: impl Into<String>) -> Result<Self, PathError> {
        let section = name.into();
        validate_key(&section)?;
        Ok(Self {
            section,
            subsection: None,
        })
    }

    /// Path addressing a subsection of a section
    ///
    /// # Errors
    /// Returns error if either segment is not a valid key
    pub fn subsection(
        section: impl Into<String>,
        subsection: impl Into<String>,
    ) -> Result<Self, PathError> {
        let section = section.into();
        let subsection = subsection.into();
        validate_key(&section)?;
        validate_key(&subsection)?;
        Ok(Self {
            section,
            subsection: Some(subsection),
        })
    }

    /// Section name (first segment)
    #[inline]
    #[must_use]
    pub fn section_name(&self) -> &str {
        &self.section
    }

    /// Subsection name (second segment), if any
    #[inline]
    #[must_use]
    pub fn subsection_name(&self) -> Option<&str> {
        self.subsection.as_deref()
    }

    /// Number of segments (1 or 2)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.subsection.is_some() {
            2
        } else {
            1
        }
    }

    /// Human-readable location of `field` under this path
    #[must_use]
    pub fn describe_field(&self, field: &str) -> String {
        format!("{self}.{field}")
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.section.as_str()).chain(self.subsection.as_deref())
    }
}

impl Display for SettingsPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.subsection {
            Some(sub) => write!(f, "{}.{}", self.section, sub),
            None => f.write_str(&self.section),
        }
    }
}

impl FromStr for SettingsPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<&str> = s.split('.').collect();
        match segments.as_slice() {
            [section] => Self::section(*section),
            [section, subsection] => Self::subsection(*section, *subsection),
            _ => Err(PathError::TooDeep {
                path: s.to_string(),
                depth: segments.len(),
            }),
        }
    }
}

/// Check that a single key (section, subsection or field name) is well formed
///
/// Keys are non-empty and made of ASCII letters, digits or underscores.
///
/// # Errors
/// Returns [`PathError::EmptySegment`] or [`PathError::InvalidSegment`]
pub fn validate_key(key: &str) -> Result<(), PathError> {
    if key.is_empty() {
        return Err(PathError::EmptySegment);
    }
    if key.contains(|c: char| !c.is_ascii_alphanumeric() && c != '_') {
        return Err(PathError::InvalidSegment(key.to_string()));
    }
    Ok(())
}

/// Errors related to settings paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path string was empty
    #[error("path is empty")]
    Empty,

    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0} (must be alphanumeric or underscore)")]
    InvalidSegment(String),

    /// More segments than the tree has levels
    #[error("path '{path}' has {depth} segments (max {MAX_DEPTH})")]
    TooDeep { path: String, depth: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_section() {
        let path: SettingsPath = "pricing".parse().unwrap();
        assert_eq!(path.section_name(), "pricing");
        assert_eq!(path.subsection_name(), None);
        assert_eq!(path.depth(), 1);
    }

    #[test]
    fn parse_subsection() {
        let path: SettingsPath = "notifications.email".parse().unwrap();
        assert_eq!(path.section_name(), "notifications");
        assert_eq!(path.subsection_name(), Some("email"));
        assert_eq!(path.depth(), 2);
        assert_eq!(path.iter().collect::<Vec<_>>(), vec!["notifications", "email"]);
    }

    #[test]
    fn parse_rejects_three_segments() {
        let result: Result<SettingsPath, _> = "notifications.email.smtpHost".parse();
        assert!(matches!(result, Err(PathError::TooDeep { depth: 3, .. })));
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!("".parse::<SettingsPath>(), Err(PathError::Empty));
        assert_eq!("a..".parse::<SettingsPath>().unwrap_err(), PathError::TooDeep {
            path: "a..".to_string(),
            depth: 3,
        });
        assert_eq!(
            "notifications.".parse::<SettingsPath>(),
            Err(PathError::EmptySegment)
        );
    }

    #[test]
    fn parse_rejects_invalid_chars() {
        let result: Result<SettingsPath, _> = "pricing-rules".parse();
        assert!(matches!(result, Err(PathError::InvalidSegment(_))));
    }

    #[test]
    fn display_round_trips() {
        for raw in ["business", "notifications.sms"] {
            let path: SettingsPath = raw.parse().unwrap();
            assert_eq!(path.to_string(), raw);
        }
    }

    #[test]
    fn describe_field_joins_with_dot() {
        let path = SettingsPath::subsection("notifications", "email").unwrap();
        assert_eq!(path.describe_field("smtpHost"), "notifications.email.smtpHost");
    }

    #[test]
    fn validate_key_accepts_camel_case() {
        assert!(validate_key("ratePerArea").is_ok());
        assert!(validate_key("smtp_port").is_ok());
        assert!(validate_key("smtp port").is_err());
    }
}
