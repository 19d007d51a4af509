//! Bounded free-text fields
//!
//! Column widths mirror the table definitions in `db::migrations`.

use super::ValidationError;

/// Maximum length for task/event titles and session topics
const MAX_TITLE_LEN: usize = 100;

/// Maximum length for user display names
const MAX_NAME_LEN: usize = 100;

/// Maximum length for a mood label
const MAX_MOOD_LEN: usize = 50;

fn bounded(s: &str, field: &'static str, max: usize) -> Result<String, ValidationError> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(trimmed.to_owned())
}

/// Validated title (tasks, schedule events) or topic (tutoring sessions)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Create a new title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 100 characters
    ///
    /// # Example
    /// ```
    /// use studydesk_server::models::Title;
    ///
    /// assert!(Title::new("Read chapter 3").is_ok());
    /// assert!(Title::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded(s, "title", MAX_TITLE_LEN).map(Self)
    }

    /// Same rules as [`Title::new`], reported against the `topic` field.
    pub fn topic(s: &str) -> Result<Self, ValidationError> {
        bounded(s, "topic", MAX_TITLE_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated user display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded(s, "name", MAX_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated mood label ("happy", "tired", ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodLabel(String);

impl MoodLabel {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded(s, "mood", MAX_MOOD_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        let title = Title::new("  exam prep  ").unwrap();
        assert_eq!(title.as_str(), "exam prep");
    }

    #[test]
    fn rejects_whitespace_only() {
        assert!(matches!(
            Title::new("   ").unwrap_err(),
            ValidationError::Empty { field: "title" }
        ));
        assert!(matches!(
            Title::topic("").unwrap_err(),
            ValidationError::Empty { field: "topic" }
        ));
    }

    #[test]
    fn title_max_length() {
        assert!(Title::new(&"a".repeat(100)).is_ok());
        let err = Title::new(&"a".repeat(101)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 100, .. }));
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 100 two-byte characters still fit
        assert!(PersonName::new(&"ñ".repeat(100)).is_ok());
    }

    #[test]
    fn mood_max_length() {
        assert!(MoodLabel::new("motivated").is_ok());
        let err = MoodLabel::new(&"x".repeat(51)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { field: "mood", max: 50 }));
    }
}
