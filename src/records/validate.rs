use super::Record;
use thiserror::Error;

/// Why a registration was refused. The message is shown to the submitter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Please provide both name and interests!")]
    MissingField,

    #[error("Error: The name '{0}' is already registered!")]
    DuplicateName(String),
}

/// Case-insensitive, whitespace-insensitive lookup against persisted rows.
pub fn name_exists(name: &str, existing: &[Record]) -> bool {
    let wanted = name.trim().to_lowercase();
    existing
        .iter()
        .any(|r| r.name.trim().to_lowercase() == wanted)
}

/// Checks a submission before it is appended to the record file.
pub fn validate_submission<'a>(
    name: Option<&'a str>,
    interests: Option<&'a str>,
    existing: &[Record],
) -> Result<(&'a str, &'a str), SubmissionError> {
    let name = name.filter(|n| !n.trim().is_empty());
    let interests = interests.filter(|i| i.split(',').any(|t| !t.trim().is_empty()));
    match (name, interests) {
        (Some(name), Some(interests)) => {
            if name_exists(name, existing) {
                return Err(SubmissionError::DuplicateName(name.to_string()));
            }
            Ok((name, interests))
        }
        _ => Err(SubmissionError::MissingField),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> Vec<Record> {
        vec![Record::new("Alice", "python"), Record::new("bob ", "css")]
    }

    #[test]
    fn accepts_new_name() {
        assert_eq!(
            validate_submission(Some("carol"), Some("ml"), &existing()),
            Ok(("carol", "ml"))
        );
    }

    #[test]
    fn rejects_missing_fields() {
        let existing = existing();
        for (name, interests) in [
            (None, Some("ml")),
            (Some("carol"), None),
            (Some("  "), Some("ml")),
            (Some("carol"), Some(" , ")),
        ] {
            assert_eq!(
                validate_submission(name, interests, &existing),
                Err(SubmissionError::MissingField)
            );
        }
    }

    #[test]
    fn rejects_duplicate_name_ignoring_case_and_whitespace() {
        let err = validate_submission(Some(" ALICE"), Some("ml"), &existing()).unwrap_err();
        assert_eq!(err, SubmissionError::DuplicateName(" ALICE".to_string()));
        assert!(name_exists("Bob", &existing()));
        assert!(!name_exists("carol", &existing()));
    }
}
