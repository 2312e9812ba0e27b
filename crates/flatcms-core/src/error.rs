use thiserror::Error;

/// Errors raised by the credential store, document store and auth gate.
///
/// The `Display` text of the user-facing variants is shown to the user
/// verbatim as a flash message.
#[derive(Error, Debug)]
pub enum Error {
    #[error("You must be signed in to do that.")]
    NotAuthenticated,

    #[error("{0} does not exist.")]
    NotFound(String),

    #[error("Invalid username, {0} is already taken.")]
    DuplicateUser(String),

    #[error("Invalid Credentials.")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("I/O failure: {0}")]
    IoFailure(#[from] std::io::Error),

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length for error details carried in `StoreUnavailable`
const MAX_ERROR_DETAIL_LENGTH: usize = 200;

impl Error {
    /// True for failures the user can correct (bad input, not signed in, ...).
    /// Everything else is a server-side fault.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Error::IoFailure(_) | Error::StoreUnavailable(_))
    }

    pub(crate) fn store_unavailable(detail: impl std::fmt::Display) -> Self {
        let detail = detail.to_string();
        if detail.len() <= MAX_ERROR_DETAIL_LENGTH {
            Error::StoreUnavailable(detail)
        } else {
            let truncated: String = detail.chars().take(MAX_ERROR_DETAIL_LENGTH).collect();
            Error::StoreUnavailable(format!("{}... (truncated)", truncated))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_flash_text() {
        assert_eq!(
            Error::NotAuthenticated.to_string(),
            "You must be signed in to do that."
        );
        assert_eq!(
            Error::NotFound("notes.txt".into()).to_string(),
            "notes.txt does not exist."
        );
        assert_eq!(
            Error::DuplicateUser("admin".into()).to_string(),
            "Invalid username, admin is already taken."
        );
        assert_eq!(Error::InvalidCredentials.to_string(), "Invalid Credentials.");
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(Error::Validation("A name is required.".into()).is_user_facing());
        assert!(!Error::store_unavailable("corrupt").is_user_facing());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(!Error::from(io).is_user_facing());
    }

    #[test]
    fn test_store_unavailable_truncates_long_detail() {
        let long = "x".repeat(1000);
        match Error::store_unavailable(long) {
            Error::StoreUnavailable(detail) => {
                assert!(detail.len() < 300);
                assert!(detail.ends_with("(truncated)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
