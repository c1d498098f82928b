use thiserror::Error;

/// Errors raised while loading configuration or parsing display settings.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("invalid configuration: {section}: {reason}")]
    InvalidConfig {
        section: &'static str,
        reason: String,
    },

    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),

    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

impl From<figment::Error> for JournalError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl JournalError {
    pub(crate) fn invalid(section: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            section,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;
