#[derive(Debug)]
pub enum ConfigError {
    UnknownValue {
        key: String,
        value: String,
        allowed: &'static [&'static str],
    },
    InvalidNumber {
        key: String,
        value: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::UnknownValue {
                key,
                value,
                allowed,
            } => {
                write!(
                    f,
                    "unknown value {value:?} for option {key:?} (allowed: {})",
                    allowed.join(", ")
                )?;
            }
            Self::InvalidNumber { key, value } => {
                write!(f, "option {key:?} expects a number, got {value:?}")?;
            }
        };
        Ok(())
    }
}
impl std::error::Error for ConfigError {}
