use thiserror::Error;

/// Errors raised while constructing a pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid extraction rule for example '{example}': {reason}")]
    InvalidRule { example: String, reason: String },
}

/// Errors related to skill registration and enablement.
///
/// These are configuration faults and are fatal at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("skill '{0}' is registered more than once")]
    DuplicateSkill(String),

    #[error("unknown skill '{0}'")]
    UnknownSkill(String),

    #[error("skill '{skill}' has a malformed pattern: {source}")]
    MalformedPattern {
        skill: String,
        #[source]
        source: PatternError,
    },
}

/// Errors from external collaborators (weather service, dialer).
///
/// Skills convert these into failed outputs; they never cross the engine.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("service not configured: {0}")]
    NotConfigured(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_error_display() {
        let err = PatternError::InvalidRule {
            example: "позвони маме".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid extraction rule for example 'позвони маме': unclosed group"
        );
    }

    #[test]
    fn test_registry_error_display() {
        assert_eq!(
            RegistryError::DuplicateSkill("timer".to_string()).to_string(),
            "skill 'timer' is registered more than once"
        );
        let err = RegistryError::MalformedPattern {
            skill: "timer".to_string(),
            source: PatternError::InvalidRule {
                example: "x".to_string(),
                reason: "y".to_string(),
            },
        };
        assert!(err.to_string().starts_with("skill 'timer' has a malformed pattern"));
    }

    #[test]
    fn test_upstream_error_display() {
        assert_eq!(
            UpstreamError::NotFound("Атлантида".to_string()).to_string(),
            "'Атлантида' not found"
        );
        assert_eq!(
            UpstreamError::NotConfigured("missing api key".to_string()).to_string(),
            "service not configured: missing api key"
        );
    }
}
