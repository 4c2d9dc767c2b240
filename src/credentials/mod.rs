use crate::error::PulseError;

/// Environment variable holding the Azure DevOps personal access token
pub const ENV_TOKEN_VAR: &str = "AZURE_PERSONAL_ACCESS_TOKEN";

/// Normalise a raw token value: Some(token) if set and non-empty after
/// trimming, None otherwise.
pub fn token_from(raw: Option<String>) -> Option<String> {
    raw.map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// The configured token, or `MissingCredential`
pub fn require_token(token: Option<&str>) -> Result<&str, PulseError> {
    token.ok_or(PulseError::MissingCredential)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_trimmed() {
        assert_eq!(token_from(Some("  pat-1 \n".to_string())), Some("pat-1".to_string()));
    }

    #[test]
    fn test_blank_token_is_missing() {
        assert_eq!(token_from(Some("   ".to_string())), None);
        assert_eq!(token_from(None), None);
    }

    #[test]
    fn test_require_token() {
        assert_eq!(require_token(Some("pat")), Ok("pat"));
        assert_eq!(require_token(None), Err(PulseError::MissingCredential));
    }
}
