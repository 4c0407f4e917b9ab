/// Caller credentials passed through to the metadata and record search
/// services. Either an API key, a bearer token, or both may be present;
/// the recommendation core itself does no authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    api_key: Option<String>,
    token: Option<String>,
}

impl Credentials {
    pub fn new(api_key: Option<String>, token: Option<String>) -> Self {
        Self { api_key, token }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            token: None,
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            api_key: None,
            token: Some(token.into()),
        }
    }

    /// API key for the `wskey` query parameter, if provided
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Value for the `Authorization` header, if a token was provided.
    /// The `Bearer` scheme prefix is added unless already present.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_deref().map(|token| {
            if token.starts_with("Bearer ") {
                token.to_string()
            } else {
                format!("Bearer {token}")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_credentials() {
        let creds = Credentials::default();
        assert_eq!(creds.api_key(), None);
        assert_eq!(creds.authorization(), None);
    }

    #[test]
    fn test_bearer_prefix_added_once() {
        let plain = Credentials::with_token("abc123");
        assert_eq!(plain.authorization(), Some("Bearer abc123".to_string()));

        let prefixed = Credentials::with_token("Bearer abc123");
        assert_eq!(prefixed.authorization(), Some("Bearer abc123".to_string()));
    }
}
