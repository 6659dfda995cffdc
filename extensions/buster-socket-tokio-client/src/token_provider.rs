use crate::constants::AUTHENTICATION_QUERY_PARAM;
use buster_socket::SocketError;

/// Supplies the access token for each connection attempt.
///
/// `Ok(None)` means no valid session is available; the attempt is abandoned
/// with [`SocketError::Unauthorized`].
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<Option<String>, SocketError>;
}

/// Always hands out the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A provider with no session.
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<Option<String>, SocketError> {
        Ok(self.token.clone())
    }
}

/// Appends the token to `url` as the percent-encoded `authentication` query
/// parameter.
pub(crate) fn authenticated_url(url: &str, token: &str) -> Result<String, url::ParseError> {
    let mut url = url::Url::parse(url)?;
    url.query_pairs_mut().append_pair(AUTHENTICATION_QUERY_PARAM, token);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::authenticated_url;

    #[test]
    fn token_is_appended_as_query_parameter() {
        assert_eq!(
            authenticated_url("ws://host/api/v1/ws", "abc").unwrap(),
            "ws://host/api/v1/ws?authentication=abc"
        );
        assert_eq!(
            authenticated_url("ws://host/api/v1/ws?v=2", "abc").unwrap(),
            "ws://host/api/v1/ws?v=2&authentication=abc"
        );
    }

    #[test]
    fn reserved_token_characters_are_encoded() {
        assert_eq!(
            authenticated_url("wss://host/api/v1/ws", "a&b+c#d").unwrap(),
            "wss://host/api/v1/ws?authentication=a%26b%2Bc%23d"
        );
    }

    #[test]
    fn unparsable_url_is_an_error() {
        assert!(authenticated_url("not a url", "abc").is_err());
    }
}
