//! Access token sources for the HTTP adapter.

use std::fmt;

use zeroize::Zeroizing;

/// Supplies the bearer token attached to outgoing requests.
///
/// Returning `None` fails the request as unauthorized before it is sent.
pub trait AccessTokenSource: Send + Sync {
    /// Current access token, if the session holds one.
    fn access_token(&self) -> Option<Zeroizing<String>>;
}

/// Token fixed at construction, typically read from configuration.
#[derive(Clone, Default)]
pub struct StaticAccessToken {
    token: Option<Zeroizing<String>>,
}

impl StaticAccessToken {
    /// Wrap `token`; blank tokens are treated as absent.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            return Self::default();
        }
        Self {
            token: Some(Zeroizing::new(token)),
        }
    }

    /// Wrap an optional token.
    pub fn from_option(token: Option<&str>) -> Self {
        token.map(Self::new).unwrap_or_default()
    }
}

impl fmt::Debug for StaticAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticAccessToken")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AccessTokenSource for StaticAccessToken {
    fn access_token(&self) -> Option<Zeroizing<String>> {
        self.token.clone()
    }
}
