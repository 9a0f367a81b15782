//! Operator credentials.

use std::fmt;

use zeroize::Zeroize;

/// The six-digit operator PIN. Used as both client id and secret when
/// exchanging for a token.
#[derive(Clone, PartialEq, Eq)]
pub struct OperatorPin(String);

impl OperatorPin {
    /// Wrap an already validated PIN.
    pub fn new(pin: impl Into<String>) -> Self {
        Self(pin.into())
    }

    /// The PIN in clear text, for the token exchange only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OperatorPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OperatorPin(**redacted**)")
    }
}

impl Drop for OperatorPin {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Bearer token issued for the operator session.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a backend-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token in clear text, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(**redacted**)")
    }
}

impl Drop for AccessToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_secrets() {
        let pin = OperatorPin::new("123456");
        let token = AccessToken::new("eyJhbGciOi");

        assert_eq!(format!("{pin:?}"), "OperatorPin(**redacted**)");
        assert_eq!(format!("{token:?}"), "AccessToken(**redacted**)");
        assert_eq!(pin.expose(), "123456");
        assert_eq!(token.expose(), "eyJhbGciOi");
    }
}
