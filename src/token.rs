use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use http::HeaderValue;

pub type AccessToken = String;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenType {
    Bearer,
}

impl TryFrom<&str> for TokenType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Bearer" | "bearer" => Ok(TokenType::Bearer),
            _ => Err(format!("Invalid token type: {value}")),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Bearer => write!(f, "Bearer"),
        }
    }
}

/// Access token used for every Service Manager call of a run.
///
/// It is fetched once and never refreshed. The expiration, when the issuer reports one, is kept
/// for diagnostics only.
#[derive(Clone, PartialEq)]
pub struct Token {
    access_token: AccessToken,
    token_type: TokenType,
    expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(
        access_token: AccessToken,
        token_type: TokenType,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Token {
            access_token,
            token_type,
            expires_at,
        }
    }

    /// Builds a token whose expiration is `expires_in` seconds from now.
    pub fn expiring_in(
        access_token: AccessToken,
        token_type: TokenType,
        expires_in: u64,
    ) -> Result<Self, String> {
        let time_delta =
            TimeDelta::from_std(Duration::from_secs(expires_in)).map_err(|e| e.to_string())?;
        let expires_at = Utc::now()
            .checked_add_signed(time_delta)
            .ok_or_else(|| "Failed to calculate expiration time".to_string())?;

        Ok(Token::new(access_token, token_type, Some(expires_at)))
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Value for the `Authorization` header, marked as sensitive.
    pub fn authorization_header(&self) -> Result<HeaderValue, String> {
        let mut value = HeaderValue::from_str(&format!("{} {}", self.token_type, self.access_token))
            .map_err(|_| "invalid HTTP header value set for Authorization".to_string())?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<hidden>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn authorization_header_is_bearer_and_sensitive() {
        let token = Token::new("some-token".into(), TokenType::Bearer, None);
        let header = token.authorization_header().unwrap();

        assert_eq!(header, "Bearer some-token");
        assert!(header.is_sensitive());
    }

    #[test]
    fn token_type_is_case_tolerant() {
        assert_eq!(TokenType::try_from("bearer"), Ok(TokenType::Bearer));
        assert_eq!(TokenType::try_from("Bearer"), Ok(TokenType::Bearer));
        assert!(TokenType::try_from("mac").is_err());
    }

    #[test]
    fn expiring_in_sets_a_future_expiration() {
        let token = Token::expiring_in("some-token".into(), TokenType::Bearer, 3600).unwrap();
        assert!(token.expires_at().unwrap() > Utc::now());
    }

    #[test]
    fn expiring_in_rejects_out_of_range_durations() {
        let result = Token::expiring_in("some-token".into(), TokenType::Bearer, u64::MAX);
        assert_eq!(
            result.unwrap_err(),
            "Source duration value is out of range for the target type"
        );
    }

    #[test]
    fn debug_output_hides_the_access_token() {
        let token = Token::new("super-secret".into(), TokenType::Bearer, None);
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
