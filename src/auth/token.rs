//! Access token values held by client contexts.

// self
use crate::{_prelude::*, auth::ScopeSet};

/// Token type assumed when neither the principal nor the token endpoint names one.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Redacting wrapper for token material.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenValue(String);
impl TokenValue {
	/// Wraps a token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token. Callers must keep it out of logs.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenValue(<redacted>)")
	}
}
impl Display for TokenValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Where an access token came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenOrigin {
	/// Returned by a completed authorization-code grant.
	Granted,
	/// Lifted verbatim from the authenticated principal of the inbound request.
	Principal,
}

/// Errors produced by [`AccessTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AccessTokenBuilderError {
	/// No access token value was provided, or it was empty.
	#[error("Access token value is required.")]
	MissingValue,
}

/// Access token attached to outbound calls.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
	/// Token material; never log it.
	pub value: TokenValue,
	/// Token type reported by the issuer (`bearer` unless stated otherwise).
	pub token_type: String,
	/// Expiry instant, when the issuer reported one.
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes granted with the token (empty when unknown).
	pub scope: ScopeSet,
	/// Refresh token returned alongside the access token, if any.
	pub refresh_token: Option<TokenValue>,
	/// Provenance of the token.
	pub origin: TokenOrigin,
}
impl AccessToken {
	/// Returns a builder for tokens minted by the authorization-code grant.
	pub fn builder(value: impl Into<String>) -> AccessTokenBuilder {
		AccessTokenBuilder::new(value.into())
	}

	/// Builds a bearer token from the value embedded in an authenticated principal.
	///
	/// The value is copied as-is; nothing else is known about it, so it carries no expiry and
	/// no scopes.
	pub fn from_principal(value: impl Into<String>) -> Self {
		Self {
			value: TokenValue::new(value),
			token_type: BEARER_TOKEN_TYPE.into(),
			expires_at: None,
			scope: ScopeSet::default(),
			refresh_token: None,
			origin: TokenOrigin::Principal,
		}
	}

	/// Returns true when the token type is `bearer` (case-insensitive).
	pub fn is_bearer(&self) -> bool {
		self.token_type.eq_ignore_ascii_case(BEARER_TOKEN_TYPE)
	}

	/// Value for the `Authorization` header, e.g. `Bearer abc`.
	pub fn authorization_value(&self) -> String {
		if self.is_bearer() {
			format!("Bearer {}", self.value.expose())
		} else {
			format!("{} {}", self.token_type, self.value.expose())
		}
	}

	/// Returns true if the token carries an expiry that is at or before `instant`.
	///
	/// Expiry is informational: contexts keep using a stored token until their scope ends.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| expires_at <= instant)
	}

	/// Checks expiry against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Remaining lifetime, if an expiry is known; negative once expired.
	pub fn expires_in(&self) -> Option<Duration> {
		self.expires_at.map(|expires_at| expires_at - OffsetDateTime::now_utc())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("value", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_at", &self.expires_at)
			.field("scope", &self.scope)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("origin", &self.origin)
			.finish()
	}
}

/// Builder for granted [`AccessToken`]s.
#[derive(Clone, Debug)]
pub struct AccessTokenBuilder {
	value: TokenValue,
	token_type: Option<String>,
	scope: ScopeSet,
	refresh_token: Option<TokenValue>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl AccessTokenBuilder {
	fn new(value: String) -> Self {
		Self {
			value: TokenValue::new(value),
			token_type: None,
			scope: ScopeSet::default(),
			refresh_token: None,
			issued_at: None,
			expires_at: None,
			expires_in: None,
		}
	}

	/// Sets the token type reported by the issuer.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the granted scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenValue::new(token));

		self
	}

	/// Sets the instant `expires_in` is measured from (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a granted [`AccessToken`].
	pub fn build(self) -> Result<AccessToken, AccessTokenBuilderError> {
		if self.value.expose().is_empty() {
			return Err(AccessTokenBuilderError::MissingValue);
		}

		// Lifetimes past the representable range are treated as non-expiring.
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => Some(instant),
			(None, Some(delta)) =>
				self.issued_at.unwrap_or_else(OffsetDateTime::now_utc).checked_add(delta),
			(None, None) => None,
		};

		Ok(AccessToken {
			value: self.value,
			token_type: self.token_type.unwrap_or_else(|| BEARER_TOKEN_TYPE.into()),
			expires_at,
			scope: self.scope,
			refresh_token: self.refresh_token,
			origin: TokenOrigin::Granted,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn principal_tokens_are_bearer_without_expiry() {
		let token = AccessToken::from_principal("xyz");

		assert_eq!(token.value.expose(), "xyz");
		assert_eq!(token.origin, TokenOrigin::Principal);
		assert!(token.is_bearer());
		assert!(!token.is_expired());
		assert_eq!(token.expires_in(), None);
		assert_eq!(token.authorization_value(), "Bearer xyz");
	}

	#[test]
	fn builder_handles_relative_expiry() {
		let token = AccessToken::builder("abc")
			.token_type("Bearer")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::minutes(30))
			.build()
			.expect("Token builder should support relative expiry.");

		assert_eq!(token.expires_at, Some(macros::datetime!(2025-01-01 00:30 UTC)));
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 00:30 UTC)));
		assert!(!token.is_expired_at(macros::datetime!(2025-01-01 00:29 UTC)));
		assert_eq!(token.origin, TokenOrigin::Granted);
	}

	#[test]
	fn builder_rejects_empty_values() {
		assert_eq!(AccessToken::builder("").build(), Err(AccessTokenBuilderError::MissingValue));
	}

	#[test]
	fn non_bearer_types_keep_their_scheme() {
		let token = AccessToken::builder("mac-value")
			.token_type("MAC")
			.build()
			.expect("Token builder should accept custom token types.");

		assert_eq!(token.authorization_value(), "MAC mac-value");
	}

	#[test]
	fn formatters_redact_secrets() {
		let token = AccessToken::builder("super-secret")
			.refresh_token("refresh-secret")
			.build()
			.expect("Token builder should succeed.");
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("super-secret"));
		assert!(!rendered.contains("refresh-secret"));
		assert_eq!(format!("{}", token.value), "<redacted>");
	}
}
