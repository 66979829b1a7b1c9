//! Inbound authentication principals as seen by the client context factory.
//!
//! The upstream security layer owns authentication. This crate only reads the principal to find
//! out whether a resource-server filter already accepted an OAuth 2.0 bearer token for the
//! current request, in which case that token can be relayed instead of starting a new grant.

// self
use crate::_prelude::*;

/// Details attached by an upstream OAuth 2.0 resource-server filter.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OAuth2Details {
	/// Raw token value the inbound request was authenticated with.
	pub token_value: Option<String>,
	/// Remote address of the caller, when recorded.
	pub remote_address: Option<String>,
}
impl OAuth2Details {
	/// Details carrying the inbound token value.
	pub fn with_token(token_value: impl Into<String>) -> Self {
		Self { token_value: Some(token_value.into()), remote_address: None }
	}
}
impl Debug for OAuth2Details {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Details")
			.field("token_value", &self.token_value.as_ref().map(|_| "<redacted>"))
			.field("remote_address", &self.remote_address)
			.finish()
	}
}

/// Currently authenticated user of the inbound request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Principal {
	/// No authentication on the request.
	#[default]
	Anonymous,
	/// Authenticated through OAuth 2.0; `details` is absent when the upstream layer recorded none.
	OAuth2 {
		/// Principal name.
		name: String,
		/// Request details recorded by the upstream filter.
		details: Option<OAuth2Details>,
	},
	/// Authenticated through some other scheme (form login, basic auth, ...).
	Other {
		/// Principal name.
		name: String,
		/// Label of the authentication scheme.
		scheme: String,
	},
}
impl Principal {
	/// OAuth 2.0 principal carrying the token it was authenticated with.
	pub fn oauth2_with_token(name: impl Into<String>, token_value: impl Into<String>) -> Self {
		Self::OAuth2 { name: name.into(), details: Some(OAuth2Details::with_token(token_value)) }
	}

	/// Principal name, if authenticated.
	pub fn name(&self) -> Option<&str> {
		match self {
			Self::Anonymous => None,
			Self::OAuth2 { name, .. } | Self::Other { name, .. } => Some(name),
		}
	}

	/// Token value embedded by an upstream OAuth 2.0 layer.
	///
	/// Anything other than an OAuth 2.0 principal with a non-empty token value yields `None`.
	pub fn embedded_token(&self) -> Option<&str> {
		match self {
			Self::OAuth2 { details: Some(details), .. } =>
				details.token_value.as_deref().filter(|value| !value.is_empty()),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_oauth2_principals_embed_tokens() {
		assert_eq!(Principal::oauth2_with_token("alice", "xyz").embedded_token(), Some("xyz"));
		assert_eq!(Principal::Anonymous.embedded_token(), None);
		assert_eq!(
			Principal::Other { name: "bob".into(), scheme: "form".into() }.embedded_token(),
			None
		);
		assert_eq!(Principal::OAuth2 { name: "carol".into(), details: None }.embedded_token(), None);
	}

	#[test]
	fn empty_token_values_are_ignored() {
		let principal = Principal::OAuth2 {
			name: "dave".into(),
			details: Some(OAuth2Details::with_token("")),
		};

		assert_eq!(principal.embedded_token(), None);
		assert_eq!(principal.name(), Some("dave"));
	}

	#[test]
	fn debug_output_redacts_tokens() {
		let rendered = format!("{:?}", Principal::oauth2_with_token("alice", "secret-token"));

		assert!(!rendered.contains("secret-token"));
	}
}
