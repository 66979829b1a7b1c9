//! Protected-resource details shared by the acquisition provider and the outbound pipeline.

/// Builder API for assembling resource details.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, ScopeSet, TokenValue},
};

/// How the client authenticates itself at the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthenticationScheme {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	Header,
	/// `client_id`/`client_secret` as form parameters.
	Form,
	/// Public client; only `client_id` is sent.
	None,
}

/// How access tokens are attached to outbound resource requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationScheme {
	#[default]
	/// `Authorization: Bearer <token>` header.
	Header,
	/// `access_token` query parameter.
	Query,
}

/// Authorization server endpoints used by the authorization-code grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceEndpoints {
	/// Endpoint the user agent is redirected to for consent.
	pub authorization: Url,
	/// Endpoint codes are exchanged at.
	pub token: Url,
}

/// Immutable client registration and endpoint description, loaded once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceDetails {
	/// Registered client identifier.
	pub client_id: ClientId,
	/// Client secret for confidential clients.
	pub client_secret: Option<TokenValue>,
	/// Authorization server endpoints.
	pub endpoints: ResourceEndpoints,
	/// Pre-established redirect URI; when absent the current request URI is used.
	pub redirect_uri: Option<Url>,
	/// Scopes requested during authorization, in configured order.
	pub scope: ScopeSet,
	/// Client authentication at the token endpoint.
	pub client_authentication_scheme: ClientAuthenticationScheme,
	/// Token placement on outbound resource requests.
	pub authentication_scheme: AuthenticationScheme,
}
impl ResourceDetails {
	/// Creates a new builder for the provided client identifier.
	pub fn builder(client_id: ClientId) -> ResourceDetailsBuilder {
		ResourceDetailsBuilder::new(client_id)
	}

	/// Client secret as a plain string, if any.
	pub fn client_secret(&self) -> Option<&str> {
		self.client_secret.as_ref().map(TokenValue::expose)
	}
}
