// self
use crate::{
	_prelude::*,
	auth::{ClientId, ScopeSet, TokenValue},
	provider::{AuthenticationScheme, ClientAuthenticationScheme, ResourceDetails, ResourceEndpoints},
};

/// Errors raised while constructing or validating resource details.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ResourceDetailsError {
	/// Authorization endpoint is required to start the grant.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required to exchange codes.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Endpoints must be HTTP(S) URLs.
	#[error("The {endpoint} URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which URL failed validation.
		endpoint: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// Confidential authentication schemes need a secret.
	#[error("The {scheme:?} client authentication scheme requires a client secret.")]
	MissingClientSecret {
		/// Scheme that was configured.
		scheme: ClientAuthenticationScheme,
	},
}

/// Builder for [`ResourceDetails`] values.
#[derive(Debug)]
pub struct ResourceDetailsBuilder {
	client_id: ClientId,
	client_secret: Option<TokenValue>,
	authorization_endpoint: Option<Url>,
	token_endpoint: Option<Url>,
	redirect_uri: Option<Url>,
	scope: ScopeSet,
	client_authentication_scheme: ClientAuthenticationScheme,
	authentication_scheme: AuthenticationScheme,
}
impl ResourceDetailsBuilder {
	/// Creates a new builder seeded with the provided client identifier.
	pub fn new(client_id: ClientId) -> Self {
		Self {
			client_id,
			client_secret: None,
			authorization_endpoint: None,
			token_endpoint: None,
			redirect_uri: None,
			scope: ScopeSet::default(),
			client_authentication_scheme: ClientAuthenticationScheme::default(),
			authentication_scheme: AuthenticationScheme::default(),
		}
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenValue::new(secret));

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Pins the redirect URI instead of deriving it from the current request.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Sets the requested scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Overrides how the client authenticates at the token endpoint.
	pub fn client_authentication_scheme(mut self, scheme: ClientAuthenticationScheme) -> Self {
		self.client_authentication_scheme = scheme;

		self
	}

	/// Overrides how tokens are attached to outbound requests.
	pub fn authentication_scheme(mut self, scheme: AuthenticationScheme) -> Self {
		self.authentication_scheme = scheme;

		self
	}

	/// Consumes the builder and validates the resulting details.
	pub fn build(self) -> Result<ResourceDetails, ResourceDetailsError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ResourceDetailsError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ResourceDetailsError::MissingTokenEndpoint)?;

		validate_url("authorization", &authorization)?;
		validate_url("token", &token)?;

		if let Some(redirect) = self.redirect_uri.as_ref() {
			validate_url("redirect", redirect)?;
		}
		if self.client_secret.is_none()
			&& !matches!(self.client_authentication_scheme, ClientAuthenticationScheme::None)
		{
			return Err(ResourceDetailsError::MissingClientSecret {
				scheme: self.client_authentication_scheme,
			});
		}

		Ok(ResourceDetails {
			client_id: self.client_id,
			client_secret: self.client_secret,
			endpoints: ResourceEndpoints { authorization, token },
			redirect_uri: self.redirect_uri,
			scope: self.scope,
			client_authentication_scheme: self.client_authentication_scheme,
			authentication_scheme: self.authentication_scheme,
		})
	}
}

fn validate_url(name: &'static str, url: &Url) -> Result<(), ResourceDetailsError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ResourceDetailsError::UnsupportedScheme { endpoint: name, url: url.to_string() }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse fixture URL.")
	}

	fn builder() -> ResourceDetailsBuilder {
		ResourceDetails::builder(ClientId::new("web-app").expect("Client fixture should be valid."))
			.client_secret("s3cret")
			.authorization_endpoint(url("https://auth.example.com/oauth/authorize"))
			.token_endpoint(url("https://auth.example.com/oauth/token"))
	}

	#[test]
	fn builds_with_defaults() {
		let details = builder().build().expect("Resource details should build.");

		assert_eq!(details.client_authentication_scheme, ClientAuthenticationScheme::Header);
		assert_eq!(details.authentication_scheme, AuthenticationScheme::Header);
		assert_eq!(details.client_secret(), Some("s3cret"));
		assert!(details.redirect_uri.is_none());
		assert!(details.scope.is_empty());
	}

	#[test]
	fn rejects_missing_endpoints_and_schemes() {
		let err = ResourceDetails::builder(ClientId::new("c").expect("Client should be valid."))
			.token_endpoint(url("https://auth.example.com/token"))
			.build()
			.expect_err("Authorization endpoint is required.");

		assert_eq!(err, ResourceDetailsError::MissingAuthorizationEndpoint);

		let err = builder()
			.redirect_uri(url("ftp://app.example.com/callback"))
			.build()
			.expect_err("Non-HTTP redirect URIs must be rejected.");

		assert!(matches!(err, ResourceDetailsError::UnsupportedScheme { endpoint: "redirect", .. }));
	}

	#[test]
	fn confidential_schemes_require_secrets() {
		let public = ResourceDetails::builder(ClientId::new("spa").expect("Client should be valid."))
			.authorization_endpoint(url("https://auth.example.com/authorize"))
			.token_endpoint(url("https://auth.example.com/token"));
		let err = public
			.build()
			.expect_err("Header authentication without a secret must be rejected.");

		assert_eq!(
			err,
			ResourceDetailsError::MissingClientSecret { scheme: ClientAuthenticationScheme::Header }
		);

		let public = ResourceDetails::builder(ClientId::new("spa").expect("Client should be valid."))
			.authorization_endpoint(url("https://auth.example.com/authorize"))
			.token_endpoint(url("https://auth.example.com/token"))
			.client_authentication_scheme(ClientAuthenticationScheme::None)
			.build()
			.expect("Public clients do not need a secret.");

		assert!(public.client_secret().is_none());
	}
}
