//! Client settings as loaded from application configuration.
//!
//! Settings use camelCase keys (`clientId`, `accessTokenUri`, ...). A missing or empty
//! `clientId` disables the subsystem; [`ClientSettings::into_details`] then yields `None`.

// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	auth::{ClientId, IdentifierError, ScopeSet, ScopeValidationError},
	provider::{
		AuthenticationScheme, ClientAuthenticationScheme, ResourceDetails, ResourceDetailsError,
	},
};

/// Errors raised while loading or validating [`ClientSettings`].
#[derive(Debug, ThisError)]
pub enum SettingsError {
	/// The settings document could not be deserialized.
	#[error("Client settings are malformed at `{path}`.")]
	Malformed {
		/// Path of the offending field.
		path: String,
		/// Underlying JSON error.
		#[source]
		source: serde_json::Error,
	},
	/// `clientId` failed validation.
	#[error("Client identifier is invalid.")]
	ClientId(#[from] IdentifierError),
	/// A URL-valued field does not parse.
	#[error("The `{field}` setting is not a valid URL.")]
	InvalidUrl {
		/// Name of the offending field.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// `scope` contains an invalid entry.
	#[error("Scope setting is invalid.")]
	Scope(#[from] ScopeValidationError),
	/// Endpoints or authentication settings are inconsistent.
	#[error(transparent)]
	Details(#[from] ResourceDetailsError),
}

/// Raw client registration settings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
	/// Registered client identifier; empty or absent disables the subsystem.
	pub client_id: Option<String>,
	/// Client secret.
	pub client_secret: Option<String>,
	/// Token endpoint URL.
	pub access_token_uri: Option<String>,
	/// Authorization endpoint URL.
	pub user_authorization_uri: Option<String>,
	/// Pre-established redirect URI.
	pub redirect_uri: Option<String>,
	/// Requested scopes, as a list or a comma/space separated string.
	#[serde(deserialize_with = "deserialize_scope")]
	pub scope: Vec<String>,
	/// Client authentication at the token endpoint.
	pub client_authentication_scheme: ClientAuthenticationScheme,
	/// Token placement on outbound resource requests.
	pub authentication_scheme: AuthenticationScheme,
}
impl ClientSettings {
	/// Parses settings from a JSON document, reporting the path of any malformed field.
	pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
		let deserializer = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(deserializer).map_err(|err| SettingsError::Malformed {
			path: err.path().to_string(),
			source: err.into_inner(),
		})
	}

	/// Returns true when a non-empty client identifier is configured.
	pub fn is_enabled(&self) -> bool {
		self.client_id.as_deref().is_some_and(|id| !id.trim().is_empty())
	}

	/// Validates the settings into [`ResourceDetails`].
	///
	/// Returns `Ok(None)` when the subsystem is disabled.
	pub fn into_details(self) -> Result<Option<ResourceDetails>, SettingsError> {
		if !self.is_enabled() {
			return Ok(None);
		}

		let client_id = ClientId::new(self.client_id.as_deref().unwrap_or_default().trim())?;
		let mut builder = ResourceDetails::builder(client_id)
			.scope(ScopeSet::new(self.scope)?)
			.client_authentication_scheme(self.client_authentication_scheme)
			.authentication_scheme(self.authentication_scheme);

		if let Some(secret) = non_empty(self.client_secret) {
			builder = builder.client_secret(secret);
		}
		if let Some(url) = parse_url("userAuthorizationUri", self.user_authorization_uri)? {
			builder = builder.authorization_endpoint(url);
		}
		if let Some(url) = parse_url("accessTokenUri", self.access_token_uri)? {
			builder = builder.token_endpoint(url);
		}
		if let Some(url) = parse_url("redirectUri", self.redirect_uri)? {
			builder = builder.redirect_uri(url);
		}

		Ok(Some(builder.build()?))
	}
}
impl Debug for ClientSettings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientSettings")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
			.field("access_token_uri", &self.access_token_uri)
			.field("user_authorization_uri", &self.user_authorization_uri)
			.field("redirect_uri", &self.redirect_uri)
			.field("scope", &self.scope)
			.field("client_authentication_scheme", &self.client_authentication_scheme)
			.field("authentication_scheme", &self.authentication_scheme)
			.finish()
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.trim().is_empty())
}

fn parse_url(field: &'static str, value: Option<String>) -> Result<Option<Url>, SettingsError> {
	non_empty(value)
		.map(|raw| Url::parse(raw.trim()).map_err(|source| SettingsError::InvalidUrl { field, source }))
		.transpose()
}

fn deserialize_scope<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum ScopeInput {
		List(Vec<String>),
		Joined(String),
	}

	Ok(match Option::<ScopeInput>::deserialize(deserializer)? {
		Some(ScopeInput::List(list)) => list,
		Some(ScopeInput::Joined(joined)) => joined
			.split(|c: char| c == ',' || c.is_whitespace())
			.filter(|scope| !scope.is_empty())
			.map(ToOwned::to_owned)
			.collect(),
		None => Vec::new(),
	})
}
