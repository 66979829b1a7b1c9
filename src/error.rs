//! Crate-level error types shared by the context factory, acquisition provider, and pipeline.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The token endpoint did not produce a usable access token.
	#[error(transparent)]
	Acquisition(#[from] AcquisitionError),

	/// No authorization code is available yet; the user agent must visit `authorize_url`.
	///
	/// The web filter in front of the application turns this into an HTTP redirect. The
	/// `state` value has already been preserved on the client context.
	#[error("User authorization is required before a token can be acquired.")]
	UserRedirectRequired {
		/// Fully-formed authorization endpoint URL.
		authorize_url: Url,
		/// Opaque state value that must round-trip via the redirect handler.
		state: String,
	},
	/// The `state` returned with an authorization code is missing or unknown.
	#[error("Authorization state is invalid: {reason}.")]
	InvalidState {
		/// Human-readable reason string.
		reason: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Resource details contain an invalid endpoint URL.
	#[error("Resource details contain an invalid URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Neither the resource details nor the current request provide a redirect URI.
	#[error("No redirect URI is configured and the request carries no current URI.")]
	MissingRedirectUri,
	/// Session scoping was requested without a session identifier.
	#[error("Session-scoped contexts require a session identifier.")]
	MissingSession,
	/// The access token cannot be encoded into an HTTP header.
	#[error("Access token cannot be encoded as an HTTP header value.")]
	InvalidTokenHeader,
	/// Settings could not be turned into resource details.
	#[error(transparent)]
	Settings(#[from] crate::config::SettingsError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token endpoint failures. Never retried; the next outbound call re-attempts acquisition.
#[derive(Debug, ThisError)]
pub enum AcquisitionError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint rejected the request{}.", describe_status(.status))]
	TokenEndpoint {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// OAuth `error` code, when the body carried one.
		oauth_error: Option<String>,
		/// Response body kept for diagnostics.
		body: Option<String>,
	},
	/// Token endpoint responded with JSON that could not be parsed into a token response.
	#[error("Token endpoint returned a malformed token response.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Response body kept for diagnostics.
		body: String,
	},
	/// Token endpoint returned something other than JSON, or nothing at all.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Description produced by the OAuth client.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Content type reported by the token endpoint, when available.
		content_type: Option<String>,
	},
}
impl AcquisitionError {
	/// HTTP status code associated with the failure, if one was observed.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::TokenEndpoint { status, .. }
			| Self::TokenResponseParse { status, .. }
			| Self::UnexpectedResponse { status, .. } => *status,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Which endpoint family was being called.
		target: CallTarget,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// HTTP client reported a failure it could not classify.
	#[error("HTTP client error occurred while calling the token endpoint: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a network error raised while calling the token endpoint.
	pub fn token_endpoint(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: CallTarget::TokenEndpoint, source: Box::new(src) }
	}

	/// Wraps a network error raised while calling a protected resource.
	pub fn resource(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: CallTarget::Resource, source: Box::new(src) }
	}
}

/// Endpoint family a transport failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallTarget {
	/// Authorization server token endpoint.
	TokenEndpoint,
	/// Protected resource reached through the outbound pipeline.
	Resource,
}
impl Display for CallTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::TokenEndpoint => f.write_str("the token endpoint"),
			Self::Resource => f.write_str("the protected resource"),
		}
	}
}

fn describe_status(status: &Option<u16>) -> String {
	status.map(|code| format!(" with HTTP {code}")).unwrap_or_default()
}
