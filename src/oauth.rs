//! Internal OAuth client facade over the `oauth2` crate.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
	http::HeaderMap,
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	error::{AcquisitionError, ConfigError, TransportError},
	http::{EnhancedHandle, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{ClientAuthenticationScheme, ResourceDetails},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { message }.into(),
			_ => TransportError::Other { message: "Unclassified HTTP client failure".into() }
				.into(),
		}
	}
}

/// One authorization-code exchange, fully resolved by the provider.
pub(crate) struct CodeExchange<'a> {
	pub(crate) code: &'a str,
	pub(crate) redirect_uri: &'a Url,
	pub(crate) requested_scope: &'a ScopeSet,
	pub(crate) form: &'a BTreeMap<String, String>,
	pub(crate) headers: HeaderMap,
}

pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_details(
		details: &ResourceDetails,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(details.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(details.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(details.client_id.to_string()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		match details.client_authentication_scheme {
			ClientAuthenticationScheme::Header | ClientAuthenticationScheme::Form => {
				if let Some(secret) = details.client_secret() {
					oauth_client =
						oauth_client.set_client_secret(ClientSecret::new(secret.to_owned()));
				}
			},
			// Without a secret `oauth2` sends `client_id` in the form body.
			ClientAuthenticationScheme::None => {},
		}

		if matches!(details.client_authentication_scheme, ClientAuthenticationScheme::Form) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	pub(crate) async fn exchange_authorization_code(
		&self,
		exchange: CodeExchange<'_>,
	) -> Result<AccessToken> {
		let meta = ResponseMetadataSlot::default();
		let handle = EnhancedHandle::new(self.http_client.with_metadata(meta.clone()), exchange.headers);
		let redirect_url = RedirectUrl::new(exchange.redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut request = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(exchange.code.to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_url));

		for (key, value) in exchange.form {
			if !is_reserved_param(key) {
				request = request.add_extra_param(key, value);
			}
		}

		let response = request
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;

		map_token_response(exchange.requested_scope, response, meta.take())
	}
}

/// Parameters owned by the grant itself; enhancers cannot override them.
fn is_reserved_param(name: &str) -> bool {
	matches!(name, "grant_type" | "code" | "redirect_uri" | "client_id" | "client_secret")
}

fn map_token_response(
	requested_scope: &ScopeSet,
	response: BasicTokenResponse,
	meta: Option<ResponseMetadata>,
) -> Result<AccessToken> {
	let granted_scope = response
		.scopes()
		.and_then(|scopes| ScopeSet::new(scopes.iter().map(|scope| scope.to_string())).ok())
		.unwrap_or_else(|| requested_scope.clone());
	let mut builder = AccessToken::builder(response.access_token().secret().to_owned())
		.token_type(response.token_type().as_ref())
		.scope(granted_scope);

	if let Some(expires_in) = response.expires_in() {
		let seconds = i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX);

		builder = builder.issued_at(OffsetDateTime::now_utc()).expires_in(Duration::seconds(seconds));
	}
	if let Some(refresh) = response.refresh_token() {
		builder = builder.refresh_token(refresh.secret().to_owned());
	}

	builder.build().map_err(|err| {
		AcquisitionError::UnexpectedResponse {
			message: err.to_string(),
			status: meta_status(meta.as_ref()),
			content_type: meta_content_type(meta.as_ref()),
		}
		.into()
	})
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();
	let status = meta_status(meta_ref);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(status, response),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		// Non-2xx responses whose body is not an OAuth error document still count as rejections.
		RequestTokenError::Parse(_, body) if is_error_status(status) =>
			AcquisitionError::TokenEndpoint {
				status,
				oauth_error: None,
				body: Some(String::from_utf8_lossy(&body).into_owned()),
			}
			.into(),
		RequestTokenError::Parse(source, body) => AcquisitionError::TokenResponseParse {
			source,
			status,
			body: String::from_utf8_lossy(&body).into_owned(),
		}
		.into(),
		RequestTokenError::Other(_) if is_error_status(status) =>
			AcquisitionError::TokenEndpoint { status, oauth_error: None, body: None }.into(),
		RequestTokenError::Other(message) => AcquisitionError::UnexpectedResponse {
			message,
			status,
			content_type: meta_content_type(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(status: Option<u16>, response: BasicErrorResponse) -> Error {
	AcquisitionError::TokenEndpoint {
		status,
		oauth_error: Some(response.error().as_ref().to_owned()),
		body: serde_json::to_string(&response).ok(),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::token_endpoint(err).into()
}

fn is_error_status(status: Option<u16>) -> bool {
	status.is_some_and(|code| !(200..300).contains(&code))
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_content_type(meta: Option<&ResponseMetadata>) -> Option<String> {
	meta.and_then(|value| value.content_type.clone())
}
