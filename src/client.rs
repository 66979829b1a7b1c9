//! OAuth2-aware outbound HTTP client.
//!
//! Every request sent through [`OAuth2Client::execute`] runs the configured
//! [`RequestInterceptor`]s, is forced to `Accept: application/json`, and carries the context's
//! access token. A missing token is acquired lazily through the shared
//! [`AuthorizationCodeProvider`]. Responses are returned untouched, including `401`s: the client
//! neither refreshes nor retries.

pub mod interceptor;

pub use interceptor::*;

// crates.io
use reqwest::{
	IntoUrl, Method, Request, RequestBuilder, Response,
	header::{AUTHORIZATION, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	context::ClientContext,
	error::{ConfigError, TransportError},
	flows::AuthorizationCodeProvider,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{self, OpKind, OpOutcome, OpSpan},
	provider::AuthenticationScheme,
};

/// Query parameter used by [`AuthenticationScheme::Query`].
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestOAuth2Client = OAuth2Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Outbound client that attaches client-context tokens to protected-resource calls.
pub struct OAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http: ReqwestClient,
	provider: Arc<AuthorizationCodeProvider<C, M>>,
	interceptors: Vec<Arc<dyn RequestInterceptor>>,
}
impl<C, M> OAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that dispatches through `http` and acquires tokens through `provider`.
	pub fn new(http: ReqwestClient, provider: Arc<AuthorizationCodeProvider<C, M>>) -> Self {
		Self { http, provider, interceptors: Vec::new() }
	}

	/// Appends an interceptor; interceptors run in insertion order.
	pub fn with_interceptor(mut self, interceptor: impl 'static + RequestInterceptor) -> Self {
		self.interceptors.push(Arc::new(interceptor));

		self
	}

	pub(crate) fn replace_provider(&mut self, provider: Arc<AuthorizationCodeProvider<C, M>>) {
		self.provider = provider;
	}

	/// Acquisition provider shared with this client.
	pub fn provider(&self) -> &Arc<AuthorizationCodeProvider<C, M>> {
		&self.provider
	}

	/// Starts a request against the underlying reqwest client.
	///
	/// Build it and pass the result to [`OAuth2Client::execute`].
	pub fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
		self.http.request(method, url)
	}

	/// Returns the context's token, acquiring one when absent.
	pub async fn access_token(&self, context: &ClientContext) -> Result<Arc<AccessToken>> {
		match context.access_token() {
			Some(token) => Ok(token),
			None => self.provider.acquire_token(context).await,
		}
	}

	/// Sends `request` with the context's token attached.
	pub async fn execute(&self, request: Request, context: &ClientContext) -> Result<Response> {
		const KIND: OpKind = OpKind::OutboundCall;

		let span = OpSpan::new(KIND, "execute", context.mode());

		obs::record_op_outcome(KIND, context.mode(), OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut request = request;

				for interceptor in &self.interceptors {
					interceptor.intercept(&mut request);
				}

				AcceptJsonInterceptor.intercept(&mut request);

				let token = self.access_token(context).await?;

				attach_token(&mut request, &token, self.provider.details.authentication_scheme)?;

				self.http
					.execute(request)
					.await
					.map_err(|err| Error::from(TransportError::resource(err)))
			})
			.await;

		obs::finish_op(&span, KIND, context.mode(), &result);

		result
	}
}
impl<C, M> Debug for OAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Client")
			.field("provider", &self.provider)
			.field("interceptors", &self.interceptors.len())
			.finish()
	}
}

fn attach_token(
	request: &mut Request,
	token: &AccessToken,
	scheme: AuthenticationScheme,
) -> Result<()> {
	match scheme {
		AuthenticationScheme::Header => {
			let mut value = HeaderValue::from_str(&token.authorization_value())
				.map_err(|_| ConfigError::InvalidTokenHeader)?;

			value.set_sensitive(true);
			request.headers_mut().insert(AUTHORIZATION, value);
		},
		AuthenticationScheme::Query => {
			request.url_mut().query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, token.value.expose());
		},
	}

	Ok(())
}
