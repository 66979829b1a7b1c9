//! Token acquisition for client contexts that hold no token yet.

pub mod authorization_code;

mod metrics;

pub use metrics::AcquisitionMetrics;

// self
use crate::{
	_prelude::*,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	provider::{ResourceDetails, TokenRequestEnhancer},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Provider specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenProvider = AuthorizationCodeProvider<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Performs the authorization-code grant against one protected resource.
///
/// The provider owns the token endpoint transport, the immutable [`ResourceDetails`], and the
/// enhancer chain applied to every token request. Per-scope state (tokens, preserved
/// `state` values, the acquisition lock) lives in the context store it is handed.
#[derive(Clone)]
pub struct AuthorizationCodeProvider<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every token endpoint request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Client registration and endpoints.
	pub details: Arc<ResourceDetails>,
	/// Counters for token endpoint exchanges.
	pub metrics: Arc<AcquisitionMetrics>,
	enhancers: Vec<Arc<dyn TokenRequestEnhancer>>,
	state_mandatory: bool,
}
impl<C, M> AuthorizationCodeProvider<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a provider that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		details: impl Into<Arc<ResourceDetails>>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			details: details.into(),
			metrics: Default::default(),
			enhancers: Vec::new(),
			state_mandatory: true,
		}
	}

	/// Appends a token request enhancer.
	///
	/// Custom enhancers run in insertion order, before the built-in JSON `Accept` enhancer.
	pub fn with_enhancer(mut self, enhancer: impl 'static + TokenRequestEnhancer) -> Self {
		self.enhancers.push(Arc::new(enhancer));

		self
	}

	/// Controls whether a callback must echo a preserved `state` (defaults to `true`).
	pub fn with_state_mandatory(mut self, mandatory: bool) -> Self {
		self.state_mandatory = mandatory;

		self
	}

	/// Returns true when callbacks must carry a preserved `state`.
	pub fn state_mandatory(&self) -> bool {
		self.state_mandatory
	}
}
#[cfg(feature = "reqwest")]
impl AuthorizationCodeProvider<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a provider with its own reqwest-backed transport.
	pub fn new(details: impl Into<Arc<ResourceDetails>>) -> Self {
		Self::with_http_client(
			details,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for AuthorizationCodeProvider<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationCodeProvider")
			.field("details", &self.details)
			.field("enhancers", &self.enhancers.len())
			.field("state_mandatory", &self.state_mandatory)
			.field("metrics", &self.metrics)
			.finish()
	}
}
