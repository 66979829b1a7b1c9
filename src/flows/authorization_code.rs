//! Lazy authorization-code acquisition for a [`ClientContext`].
//!
//! [`AuthorizationCodeProvider::acquire_token`] is the single entry point. When the context
//! already holds a token it is returned as-is. Otherwise the provider either asks the caller to
//! redirect the user agent (no authorization code yet) or exchanges the callback code at the
//! token endpoint. Exchanges for one store are serialized by the store's acquisition lock, and
//! the token slot is re-checked once the lock is held so concurrent requests of one session hit
//! the token endpoint only once.

// crates.io
use oauth2::http::HeaderMap;
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	context::{AccessTokenRequest, ClientContext},
	error::ConfigError,
	flows::AuthorizationCodeProvider,
	http::TokenHttpClient,
	oauth::{BasicFacade, CodeExchange, TransportErrorMapper},
	obs::{self, OpKind, OpOutcome, OpSpan},
	provider::{AcceptJsonEnhancer, ResourceDetails, TokenRequestEnhancer},
};

const STATE_LEN: usize = 32;

impl<C, M> AuthorizationCodeProvider<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns the context's token, performing the authorization-code grant when none is held.
	///
	/// # Errors
	///
	/// - [`Error::UserRedirectRequired`] when the request carries no authorization code; the
	///   generated `state` has been preserved on the context store.
	/// - [`Error::InvalidState`] when a code arrives without a matching preserved `state`.
	/// - [`Error::Acquisition`] or [`Error::Transport`] when the exchange fails. Nothing is
	///   cached; the next call tries again.
	pub async fn acquire_token(&self, context: &ClientContext) -> Result<Arc<AccessToken>> {
		const KIND: OpKind = OpKind::AcquireToken;

		if let Some(token) = context.access_token() {
			return Ok(token);
		}

		let span = OpSpan::new(KIND, "acquire_token", context.mode());

		obs::record_op_outcome(KIND, context.mode(), OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = context.store().lock_acquisition().await;

				if let Some(token) = context.access_token() {
					obs::op_event!("Token acquired by a concurrent request.");

					return Ok(token);
				}

				let request = context.token_request();
				let Some(code) = request.authorization_code() else {
					return Err(self.redirect_required(context)?);
				};
				let redirect_uri = self.consume_state(context)?;

				self.metrics.record_attempt();

				match self.exchange(request, code, &redirect_uri).await {
					Ok(token) => {
						self.metrics.record_success();

						Ok(context.set_access_token(token))
					},
					Err(err) => {
						self.metrics.record_failure();

						Err(err)
					},
				}
			})
			.await;

		obs::finish_op(&span, KIND, context.mode(), &result);

		result
	}

	/// Builds the redirect signal and preserves its `state` on the context store.
	fn redirect_required(&self, context: &ClientContext) -> Result<Error> {
		let redirect_uri = resolve_redirect_uri(&self.details, context.token_request())?;
		let state = random_string(STATE_LEN);
		let authorize_url = build_authorize_url(&self.details, &redirect_uri, &state);

		context.store().preserve_state(state.clone(), redirect_uri);

		Ok(Error::UserRedirectRequired { authorize_url, state })
	}

	/// Checks the callback `state` and returns the redirect URI to exchange the code with.
	fn consume_state(&self, context: &ClientContext) -> Result<Url> {
		let request = context.token_request();
		let preserved =
			request.state().and_then(|state| context.store().take_preserved_state(state));

		match (preserved, request.state()) {
			(Some(redirect_uri), _) => Ok(redirect_uri),
			(None, _) if !self.state_mandatory => resolve_redirect_uri(&self.details, request),
			(None, None) => Err(Error::InvalidState {
				reason: "the callback carries no state parameter".into(),
			}),
			(None, Some(_)) => Err(Error::InvalidState {
				reason: "the callback state does not match a pending authorization".into(),
			}),
		}
	}

	async fn exchange(
		&self,
		request: &AccessTokenRequest,
		code: &str,
		redirect_uri: &Url,
	) -> Result<AccessToken> {
		let facade = BasicFacade::from_details(
			&self.details,
			self.http_client.clone(),
			self.transport_mapper.clone(),
		)?;
		let mut form = BTreeMap::new();
		let mut headers = HeaderMap::new();

		for enhancer in &self.enhancers {
			enhancer.enhance(request, &self.details, &mut form, &mut headers);
		}

		AcceptJsonEnhancer.enhance(request, &self.details, &mut form, &mut headers);

		facade
			.exchange_authorization_code(CodeExchange {
				code,
				redirect_uri,
				requested_scope: &self.details.scope,
				form: &form,
				headers,
			})
			.await
	}
}

/// Configured redirect URI, else the current request URI without query or fragment.
fn resolve_redirect_uri(details: &ResourceDetails, request: &AccessTokenRequest) -> Result<Url> {
	if let Some(redirect_uri) = &details.redirect_uri {
		return Ok(redirect_uri.clone());
	}

	let mut current = request.current_uri().cloned().ok_or(ConfigError::MissingRedirectUri)?;

	current.set_query(None);
	current.set_fragment(None);

	Ok(current)
}

fn build_authorize_url(details: &ResourceDetails, redirect_uri: &Url, state: &str) -> Url {
	let mut url = details.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", &details.client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());

	if !details.scope.is_empty() {
		pairs.append_pair("scope", &details.scope.joined());
	}

	pairs.append_pair("state", state);

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
