//! Client contexts, the per-request token request they carry, and the factory that scopes them.

pub mod request;
pub mod scoping;

pub use request::*;
pub use scoping::*;

// self
use crate::{_prelude::*, auth::AccessToken, store::ContextStore};

/// Lifetime of the store behind a [`ClientContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
	/// One store per browser session, shared by all of its requests.
	Session,
	/// One store per inbound request, optionally seeded from the principal.
	Request,
}
impl ScopeMode {
	/// Picks the mode for a deployment.
	///
	/// Session-managed single sign-on keeps tokens for the whole session; every other
	/// deployment scopes contexts to the inbound request.
	pub fn for_deployment(sso_enabled: bool) -> Self {
		if sso_enabled { Self::Session } else { Self::Request }
	}

	/// Lowercase label used in logs and metrics.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Session => "session",
			Self::Request => "request",
		}
	}
}
impl Display for ScopeMode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Authorization state for one inbound request.
///
/// Owns the request's [`AccessTokenRequest`] and shares the token slot of its scope's
/// [`ContextStore`].
#[derive(Debug)]
pub struct ClientContext {
	store: Arc<ContextStore>,
	token_request: AccessTokenRequest,
}
impl ClientContext {
	/// Binds `token_request` to `store`.
	pub fn new(store: Arc<ContextStore>, token_request: AccessTokenRequest) -> Self {
		Self { store, token_request }
	}

	/// Scope of the underlying store.
	pub fn mode(&self) -> ScopeMode {
		self.store.mode()
	}

	/// Current access token, if any.
	pub fn access_token(&self) -> Option<Arc<AccessToken>> {
		self.store.access_token()
	}

	/// Stores a token for the whole scope and returns the shared handle.
	pub fn set_access_token(&self, token: AccessToken) -> Arc<AccessToken> {
		self.store.set_access_token(token)
	}

	/// Token request bound to this context.
	pub fn token_request(&self) -> &AccessTokenRequest {
		&self.token_request
	}

	/// Mutable access to the token request, e.g. to record a callback code.
	pub fn token_request_mut(&mut self) -> &mut AccessTokenRequest {
		&mut self.token_request
	}

	/// Store shared by every context of this scope.
	pub fn store(&self) -> &Arc<ContextStore> {
		&self.store
	}
}
