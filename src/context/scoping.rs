//! Context resolution: session reuse or request-local creation with principal seeding.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Principal, SessionId},
	context::{AccessTokenRequest, ClientContext, ScopeMode},
	error::ConfigError,
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::{ContextStore, MemorySessionStore, SessionStore},
};

/// Produces [`ClientContext`] values for inbound requests.
///
/// The mode is fixed when the factory is built and applies to every call.
#[derive(Clone)]
pub struct ContextFactory {
	mode: ScopeMode,
	sessions: Arc<dyn SessionStore>,
}
impl ContextFactory {
	/// Creates a factory backed by an in-memory session registry.
	pub fn new(mode: ScopeMode) -> Self {
		Self::with_session_store(mode, Arc::new(MemorySessionStore::default()))
	}

	/// Creates a factory backed by a caller-provided session registry.
	pub fn with_session_store(mode: ScopeMode, sessions: Arc<dyn SessionStore>) -> Self {
		Self { mode, sessions }
	}

	/// Mode applied to every resolved context.
	pub fn mode(&self) -> ScopeMode {
		self.mode
	}

	/// Resolves the context for one inbound request.
	///
	/// In session mode the store bound to `session` is reused (or created) and `principal` is
	/// ignored. In request mode a fresh store is created and, when `principal` carries an embedded
	/// token, seeded with it without any network call.
	pub fn resolve_context(
		&self,
		session: Option<&SessionId>,
		token_request: AccessTokenRequest,
		principal: &Principal,
	) -> Result<ClientContext> {
		const KIND: OpKind = OpKind::ResolveContext;

		let span = OpSpan::new(KIND, "resolve_context", self.mode);
		let _guard = span.entered();

		obs::record_op_outcome(KIND, self.mode, OpOutcome::Attempt);

		let result = self.resolve_store(session, principal).map(|store| {
			ClientContext::new(store, token_request)
		});

		obs::finish_op(&span, KIND, self.mode, &result);

		result
	}

	/// Discards the store of an ended session. Returns true if one existed.
	pub fn end_session(&self, session: &SessionId) -> bool {
		self.sessions.remove(session).is_some()
	}

	fn resolve_store(
		&self,
		session: Option<&SessionId>,
		principal: &Principal,
	) -> Result<Arc<ContextStore>> {
		match self.mode {
			ScopeMode::Session => {
				let session = session.ok_or(ConfigError::MissingSession)?;

				obs::op_event!(mode = "session", "Reusing session context store.");

				Ok(self.sessions.get_or_create(session))
			},
			ScopeMode::Request => {
				let store = match principal.embedded_token() {
					Some(token) => {
						obs::op_event!(mode = "request", "Seeding context from principal token.");

						ContextStore::seeded(ScopeMode::Request, AccessToken::from_principal(token))
					},
					None => ContextStore::new(ScopeMode::Request),
				};

				Ok(Arc::new(store))
			},
		}
	}
}
impl Debug for ContextFactory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ContextFactory").field("mode", &self.mode).finish_non_exhaustive()
	}
}
