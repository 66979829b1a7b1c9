//! Per-scope context stores and the session registry that keeps them alive.

pub mod memory;

pub use memory::MemorySessionStore;

// std
use std::collections::VecDeque;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, SessionId},
	context::ScopeMode,
};

/// Redirects a store keeps awaiting their callback; older ones are forgotten first.
pub const MAX_PENDING_STATES: usize = 8;

/// State shared by every [`ClientContext`](crate::context::ClientContext) of one scope.
///
/// A session-scoped store is handed out to every request of that session; a request-scoped
/// store belongs to exactly one context. The token slot only ever moves from empty to present.
#[derive(Debug)]
pub struct ContextStore {
	mode: ScopeMode,
	token: RwLock<Option<Arc<AccessToken>>>,
	preserved_states: Mutex<VecDeque<(String, Url)>>,
	acquisition: AsyncMutex<()>,
}
impl ContextStore {
	/// Creates an empty store for the given scope.
	pub fn new(mode: ScopeMode) -> Self {
		Self {
			mode,
			token: RwLock::new(None),
			preserved_states: Mutex::new(VecDeque::new()),
			acquisition: AsyncMutex::new(()),
		}
	}

	/// Creates a store that already holds `token`.
	pub fn seeded(mode: ScopeMode, token: AccessToken) -> Self {
		let store = Self::new(mode);

		*store.token.write() = Some(Arc::new(token));

		store
	}

	/// Scope this store was created for.
	pub fn mode(&self) -> ScopeMode {
		self.mode
	}

	/// Current access token, if one was seeded or acquired.
	pub fn access_token(&self) -> Option<Arc<AccessToken>> {
		self.token.read().clone()
	}

	/// Stores `token` and returns the shared handle every context of this scope will observe.
	pub fn set_access_token(&self, token: AccessToken) -> Arc<AccessToken> {
		let token = Arc::new(token);

		*self.token.write() = Some(token.clone());

		token
	}

	/// Remembers the redirect URI sent along with `state`.
	///
	/// At most [`MAX_PENDING_STATES`] redirects are tracked; the oldest is evicted to make room,
	/// so its callback will be rejected.
	pub fn preserve_state(&self, state: impl Into<String>, redirect_uri: Url) {
		let state = state.into();
		let mut pending = self.preserved_states.lock();

		pending.retain(|(existing, _)| *existing != state);

		while pending.len() >= MAX_PENDING_STATES {
			pending.pop_front();
		}

		pending.push_back((state, redirect_uri));
	}

	/// Consumes the redirect URI preserved for `state`.
	///
	/// Each state is accepted at most once.
	pub fn take_preserved_state(&self, state: &str) -> Option<Url> {
		let mut pending = self.preserved_states.lock();
		let index = pending.iter().position(|(existing, _)| existing == state)?;

		pending.remove(index).map(|(_, redirect_uri)| redirect_uri)
	}

	/// Number of redirects still awaiting their callback.
	pub fn pending_states(&self) -> usize {
		self.preserved_states.lock().len()
	}

	/// Serializes token acquisition for this store.
	///
	/// Holders must re-check [`ContextStore::access_token`] after the guard is granted.
	pub(crate) async fn lock_acquisition(&self) -> async_lock::MutexGuard<'_, ()> {
		self.acquisition.lock().await
	}
}

/// Registry of session-scoped context stores.
///
/// Implementations must hand out the same [`ContextStore`] for a session id until
/// [`SessionStore::remove`] is called for it.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the store bound to `session`, creating it on first use.
	fn get_or_create(&self, session: &SessionId) -> Arc<ContextStore>;

	/// Returns the store bound to `session` without creating one.
	fn get(&self, session: &SessionId) -> Option<Arc<ContextStore>>;

	/// Discards the store bound to `session`, returning it if present.
	fn remove(&self, session: &SessionId) -> Option<Arc<ContextStore>>;
}
