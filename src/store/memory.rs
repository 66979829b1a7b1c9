//! Thread-safe in-memory [`SessionStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::SessionId,
	context::ScopeMode,
	store::{ContextStore, SessionStore},
};

type SessionMap = Arc<RwLock<HashMap<SessionId, Arc<ContextStore>>>>;

/// Session registry that keeps context stores in-process.
///
/// Stores live until [`SessionStore::remove`] is called; nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(SessionMap);
impl MemorySessionStore {
	/// Number of sessions currently holding a store.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no session holds a store.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl SessionStore for MemorySessionStore {
	fn get_or_create(&self, session: &SessionId) -> Arc<ContextStore> {
		if let Some(store) = self.0.read().get(session) {
			return store.clone();
		}

		self.0
			.write()
			.entry(session.clone())
			.or_insert_with(|| Arc::new(ContextStore::new(ScopeMode::Session)))
			.clone()
	}

	fn get(&self, session: &SessionId) -> Option<Arc<ContextStore>> {
		self.0.read().get(session).cloned()
	}

	fn remove(&self, session: &SessionId) -> Option<Arc<ContextStore>> {
		self.0.write().remove(session)
	}
}
