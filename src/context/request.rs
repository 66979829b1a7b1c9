//! Parameters of an in-flight authorization-code exchange.

// self
use crate::_prelude::*;

const CODE: &str = "code";
const STATE: &str = "state";

/// Request-local carrier for callback parameters and the current URI.
///
/// The web layer builds one per inbound request, typically through
/// [`AccessTokenRequest::from_current_uri`], before application code runs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccessTokenRequest {
	params: BTreeMap<String, String>,
	current_uri: Option<Url>,
}
impl AccessTokenRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Captures the inbound request URI and lifts its query parameters.
	///
	/// The first occurrence of a repeated parameter wins.
	pub fn from_current_uri(uri: Url) -> Self {
		let mut params = BTreeMap::new();

		for (name, value) in uri.query_pairs() {
			params.entry(name.into_owned()).or_insert_with(|| value.into_owned());
		}

		Self { params, current_uri: Some(uri) }
	}

	/// URI of the inbound request, if known.
	pub fn current_uri(&self) -> Option<&Url> {
		self.current_uri.as_ref()
	}

	/// Replaces the current URI without touching parameters.
	pub fn set_current_uri(&mut self, uri: Url) {
		self.current_uri = Some(uri);
	}

	/// Authorization code returned by the authorization server, if any.
	pub fn authorization_code(&self) -> Option<&str> {
		self.param(CODE)
	}

	/// Records an authorization code.
	pub fn set_authorization_code(&mut self, code: impl Into<String>) {
		self.set_param(CODE, code);
	}

	/// `state` echoed back by the authorization server, if any.
	pub fn state(&self) -> Option<&str> {
		self.param(STATE)
	}

	/// Records the `state` value.
	pub fn set_state(&mut self, state: impl Into<String>) {
		self.set_param(STATE, state);
	}

	/// Returns a parameter by name; empty values count as absent.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str).filter(|value| !value.is_empty())
	}

	/// Sets a parameter, replacing any previous value.
	pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.params.insert(name.into(), value.into());
	}

	/// Removes a parameter and returns its previous value.
	pub fn remove_param(&mut self, name: &str) -> Option<String> {
		self.params.remove(name)
	}

	/// All parameters in name order.
	pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
		self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}
}
impl Debug for AccessTokenRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let names = self.params.keys().collect::<Vec<_>>();

		f.debug_struct("AccessTokenRequest")
			.field("params", &names)
			.field("current_uri", &self.current_uri.as_ref().map(Url::path))
			.finish()
	}
}
