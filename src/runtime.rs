//! Startup wiring: settings in, context factory + provider + outbound client out.

// self
use crate::{
	_prelude::*,
	client::ReqwestOAuth2Client,
	config::ClientSettings,
	context::{ContextFactory, ScopeMode},
	error::ConfigError,
	flows::ReqwestTokenProvider,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::ResourceDetails,
};

/// Everything a web backend needs to run client contexts for one protected resource.
#[derive(Debug)]
pub struct ClientRuntime {
	/// Resolves a context for each inbound request.
	pub factory: ContextFactory,
	/// Performs the authorization-code grant.
	pub provider: Arc<ReqwestTokenProvider>,
	/// Sends outbound calls with the context's token attached.
	pub client: ReqwestOAuth2Client,
}
impl ClientRuntime {
	/// Builds the runtime from settings using default reqwest clients.
	///
	/// Returns `Ok(None)` when the settings carry no client identifier. `sso_enabled` selects
	/// session-scoped contexts.
	///
	/// Callbacks must echo a preserved `state`. A request-scoped store does not outlive its
	/// request, so request-scoped runtimes that complete the code grant themselves need
	/// [`ClientRuntime::with_state_mandatory`] set to `false`.
	pub fn from_settings(settings: ClientSettings, sso_enabled: bool) -> Result<Option<Self>> {
		Self::from_settings_with_clients(
			settings,
			sso_enabled,
			ReqwestHttpClient::default(),
			ReqwestClient::default(),
		)
	}

	/// Same as [`ClientRuntime::from_settings`] with caller-provided transports for the token
	/// endpoint and for outbound calls.
	pub fn from_settings_with_clients(
		settings: ClientSettings,
		sso_enabled: bool,
		token_http: ReqwestHttpClient,
		http: ReqwestClient,
	) -> Result<Option<Self>> {
		let Some(details) = settings.into_details().map_err(ConfigError::from)? else {
			return Ok(None);
		};

		Ok(Some(Self::from_details(details, ScopeMode::for_deployment(sso_enabled), token_http, http)))
	}

	/// Builds the runtime from already-validated details.
	pub fn from_details(
		details: ResourceDetails,
		mode: ScopeMode,
		token_http: ReqwestHttpClient,
		http: ReqwestClient,
	) -> Self {
		let provider = Arc::new(ReqwestTokenProvider::with_http_client(
			details,
			token_http,
			Arc::new(ReqwestTransportErrorMapper),
		));
		let client = ReqwestOAuth2Client::new(http, provider.clone());

		Self { factory: ContextFactory::new(mode), provider, client }
	}

	/// Controls whether callbacks must echo a preserved `state`; the outbound client keeps
	/// sharing the reconfigured provider.
	pub fn with_state_mandatory(mut self, mandatory: bool) -> Self {
		let provider =
			Arc::new(ReqwestTokenProvider::clone(&self.provider).with_state_mandatory(mandatory));

		self.client.replace_provider(provider.clone());
		self.provider = provider;

		self
	}

	/// Scope mode selected at startup.
	pub fn mode(&self) -> ScopeMode {
		self.factory.mode()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn disabled_settings_build_nothing() {
		let runtime = ClientRuntime::from_settings(ClientSettings::default(), true)
			.expect("Disabled settings are not an error.");

		assert!(runtime.is_none());
	}

	#[test]
	fn deployment_flag_picks_scope() {
		let settings = ClientSettings::from_json_str(
			r#"{
				"clientId": "web-app",
				"clientSecret": "s3cret",
				"accessTokenUri": "https://auth.example.com/token",
				"userAuthorizationUri": "https://auth.example.com/authorize"
			}"#,
		)
		.expect("Settings should parse.");
		let session = ClientRuntime::from_settings(settings.clone(), true)
			.expect("Runtime should build.")
			.expect("Enabled settings should build a runtime.");
		let request = ClientRuntime::from_settings(settings, false)
			.expect("Runtime should build.")
			.expect("Enabled settings should build a runtime.");

		assert_eq!(session.mode(), ScopeMode::Session);
		assert_eq!(request.mode(), ScopeMode::Request);
		assert!(Arc::ptr_eq(session.client.provider(), &session.provider));
	}

	#[test]
	fn state_requirement_can_be_relaxed() {
		let settings = ClientSettings::from_json_str(
			r#"{
				"clientId": "web-app",
				"clientSecret": "s3cret",
				"accessTokenUri": "https://auth.example.com/token",
				"userAuthorizationUri": "https://auth.example.com/authorize"
			}"#,
		)
		.expect("Settings should parse.");
		let runtime = ClientRuntime::from_settings(settings, false)
			.expect("Runtime should build.")
			.expect("Enabled settings should build a runtime.");

		assert!(runtime.provider.state_mandatory());

		let runtime = runtime.with_state_mandatory(false);

		assert!(!runtime.provider.state_mandatory());
		assert!(!runtime.client.provider().state_mandatory());
		assert!(Arc::ptr_eq(runtime.client.provider(), &runtime.provider));
	}

	#[test]
	fn invalid_settings_surface_as_config_errors() {
		let settings = ClientSettings {
			client_id: Some("web-app".into()),
			access_token_uri: Some("::".into()),
			..Default::default()
		};
		let err = ClientRuntime::from_settings(settings, false)
			.expect_err("Invalid URLs must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::Settings(_))));
	}
}
