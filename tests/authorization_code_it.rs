#![cfg(feature = "reqwest")]

// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
// self
use oauth2_client_context::{
	_preludet::*,
	auth::{ClientId, Principal, ScopeSet, SessionId, TokenOrigin},
	context::{AccessTokenRequest, ClientContext, ContextFactory, ScopeMode},
	error::AcquisitionError,
	flows::ReqwestTokenProvider,
	oauth::ReqwestTransportErrorMapper,
	provider::ResourceDetails,
	reqwest::Method as HttpMethod,
	store::MAX_PENDING_STATES,
};

const REDIRECT_URI: &str = "https://app.example.com/callback";

fn build_details(server: &MockServer) -> ResourceDetails {
	ResourceDetails::builder(ClientId::new("web-app").expect("Client fixture should be valid."))
		.client_secret("s3cret")
		.authorization_endpoint(
			Url::parse(&server.url("/oauth/authorize"))
				.expect("Mock authorization endpoint should parse."),
		)
		.token_endpoint(
			Url::parse(&server.url("/oauth/token")).expect("Mock token endpoint should parse."),
		)
		.redirect_uri(Url::parse(REDIRECT_URI).expect("Redirect fixture should parse."))
		.scope(ScopeSet::new(["read", "write"]).expect("Scope fixture should be valid."))
		.build()
		.expect("Resource details should build.")
}

fn session_id() -> SessionId {
	SessionId::new("browser-session").expect("Session fixture should be valid.")
}

fn callback(code: &str, state: &str) -> AccessTokenRequest {
	AccessTokenRequest::from_current_uri(
		Url::parse(&format!("{REDIRECT_URI}?code={code}&state={state}"))
			.expect("Callback fixture should parse."),
	)
}

/// Resolves a session context, triggers the redirect, and returns the preserved state.
async fn start_authorization(
	factory: &ContextFactory,
	provider: &ReqwestTokenProvider,
) -> (Url, String) {
	let context = factory
		.resolve_context(Some(&session_id()), AccessTokenRequest::default(), &Principal::Anonymous)
		.expect("Session context should resolve.");

	match provider.acquire_token(&context).await {
		Err(Error::UserRedirectRequired { authorize_url, state }) => (authorize_url, state),
		other => panic!("Expected a redirect, got {other:?}."),
	}
}

#[tokio::test]
async fn session_scope_acquires_once_and_reuses_token() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("accept", "application/json")
				.header("content-type", "application/x-www-form-urlencoded")
				.header_exists("authorization")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "code-123")
				.form_urlencoded_tuple("redirect_uri", REDIRECT_URI);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"abc\",\"token_type\":\"bearer\"}");
		})
		.await;
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/me").header("authorization", "Bearer abc");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let (client, provider) = build_reqwest_test_client(build_details(&server));
	let factory = ContextFactory::new(ScopeMode::Session);
	let (authorize_url, state) = start_authorization(&factory, &provider).await;
	let pairs: HashMap<_, _> = authorize_url.query_pairs().into_owned().collect();

	assert_eq!(authorize_url.path(), "/oauth/authorize");
	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("client_id"), Some(&"web-app".into()));
	assert_eq!(pairs.get("redirect_uri"), Some(&REDIRECT_URI.into()));
	assert_eq!(pairs.get("scope"), Some(&"read write".into()));
	assert_eq!(pairs.get("state"), Some(&state));
	assert_eq!(state.len(), 32);

	let context = factory
		.resolve_context(Some(&session_id()), callback("code-123", &state), &Principal::Anonymous)
		.expect("Callback context should resolve.");
	let request = client
		.request(HttpMethod::GET, server.url("/api/me"))
		.build()
		.expect("Outbound request should build.");
	let response = client.execute(request, &context).await.expect("First call should succeed.");

	assert_eq!(response.status().as_u16(), 200);

	let token = context.access_token().expect("Token should be stored on the session.");

	assert_eq!(token.value.expose(), "abc");
	assert_eq!(token.origin, TokenOrigin::Granted);
	assert_eq!(token.expires_at, None);
	assert_eq!(token.scope.as_slice(), ["read", "write"]);

	let later = factory
		.resolve_context(Some(&session_id()), AccessTokenRequest::default(), &Principal::Anonymous)
		.expect("Later context should resolve.");
	let request = client
		.request(HttpMethod::GET, server.url("/api/me"))
		.build()
		.expect("Outbound request should build.");
	let response = client.execute(request, &later).await.expect("Second call should succeed.");

	assert_eq!(response.status().as_u16(), 200);

	token_mock.assert_calls_async(1).await;
	resource_mock.assert_calls_async(2).await;

	assert_eq!(provider.metrics.attempts(), 1);
	assert_eq!(provider.metrics.successes(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_in_one_session_share_one_acquisition() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"shared\",\"token_type\":\"bearer\",\"expires_in\":3600}")
				.delay(StdDuration::from_millis(300));
		})
		.await;
	let (_client, provider) = build_reqwest_test_client(build_details(&server));
	let factory = ContextFactory::new(ScopeMode::Session);
	let (_, state) = start_authorization(&factory, &provider).await;
	let contexts = (0..8)
		.map(|_| {
			factory
				.resolve_context(
					Some(&session_id()),
					callback("code-123", &state),
					&Principal::Anonymous,
				)
				.expect("Callback context should resolve.")
		})
		.collect::<Vec<ClientContext>>();
	let handles = contexts
		.into_iter()
		.map(|context| {
			let provider = provider.clone();

			tokio::spawn(async move {
				provider.acquire_token(&context).await.map(|token| token.value.expose().to_owned())
			})
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let value = handle
			.await
			.expect("Acquisition task should finish.")
			.expect("Every request should observe the acquired token.");

		assert_eq!(value, "shared");
	}

	token_mock.assert_calls_async(1).await;

	assert_eq!(provider.metrics.attempts(), 1);
}

#[tokio::test]
async fn unknown_or_missing_state_is_rejected_before_exchange() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"never\",\"token_type\":\"bearer\"}");
		})
		.await;
	let (_client, provider) = build_reqwest_test_client(build_details(&server));
	let factory = ContextFactory::new(ScopeMode::Session);
	let _ = start_authorization(&factory, &provider).await;
	let forged = factory
		.resolve_context(Some(&session_id()), callback("code-123", "forged"), &Principal::Anonymous)
		.expect("Callback context should resolve.");
	let err = provider.acquire_token(&forged).await.expect_err("Forged states must be rejected.");

	assert!(matches!(err, Error::InvalidState { .. }));

	let mut stateless = AccessTokenRequest::default();

	stateless.set_authorization_code("code-123");

	let stateless = factory
		.resolve_context(Some(&session_id()), stateless, &Principal::Anonymous)
		.expect("Callback context should resolve.");
	let err =
		provider.acquire_token(&stateless).await.expect_err("Missing states must be rejected.");

	assert!(matches!(err, Error::InvalidState { .. }));
	assert!(stateless.access_token().is_none());

	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_exchanges_surface_status_and_are_retried_on_next_call() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"code expired\"}");
		})
		.await;
	let provider = ReqwestTokenProvider::with_http_client(
		build_details(&server),
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	)
	.with_state_mandatory(false);
	let factory = ContextFactory::new(ScopeMode::Request);
	let mut token_request = AccessTokenRequest::default();

	token_request.set_authorization_code("expired-code");

	let context = factory
		.resolve_context(None, token_request, &Principal::Anonymous)
		.expect("Request context should resolve.");

	for attempt in 1..=2 {
		let err = provider
			.acquire_token(&context)
			.await
			.expect_err("Rejected exchanges must fail.");

		match err {
			Error::Acquisition(AcquisitionError::TokenEndpoint { status, oauth_error, body }) => {
				assert_eq!(status, Some(400));
				assert_eq!(oauth_error.as_deref(), Some("invalid_grant"));
				assert!(body.is_some_and(|body| body.contains("code expired")));
			},
			other => panic!("Unexpected error on attempt {attempt}: {other:?}."),
		}

		assert!(context.access_token().is_none());
	}

	token_mock.assert_calls_async(2).await;

	assert_eq!(provider.metrics.failures(), 2);
}

#[tokio::test]
async fn non_json_token_responses_are_reported() {
	let server = MockServer::start_async().await;
	let error_page = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").form_urlencoded_tuple("code", "gateway");
			then.status(503).header("content-type", "text/html").body("<html>down</html>");
		})
		.await;
	let html_success = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").form_urlencoded_tuple("code", "html");
			then.status(200).header("content-type", "text/html").body("<html>ok</html>");
		})
		.await;
	let provider = ReqwestTokenProvider::with_http_client(
		build_details(&server),
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	)
	.with_state_mandatory(false);
	let factory = ContextFactory::new(ScopeMode::Request);
	let context_for = |code: &str| {
		let mut token_request = AccessTokenRequest::default();

		token_request.set_authorization_code(code);

		factory
			.resolve_context(None, token_request, &Principal::Anonymous)
			.expect("Request context should resolve.")
	};
	let err = provider
		.acquire_token(&context_for("gateway"))
		.await
		.expect_err("Gateway errors must fail.");

	match err {
		Error::Acquisition(AcquisitionError::TokenEndpoint { status, oauth_error, body }) => {
			assert_eq!(status, Some(503));
			assert_eq!(oauth_error, None);
			assert_eq!(body.as_deref(), Some("<html>down</html>"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	let err = provider
		.acquire_token(&context_for("html"))
		.await
		.expect_err("HTML token responses must fail.");

	match err {
		Error::Acquisition(AcquisitionError::UnexpectedResponse {
			status, content_type, ..
		}) => {
			assert_eq!(status, Some(200));
			assert_eq!(content_type.as_deref(), Some("text/html"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	error_page.assert_calls_async(1).await;
	html_success.assert_calls_async(1).await;
}

#[tokio::test]
async fn transport_failures_are_not_cached() {
	let details = ResourceDetails::builder(
		ClientId::new("web-app").expect("Client fixture should be valid."),
	)
	.client_secret("s3cret")
	.authorization_endpoint(
		Url::parse("http://127.0.0.1:9/oauth/authorize").expect("URL fixture should parse."),
	)
	.token_endpoint(Url::parse("http://127.0.0.1:9/oauth/token").expect("URL fixture should parse."))
	.redirect_uri(Url::parse(REDIRECT_URI).expect("Redirect fixture should parse."))
	.build()
	.expect("Resource details should build.");
	let provider = ReqwestTokenProvider::with_http_client(
		details,
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	)
	.with_state_mandatory(false);
	let mut token_request = AccessTokenRequest::default();

	token_request.set_authorization_code("code");

	let context = ContextFactory::new(ScopeMode::Request)
		.resolve_context(None, token_request, &Principal::Anonymous)
		.expect("Request context should resolve.");

	for _ in 0..2 {
		let err = provider.acquire_token(&context).await.expect_err("Nothing listens on port 9.");

		assert!(matches!(err, Error::Transport(_)), "Unexpected error: {err:?}.");
	}

	assert_eq!(provider.metrics.attempts(), 2);
}

#[tokio::test]
async fn repeated_redirects_keep_session_state_bounded() {
	let server = MockServer::start_async().await;
	let (_client, provider) = build_reqwest_test_client(build_details(&server));
	let factory = ContextFactory::new(ScopeMode::Session);
	let mut states = Vec::new();

	for _ in 0..100 {
		states.push(start_authorization(&factory, &provider).await.1);
	}

	let context = factory
		.resolve_context(Some(&session_id()), AccessTokenRequest::default(), &Principal::Anonymous)
		.expect("Session context should resolve.");

	assert_eq!(context.store().pending_states(), MAX_PENDING_STATES);

	let stale = factory
		.resolve_context(Some(&session_id()), callback("code-123", &states[0]), &Principal::Anonymous)
		.expect("Callback context should resolve.");
	let err = provider.acquire_token(&stale).await.expect_err("Evicted states must be rejected.");

	assert!(matches!(err, Error::InvalidState { .. }));
	assert_eq!(provider.metrics.attempts(), 0);
}
