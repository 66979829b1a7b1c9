//! Walks through a session-scoped client context: the first access asks for a redirect, and the
//! callback carrying the preserved `state` is recognized by the same session.

// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use oauth2_client_context::{
	auth::{Principal, SessionId},
	config::ClientSettings,
	context::AccessTokenRequest,
	error::Error,
	runtime::ClientRuntime,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let settings = ClientSettings::from_json_str(
		r#"{
			"clientId": "demo-client",
			"clientSecret": "demo-secret",
			"accessTokenUri": "https://provider.example.com/oauth/token",
			"userAuthorizationUri": "https://provider.example.com/oauth/authorize",
			"scope": "openid profile"
		}"#,
	)?;
	let runtime = ClientRuntime::from_settings(settings, true)?
		.ok_or_else(|| eyre!("The demo settings should enable the client."))?;
	let session = SessionId::new("demo-browser-session")?;
	let landing = AccessTokenRequest::from_current_uri(Url::parse(
		"https://app.example.com/oauth/callback?next=/reports",
	)?);
	let context = runtime.factory.resolve_context(Some(&session), landing, &Principal::Anonymous)?;

	println!("Resolved a {} scoped context.", runtime.mode());

	let state = match runtime.provider.acquire_token(&context).await {
		Err(Error::UserRedirectRequired { authorize_url, state }) => {
			println!("Send your user to {authorize_url}.");

			state
		},
		Ok(token) => {
			println!("Session already holds a {} token.", token.token_type);

			return Ok(());
		},
		Err(err) => return Err(err.into()),
	};
	// Simulate the redirect handler resolving the same session once the user returns.
	let callback = callback_request(&state)?;
	let context = runtime.factory.resolve_context(Some(&session), callback, &Principal::Anonymous)?;

	println!(
		"Session has {} pending authorization(s); state `{state}` is recognized: {}.",
		context.store().pending_states(),
		context.token_request().state() == Some(state.as_str()),
	);
	println!("Calling the protected resource now would exchange the code at the token endpoint.");

	runtime.factory.end_session(&session);

	Ok(())
}

fn callback_request(state: &str) -> Result<AccessTokenRequest> {
	Ok(AccessTokenRequest::from_current_uri(Url::parse(&format!(
		"https://app.example.com/oauth/callback?code=demo-code&state={state}"
	))?))
}
