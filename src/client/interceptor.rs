//! Request interceptors applied to every outbound call.

// crates.io
use reqwest::{
	Request,
	header::{ACCEPT, HeaderValue},
};
// self
use crate::http::APPLICATION_JSON;

/// Hook that adjusts an outbound request before the token is attached.
pub trait RequestInterceptor
where
	Self: Send + Sync,
{
	/// Mutates the request in place.
	fn intercept(&self, request: &mut Request);
}

/// Forces `Accept: application/json`, replacing any value set by the caller.
///
/// [`OAuth2Client`](crate::client::OAuth2Client) runs it after every configured interceptor.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptJsonInterceptor;
impl RequestInterceptor for AcceptJsonInterceptor {
	fn intercept(&self, request: &mut Request) {
		request.headers_mut().insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
	}
}
