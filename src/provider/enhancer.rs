//! Token request enhancers that decorate calls to the token endpoint.
//!
//! Enhancers work on a plain form map and an `http` header map so they stay independent of
//! the transport behind [`TokenHttpClient`](crate::http::TokenHttpClient).

// crates.io
use oauth2::http::{HeaderMap, HeaderValue, header::ACCEPT};
// self
use crate::{_prelude::*, context::AccessTokenRequest, http::APPLICATION_JSON, provider::ResourceDetails};

/// Hook that adjusts a token endpoint request before it is dispatched.
///
/// Form entries the grant itself owns (`grant_type`, `code`, `redirect_uri`, client
/// credentials) are ignored if an enhancer sets them; headers replace any previous value with
/// the same name.
pub trait TokenRequestEnhancer
where
	Self: Send + Sync,
{
	/// Mutates the outgoing form and headers.
	fn enhance(
		&self,
		request: &AccessTokenRequest,
		details: &ResourceDetails,
		form: &mut BTreeMap<String, String>,
		headers: &mut HeaderMap,
	);
}

/// Declares that token responses must be JSON.
///
/// Some authorization servers answer token requests with form-encoded bodies unless told
/// otherwise. The acquisition provider always runs this enhancer last.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptJsonEnhancer;
impl TokenRequestEnhancer for AcceptJsonEnhancer {
	fn enhance(
		&self,
		_request: &AccessTokenRequest,
		_details: &ResourceDetails,
		_form: &mut BTreeMap<String, String>,
		headers: &mut HeaderMap,
	) {
		headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::ClientId;

	fn details() -> ResourceDetails {
		ResourceDetails::builder(ClientId::new("web-app").expect("Client should be valid."))
			.client_secret("secret")
			.authorization_endpoint(
				Url::parse("https://auth.example.com/authorize").expect("URL should parse."),
			)
			.token_endpoint(Url::parse("https://auth.example.com/token").expect("URL should parse."))
			.build()
			.expect("Resource details should build.")
	}

	#[test]
	fn accept_json_overrides_existing_accept_headers() {
		let mut headers = HeaderMap::new();
		let mut form = BTreeMap::new();

		headers.append(ACCEPT, HeaderValue::from_static("application/x-www-form-urlencoded"));
		headers.append(ACCEPT, HeaderValue::from_static("text/plain"));

		AcceptJsonEnhancer.enhance(&AccessTokenRequest::default(), &details(), &mut form, &mut headers);

		assert_eq!(headers.get_all(ACCEPT).iter().collect::<Vec<_>>(), vec![APPLICATION_JSON]);
		assert!(form.is_empty());
	}

	#[test]
	fn enhancer_chains_cross_threads() {
		let chain: Vec<Arc<dyn TokenRequestEnhancer>> = vec![Arc::new(AcceptJsonEnhancer)];
		let applied = std::thread::spawn(move || {
			let mut headers = HeaderMap::new();

			for enhancer in &chain {
				enhancer.enhance(
					&AccessTokenRequest::default(),
					&details(),
					&mut BTreeMap::new(),
					&mut headers,
				);
			}

			headers.get(ACCEPT).cloned()
		})
		.join()
		.expect("Enhancer thread should finish.");

		assert_eq!(applied, Some(HeaderValue::from_static(APPLICATION_JSON)));
	}
}
