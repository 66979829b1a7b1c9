//! Protected-resource details (data) and token request enhancers (behavior).
//!
//! `descriptor` exposes [`ResourceDetails`], the immutable description of the client
//! registration and the authorization server endpoints loaded once at startup. `enhancer`
//! defines [`TokenRequestEnhancer`], the hook that decorates every token endpoint request,
//! together with the built-in enhancer that pins `Accept: application/json`.

pub mod descriptor;
pub mod enhancer;

pub use descriptor::*;
pub use enhancer::*;
