//! Known API servers.

use newsapi_core::Result;
use url::Url;

/// Production Event Registry API.
///
/// # Errors
///
/// Never fails in practice; the URL is a constant.
pub fn server1() -> Result<Url> {
    Ok(Url::parse("https://eventregistry.org/api/v1")?)
}
