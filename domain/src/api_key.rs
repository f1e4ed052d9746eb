//! Producer authentication by static API key.

/// Returns `true` iff the key a producer presented equals the configured key.
///
/// The comparison is exact: case-sensitive, no trimming, and an empty `provided`
/// only matches an empty `configured`. It is not constant-time.
pub fn check_api_key(provided: &str, configured: &str) -> bool {
    provided == configured
}
