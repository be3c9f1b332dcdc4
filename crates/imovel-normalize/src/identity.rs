use sha2::{Digest, Sha256};

/// Derive a stable identifier for a listing from its source site and URL.
///
/// The same `(source, url)` pair always yields the same identifier, so
/// listings scraped twice in one run (pagination overlap, repeated
/// searches) can be deduplicated downstream. Collision resistance is all
/// that matters here; this is not a security boundary.
pub fn listing_id(source: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"_");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
