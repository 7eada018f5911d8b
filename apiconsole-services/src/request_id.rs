//! Correlation ids for processing requests.
//!
//! Format: `<prefix>-<epochMillis>-<randomBase36>`, e.g.
//! `qr-extract-1718000000000-k3j9x2a1q`.

use chrono::Utc;
use rand::Rng;

/// Length of the random suffix.
const SUFFIX_LEN: usize = 9;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a request id with the current time.
pub fn generate(prefix: &str) -> String {
    generate_with(prefix, Utc::now().timestamp_millis(), &mut rand::thread_rng())
}

/// Generates a request id from explicit inputs.
pub fn generate_with<R: Rng + ?Sized>(prefix: &str, epoch_ms: i64, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("{prefix}-{epoch_ms}-{suffix}")
}

/// Splits a request id into prefix, timestamp and suffix.
pub fn parse(id: &str) -> Option<(&str, i64, &str)> {
    let (rest, suffix) = id.rsplit_once('-')?;
    let (prefix, millis) = rest.rsplit_once('-')?;
    if prefix.is_empty()
        || suffix.is_empty()
        || !suffix.bytes().all(|b| BASE36.contains(&b))
    {
        return None;
    }
    Some((prefix, millis.parse().ok()?, suffix))
}
