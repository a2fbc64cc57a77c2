use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const FALLBACK_SUFFIX_LEN: usize = 6;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Opaque per-instance form identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// Random v4 UUID from the OS generator, or a time-based id when the
/// OS source is unavailable.
pub fn generate() -> Identifier {
    generate_from(&mut OsRng)
}

/// Same as [`generate`] with an explicit entropy source.
pub fn generate_from<R: RngCore + ?Sized>(rng: &mut R) -> Identifier {
    let mut bytes = [0u8; 16];
    match rng.try_fill_bytes(&mut bytes) {
        Ok(()) => Identifier(
            uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .hyphenated()
                .to_string(),
        ),
        Err(e) => {
            tracing::debug!("secure random source unavailable ({e}), using fallback id");
            fallback_id()
        }
    }
}

/// `id-<base36 unix millis>-<6 base36 chars>`.
pub fn fallback_id() -> Identifier {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let millis = now.as_millis() as u64;

    // Seeded from the clock and a process-wide counter; no OS entropy needed.
    let count = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let seed = (now.as_nanos() as u64) ^ count.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut rng = StdRng::seed_from_u64(seed);

    let suffix: String = (0..FALLBACK_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    Identifier(format!("id-{}-{}", to_base36(millis), suffix))
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "zz");
    }

    #[test]
    fn primary_id_is_uuid_v4() {
        let id = generate();
        let parsed = uuid::Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }
}
