use std::collections::HashSet;

use form_relay::form::identifier::{fallback_id, generate, generate_from};
use rand::RngCore;

/// Entropy source that is never available.
struct UnavailableRng;

impl RngCore for UnavailableRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {}

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new(std::io::Error::other("no entropy")))
    }
}

#[test]
fn generated_identifiers_never_repeat() {
    let ids: HashSet<String> = (0..10_000).map(|_| generate().into_string()).collect();
    assert_eq!(ids.len(), 10_000, "Every identifier in a session must be unique");
}

#[test]
fn unavailable_entropy_falls_back_silently() {
    let id = generate_from(&mut UnavailableRng);
    assert!(
        id.as_str().starts_with("id-"),
        "Fallback id expected, got {}",
        id
    );
}

#[test]
fn fallback_id_has_time_and_random_parts() {
    let id = fallback_id().into_string();
    let parts: Vec<&str> = id.split('-').collect();

    assert_eq!(parts.len(), 3, "id-<time>-<suffix>: {}", id);
    assert_eq!(parts[0], "id");
    assert!(parts[1].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_eq!(parts[2].len(), 6);
    assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
}

#[test]
fn fallback_ids_are_distinct_within_one_millisecond() {
    let ids: HashSet<String> = (0..1_000).map(|_| fallback_id().into_string()).collect();
    assert!(
        ids.len() >= 999,
        "Fallback collisions should be negligible, got {} unique of 1000",
        ids.len()
    );
}
