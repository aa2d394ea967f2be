use super::*;

#[test]
fn doubles_from_initial() {
    assert_eq!(next_backoff(INITIAL_BACKOFF), Duration::from_secs(4));
}

#[test]
fn caps_at_max() {
    assert_eq!(next_backoff(Duration::from_secs(40)), MAX_BACKOFF);
    assert_eq!(next_backoff(MAX_BACKOFF), MAX_BACKOFF);
}

#[test]
fn reaches_cap_within_a_handful_of_failures() {
    let mut backoff = INITIAL_BACKOFF;
    for _ in 0..5 {
        backoff = next_backoff(backoff);
    }
    assert_eq!(backoff, MAX_BACKOFF);
}
