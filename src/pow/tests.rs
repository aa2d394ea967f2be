use super::*;

#[test]
fn solve_produces_a_verifiable_proof() {
    let proof = solve("test-challenge-abc", 16);
    assert!(verify("test-challenge-abc", &proof, 16));
}

#[test]
fn proof_does_not_verify_against_a_different_challenge() {
    let proof = solve("test-challenge-abc", 16);
    assert!(!verify("different-challenge", &proof, 16));
}

#[test]
fn difficulty_zero_accepts_the_first_nonce() {
    assert_eq!(solve("anything", 0), "0");
    assert!(verify("anything", "0", 0));
}

#[test]
fn difficulty_spans_a_full_byte() {
    let proof = solve("byte-boundary", 8);
    assert!(verify("byte-boundary", &proof, 8));
}

#[test]
fn difficulty_crosses_a_byte_boundary() {
    let proof = solve("cross-boundary", 9);
    assert!(verify("cross-boundary", &proof, 9));
}

#[test]
fn is_deterministic_for_identical_inputs() {
    assert_eq!(solve("same", 12), solve("same", 12));
}

#[test]
fn adversarial_proof_overwhelmingly_fails() {
    let proof = solve("adv", 16);
    // A proof not produced by Solve against this challenge: perturb it.
    let bad_proof = format!("{proof}x");
    assert!(!verify("adv", &bad_proof, 16));
}
