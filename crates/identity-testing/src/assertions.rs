//! Assertions over identity results and claim sets.

use identity_domain::claim::Claim;
use identity_domain::result::IdentityResult;

#[track_caller]
pub fn assert_succeeded(result: &IdentityResult) {
    assert!(result.succeeded(), "expected success, got {result}");
}

#[track_caller]
pub fn assert_failed_with(result: &IdentityResult, code: &str) {
    assert!(
        result.has_code(code),
        "expected failure with {code}, got {result}"
    );
}

/// Claims match as multisets, ignoring order.
#[track_caller]
pub fn assert_same_claims(actual: &[Claim], expected: &[Claim]) {
    let mut remaining: Vec<&Claim> = expected.iter().collect();
    for claim in actual {
        match remaining.iter().position(|c| *c == claim) {
            Some(idx) => {
                remaining.swap_remove(idx);
            }
            None => panic!("unexpected claim {claim:?}; expected {expected:?}, got {actual:?}"),
        }
    }
    assert!(
        remaining.is_empty(),
        "missing claims {remaining:?}; got {actual:?}"
    );
}
