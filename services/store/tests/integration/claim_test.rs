use identity_domain::claim::Claim;
use identity_store::domain::repository::UserClaimStore;
use identity_store::usecase::user_manager::UserManager;
use identity_testing::assertions::{assert_same_claims, assert_succeeded};
use identity_testing::builders::claims;
use identity_testing::fixture::TestDatabase;

use crate::helpers::{create_user, db_managers, memory_managers};

fn three_claims() -> Vec<Claim> {
    claims(&[("c1", "v1", "i1"), ("c2", "v2", "i2"), ("c2", "v3", "i3")])
}

// ── Scenarios, run against every backend ─────────────────────────────────────

async fn removes_claims_one_at_a_time<S: UserClaimStore>(users: &UserManager<S>) {
    let mut user = create_user(users, "a").await;
    let all = three_claims();
    assert_succeeded(&users.add_claims(&mut user, &all).await.unwrap());
    assert_same_claims(&users.get_claims(&user).await.unwrap(), &all);

    for (i, claim) in all.iter().enumerate() {
        assert_succeeded(&users.remove_claim(&mut user, claim).await.unwrap());
        let left = users.get_claims(&user).await.unwrap();
        assert_eq!(left.len(), all.len() - i - 1);
        assert_same_claims(&left, &all[i + 1..]);
    }
}

async fn keeps_other_users_claims<S: UserClaimStore>(users: &UserManager<S>) {
    let mut a = create_user(users, "a").await;
    let mut b = create_user(users, "b").await;
    let all = three_claims();
    users.add_claims(&mut a, &all).await.unwrap();
    users.add_claims(&mut b, &all).await.unwrap();

    users.remove_claims(&mut a, &all).await.unwrap();

    assert!(users.get_claims(&a).await.unwrap().is_empty());
    assert_same_claims(&users.get_claims(&b).await.unwrap(), &all);
}

async fn replaces_claim_in_place<S: UserClaimStore>(users: &UserManager<S>) {
    let mut user = create_user(users, "a").await;
    let old = Claim::new("c", "a").with_issuer("i");
    let new = Claim::new("c", "b").with_issuer("i");
    users.add_claim(&mut user, &old).await.unwrap();

    assert_succeeded(&users.replace_claim(&mut user, &old, &new).await.unwrap());

    assert_eq!(users.get_claims(&user).await.unwrap(), vec![new]);
}

async fn distinguishes_claims_by_issuer<S: UserClaimStore>(users: &UserManager<S>) {
    let mut user = create_user(users, "a").await;
    let first = Claim::new("c", "v").with_issuer("i1");
    let second = Claim::new("c", "v").with_issuer("i2");
    users
        .add_claims(&mut user, &[first.clone(), second.clone()])
        .await
        .unwrap();

    users.remove_claim(&mut user, &first).await.unwrap();

    assert_eq!(users.get_claims(&user).await.unwrap(), vec![second]);
}

async fn finds_users_by_full_claim_identity<S: UserClaimStore>(users: &UserManager<S>) {
    let mut a = create_user(users, "a").await;
    let mut b = create_user(users, "b").await;
    let mut c = create_user(users, "c").await;
    let claim = Claim::new("dept", "eng").with_issuer("hr");
    users.add_claim(&mut a, &claim).await.unwrap();
    users.add_claim(&mut b, &claim).await.unwrap();
    users
        .add_claim(&mut c, &Claim::new("dept", "eng").with_issuer("other"))
        .await
        .unwrap();

    let mut found: Vec<_> = users
        .get_users_for_claim(&claim)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    found.sort();
    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(found, expected);
}

async fn ignores_removal_of_missing_claim<S: UserClaimStore>(users: &UserManager<S>) {
    let mut user = create_user(users, "a").await;
    let kept = Claim::new("c", "v").with_issuer("i");
    users.add_claim(&mut user, &kept).await.unwrap();

    let missing = Claim::new("c", "v").with_issuer("elsewhere");
    assert_succeeded(&users.remove_claim(&mut user, &missing).await.unwrap());

    assert_eq!(users.get_claims(&user).await.unwrap(), vec![kept]);
}

// ── sea-orm store ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_remove_claims_one_at_a_time_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    removes_claims_one_at_a_time(&users).await;
}

#[tokio::test]
async fn should_keep_other_users_claims_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    keeps_other_users_claims(&users).await;
}

#[tokio::test]
async fn should_replace_claim_in_place_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    replaces_claim_in_place(&users).await;
}

#[tokio::test]
async fn should_distinguish_claims_by_issuer_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    distinguishes_claims_by_issuer(&users).await;
}

#[tokio::test]
async fn should_find_users_by_full_claim_identity_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    finds_users_by_full_claim_identity(&users).await;
}

// ── in-memory store ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_remove_claims_one_at_a_time_in_memory() {
    let (users, _) = memory_managers();
    removes_claims_one_at_a_time(&users).await;
}

#[tokio::test]
async fn should_keep_other_users_claims_in_memory() {
    let (users, _) = memory_managers();
    keeps_other_users_claims(&users).await;
}

#[tokio::test]
async fn should_replace_claim_in_place_in_memory() {
    let (users, _) = memory_managers();
    replaces_claim_in_place(&users).await;
}

#[tokio::test]
async fn should_distinguish_claims_by_issuer_in_memory() {
    let (users, _) = memory_managers();
    distinguishes_claims_by_issuer(&users).await;
}

#[tokio::test]
async fn should_find_users_by_full_claim_identity_in_memory() {
    let (users, _) = memory_managers();
    finds_users_by_full_claim_identity(&users).await;
}

#[tokio::test]
async fn should_ignore_removal_of_missing_claim_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    ignores_removal_of_missing_claim(&users).await;
}

#[tokio::test]
async fn should_ignore_removal_of_missing_claim_in_memory() {
    let (users, _) = memory_managers();
    ignores_removal_of_missing_claim(&users).await;
}
