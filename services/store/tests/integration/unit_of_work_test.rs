use sea_orm::TransactionTrait;

use identity_domain::claim::Claim;
use identity_store::config::IdentityOptions;
use identity_store::infra::db::DbUserStore;
use identity_store::usecase::user_manager::UserManager;
use identity_testing::assertions::assert_succeeded;
use identity_testing::builders::test_user;
use identity_testing::fixture::TestDatabase;

use crate::helpers::db_managers;

#[tokio::test]
async fn should_discard_writes_when_transaction_rolls_back() {
    let fixture = TestDatabase::new().await;
    let txn = fixture.db.begin().await.unwrap();
    let scoped = UserManager::new(DbUserStore::new(txn), IdentityOptions::default());

    let mut user = test_user("ghost");
    assert_succeeded(&scoped.create(&mut user).await.unwrap());
    scoped
        .add_claim(&mut user, &Claim::new("c", "v"))
        .await
        .unwrap();
    assert!(scoped.find_by_id(user.id).await.unwrap().is_some());

    scoped.store.into_inner().rollback().await.unwrap();

    let (users, _) = db_managers(&fixture);
    assert!(users.find_by_id(user.id).await.unwrap().is_none());
    assert!(users.get_claims(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_keep_writes_when_transaction_commits() {
    let fixture = TestDatabase::new().await;
    let txn = fixture.db.begin().await.unwrap();
    let scoped = UserManager::new(DbUserStore::new(txn), IdentityOptions::default());

    let mut user = test_user("kept");
    assert_succeeded(&scoped.create(&mut user).await.unwrap());
    let mut doomed = test_user("doomed");
    assert_succeeded(&scoped.create(&mut doomed).await.unwrap());
    // Nested delete runs on a savepoint inside the caller's transaction.
    assert_succeeded(&scoped.delete(&doomed).await.unwrap());

    scoped.store.into_inner().commit().await.unwrap();

    let (users, _) = db_managers(&fixture);
    assert_eq!(
        users.find_by_id(user.id).await.unwrap().map(|u| u.user_name),
        Some(user.user_name)
    );
    assert!(users.find_by_id(doomed.id).await.unwrap().is_none());
}
