use chrono::{Duration, Utc};

use identity_store::config::{IdentityOptions, LockoutOptions};
use identity_store::infra::db::DbUserStore;
use identity_store::usecase::user_manager::UserManager;
use identity_testing::assertions::{assert_failed_with, assert_succeeded};
use identity_testing::fixture::TestDatabase;

use crate::helpers::create_user;

fn options(allowed_for_new_users: bool) -> IdentityOptions {
    IdentityOptions {
        lockout: LockoutOptions {
            max_failed_access_attempts: 3,
            default_lockout_timespan: Duration::minutes(15),
            allowed_for_new_users,
        },
    }
}

#[tokio::test]
async fn should_lock_out_after_repeated_failures() {
    let fixture = TestDatabase::new().await;
    let users = UserManager::new(DbUserStore::new(fixture.conn()), options(true));
    let mut user = create_user(&users, "locked").await;

    for _ in 0..2 {
        assert_succeeded(&users.access_failed(&mut user).await.unwrap());
    }
    let stored = users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.access_failed_count, 2);
    assert!(!users.is_locked_out(&stored));

    assert_succeeded(&users.access_failed(&mut user).await.unwrap());

    let stored = users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(users.is_locked_out(&stored));
    assert_eq!(stored.access_failed_count, 0);
    assert!(stored.lockout_end.unwrap() > Utc::now() + Duration::minutes(14));
}

#[tokio::test]
async fn should_unlock_when_lockout_end_cleared() {
    let fixture = TestDatabase::new().await;
    let users = UserManager::new(DbUserStore::new(fixture.conn()), options(true));
    let mut user = create_user(&users, "paused").await;

    users
        .set_lockout_end_date(&mut user, Some(Utc::now() + Duration::hours(1)))
        .await
        .unwrap();
    assert!(users.is_locked_out(&users.find_by_id(user.id).await.unwrap().unwrap()));

    users.set_lockout_end_date(&mut user, None).await.unwrap();
    assert!(!users.is_locked_out(&users.find_by_id(user.id).await.unwrap().unwrap()));
}

#[tokio::test]
async fn should_refuse_lockout_for_users_without_lockout() {
    let fixture = TestDatabase::new().await;
    let users = UserManager::new(DbUserStore::new(fixture.conn()), options(false));
    let mut user = create_user(&users, "exempt").await;
    assert!(!user.lockout_enabled);

    let result = users
        .set_lockout_end_date(&mut user, Some(Utc::now() + Duration::hours(1)))
        .await
        .unwrap();

    assert_failed_with(&result, "USER_LOCKOUT_NOT_ENABLED");
}

#[tokio::test]
async fn should_reset_failed_count() {
    let fixture = TestDatabase::new().await;
    let users = UserManager::new(DbUserStore::new(fixture.conn()), options(true));
    let mut user = create_user(&users, "retry").await;
    users.access_failed(&mut user).await.unwrap();

    assert_succeeded(&users.reset_access_failed_count(&mut user).await.unwrap());

    let stored = users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.access_failed_count, 0);
}
