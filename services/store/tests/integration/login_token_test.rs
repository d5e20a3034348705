use sea_orm::EntityTrait;

use identity_domain::extensions::Extensions;
use identity_domain::login::UserLoginInfo;
use identity_store::domain::repository::{UserLoginStore, UserTokenStore};
use identity_store::usecase::user_manager::UserManager;
use identity_store_schema::{user_logins, user_tokens};
use identity_testing::assertions::{assert_failed_with, assert_succeeded};
use identity_testing::fixture::TestDatabase;

use crate::helpers::{LOGIN_CONTEXT, TOKEN_STUFF, create_user, db_managers, memory_managers};

async fn logins_round_trip<S: UserLoginStore>(users: &UserManager<S>) {
    let mut user = create_user(users, "login").await;
    let github = UserLoginInfo::new("github", "1001", Some("GitHub".into()));
    let google = UserLoginInfo::new("google", "2002", None);

    assert_succeeded(&users.add_login(&mut user, &github).await.unwrap());
    assert_succeeded(&users.add_login(&mut user, &google).await.unwrap());

    assert_eq!(
        users.get_logins(&user).await.unwrap(),
        vec![github.clone(), google.clone()]
    );
    assert_eq!(
        users
            .find_by_login("github", "1001")
            .await
            .unwrap()
            .map(|u| u.id),
        Some(user.id)
    );

    assert_succeeded(
        &users
            .remove_login(&mut user, "github", "1001")
            .await
            .unwrap(),
    );
    assert_eq!(users.get_logins(&user).await.unwrap(), vec![google]);
    assert!(users.find_by_login("github", "1001").await.unwrap().is_none());
}

async fn rejects_login_bound_elsewhere<S: UserLoginStore>(users: &UserManager<S>) {
    let mut a = create_user(users, "a").await;
    let mut b = create_user(users, "b").await;
    let login = UserLoginInfo::new("github", "shared", None);
    users.add_login(&mut a, &login).await.unwrap();

    assert_failed_with(
        &users.add_login(&mut b, &login).await.unwrap(),
        "LOGIN_ALREADY_ASSOCIATED",
    );
    assert!(users.get_logins(&b).await.unwrap().is_empty());
}

async fn ignores_removal_of_unknown_login<S: UserLoginStore>(users: &UserManager<S>) {
    let mut owner = create_user(users, "owner").await;
    let mut other = create_user(users, "other").await;
    let github = UserLoginInfo::new("github", "1001", None);
    users.add_login(&mut owner, &github).await.unwrap();

    assert_succeeded(
        &users
            .remove_login(&mut owner, "github", "9999")
            .await
            .unwrap(),
    );
    assert_succeeded(
        &users
            .remove_login(&mut other, "github", "1001")
            .await
            .unwrap(),
    );

    assert_eq!(users.get_logins(&owner).await.unwrap(), vec![github]);
    assert_eq!(
        users
            .find_by_login("github", "1001")
            .await
            .unwrap()
            .map(|u| u.id),
        Some(owner.id)
    );
}

async fn tokens_round_trip<S: UserTokenStore>(users: &UserManager<S>) {
    let mut user = create_user(users, "token").await;

    users
        .set_authentication_token(&mut user, "github", "refresh", "first")
        .await
        .unwrap();
    users
        .set_authentication_token(&mut user, "github", "refresh", "second")
        .await
        .unwrap();

    assert_eq!(
        users
            .get_authentication_token(&user, "github", "refresh")
            .await
            .unwrap()
            .as_deref(),
        Some("second")
    );
    assert!(
        users
            .get_authentication_token(&user, "github", "access")
            .await
            .unwrap()
            .is_none()
    );

    users
        .remove_authentication_token(&mut user, "github", "refresh")
        .await
        .unwrap();
    assert!(
        users
            .get_authentication_token(&user, "github", "refresh")
            .await
            .unwrap()
            .is_none()
    );
    // Removing again is a no-op.
    assert_succeeded(
        &users
            .remove_authentication_token(&mut user, "github", "refresh")
            .await
            .unwrap(),
    );
}

#[tokio::test]
async fn should_round_trip_logins_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    logins_round_trip(&users).await;
}

#[tokio::test]
async fn should_round_trip_logins_in_memory() {
    let (users, _) = memory_managers();
    logins_round_trip(&users).await;
}

#[tokio::test]
async fn should_reject_login_bound_elsewhere_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    rejects_login_bound_elsewhere(&users).await;
}

#[tokio::test]
async fn should_reject_login_bound_elsewhere_in_memory() {
    let (users, _) = memory_managers();
    rejects_login_bound_elsewhere(&users).await;
}

#[tokio::test]
async fn should_ignore_removal_of_unknown_login_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    ignores_removal_of_unknown_login(&users).await;
}

#[tokio::test]
async fn should_ignore_removal_of_unknown_login_in_memory() {
    let (users, _) = memory_managers();
    ignores_removal_of_unknown_login(&users).await;
}

#[tokio::test]
async fn should_round_trip_tokens_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    tokens_round_trip(&users).await;
}

#[tokio::test]
async fn should_round_trip_tokens_in_memory() {
    let (users, _) = memory_managers();
    tokens_round_trip(&users).await;
}

#[tokio::test]
async fn should_persist_login_and_token_extensions() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    let mut user = create_user(&users, "ext").await;
    users
        .add_login(&mut user, &UserLoginInfo::new("github", "7", None))
        .await
        .unwrap();
    users
        .set_authentication_token(&mut user, "github", "refresh", "t")
        .await
        .unwrap();

    let db = fixture.conn();
    let login = user_logins::Entity::find_by_id(("github".to_owned(), "7".to_owned()))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let ext = Extensions::from_json_str(&login.extensions).unwrap();
    assert_eq!(ext.get_str(LOGIN_CONTEXT), Some("integration"));

    let token = user_tokens::Entity::find_by_id((user.id, "github".to_owned(), "refresh".to_owned()))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let ext = Extensions::from_json_str(&token.extensions).unwrap();
    assert_eq!(ext.get_str(TOKEN_STUFF), Some("extra"));
}
