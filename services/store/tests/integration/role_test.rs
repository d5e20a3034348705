use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use identity_domain::claim::Claim;
use identity_domain::extensions::Extensions;
use identity_domain::role::Role;
use identity_store::domain::repository::{RoleClaimStore, RoleStore, UserRoleStore};
use identity_store::error::StoreError;
use identity_store::usecase::role_manager::RoleManager;
use identity_store::usecase::user_manager::UserManager;
use identity_store_schema::{role_claims, user_roles};
use identity_testing::assertions::{assert_failed_with, assert_succeeded};
use identity_testing::fixture::TestDatabase;

use crate::helpers::{ROLE_CREATED, create_role, create_user, db_managers, memory_managers};

async fn membership_round_trip<U, R>(users: &UserManager<U>, roles: &RoleManager<R>)
where
    U: UserRoleStore,
    R: RoleClaimStore,
{
    let mut user = create_user(users, "member").await;
    let other = create_user(users, "other").await;
    let admin = create_role(roles, "admin").await;
    let editor = create_role(roles, "editor").await;

    assert_succeeded(&users.add_to_role(&mut user, &admin.name).await.unwrap());
    assert_succeeded(
        &users
            .add_to_role(&mut user, &editor.name.to_uppercase())
            .await
            .unwrap(),
    );

    assert!(users.is_in_role(&user, &admin.name).await.unwrap());
    assert!(!users.is_in_role(&other, &admin.name).await.unwrap());
    assert_eq!(
        users.get_roles(&user).await.unwrap(),
        vec![admin.name.clone(), editor.name.clone()]
    );
    let members: Vec<_> = users
        .get_users_in_role(&admin.name)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(members, vec![user.id]);

    assert_failed_with(
        &users.add_to_role(&mut user, &admin.name).await.unwrap(),
        "USER_ALREADY_IN_ROLE",
    );

    assert_succeeded(&users.remove_from_role(&mut user, &admin.name).await.unwrap());
    assert_eq!(users.get_roles(&user).await.unwrap(), vec![editor.name]);
    assert_failed_with(
        &users.remove_from_role(&mut user, &admin.name).await.unwrap(),
        "USER_NOT_IN_ROLE",
    );
}

async fn rejects_unknown_role<U: UserRoleStore>(users: &UserManager<U>) {
    let mut user = create_user(users, "lonely").await;

    let err = users.add_to_role(&mut user, "ghost").await.unwrap_err();

    assert!(matches!(err, StoreError::RoleNotFound(ref name) if name == "GHOST"));
    assert!(users.get_users_in_role("ghost").await.unwrap().is_empty());
}

async fn role_claims_keep_issuer<R: RoleClaimStore>(roles: &RoleManager<R>) {
    let mut role = create_role(roles, "ops").await;
    let first = Claim::new("perm", "deploy").with_issuer("ci");
    let second = Claim::new("perm", "deploy").with_issuer("cd");
    roles.add_claim(&mut role, &first).await.unwrap();
    roles.add_claim(&mut role, &second).await.unwrap();

    roles.remove_claim(&mut role, &first).await.unwrap();

    assert_eq!(roles.get_claims(&role).await.unwrap(), vec![second]);
}

#[tokio::test]
async fn should_manage_role_membership_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, roles) = db_managers(&fixture);
    membership_round_trip(&users, &roles).await;
}

#[tokio::test]
async fn should_manage_role_membership_in_memory() {
    let (users, roles) = memory_managers();
    membership_round_trip(&users, &roles).await;
}

#[tokio::test]
async fn should_reject_unknown_role_in_db() {
    let fixture = TestDatabase::new().await;
    let (users, _) = db_managers(&fixture);
    rejects_unknown_role(&users).await;
}

#[tokio::test]
async fn should_reject_unknown_role_in_memory() {
    let (users, _) = memory_managers();
    rejects_unknown_role(&users).await;
}

#[tokio::test]
async fn should_keep_role_claim_issuer_in_db() {
    let fixture = TestDatabase::new().await;
    let (_, roles) = db_managers(&fixture);
    role_claims_keep_issuer(&roles).await;
}

#[tokio::test]
async fn should_keep_role_claim_issuer_in_memory() {
    let (_, roles) = memory_managers();
    role_claims_keep_issuer(&roles).await;
}

async fn rejects_duplicate_role_name<R: RoleStore>(roles: &RoleManager<R>) {
    assert_succeeded(&roles.create(&mut Role::new("Admin")).await.unwrap());

    let mut duplicate = Role::new("admin");
    let result = roles.create(&mut duplicate).await.unwrap();

    assert_failed_with(&result, "DUPLICATE_ROLE_NAME");
    assert!(duplicate.id.is_nil());
    assert!(duplicate.concurrency_stamp.is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_role_name_in_db() {
    let fixture = TestDatabase::new().await;
    let (_, roles) = db_managers(&fixture);
    rejects_duplicate_role_name(&roles).await;
}

#[tokio::test]
async fn should_reject_duplicate_role_name_in_memory() {
    let (_, roles) = memory_managers();
    rejects_duplicate_role_name(&roles).await;
}

#[tokio::test]
async fn should_fail_stale_role_update() {
    let fixture = TestDatabase::new().await;
    let (_, roles) = db_managers(&fixture);
    let mut role = create_role(&roles, "auditor").await;
    let mut stale = role.clone();

    assert_succeeded(&roles.set_role_name(&mut role, "Reviewer").await.unwrap());

    assert_failed_with(
        &roles.set_role_name(&mut stale, "Inspector").await.unwrap(),
        "CONCURRENCY_FAILURE",
    );
    assert_eq!(
        roles.find_by_id(role.id).await.unwrap().map(|r| r.name),
        Some("Reviewer".to_owned())
    );
}

#[tokio::test]
async fn should_persist_role_link_extensions() {
    let fixture = TestDatabase::new().await;
    let (users, roles) = db_managers(&fixture);
    let mut user = create_user(&users, "linked").await;
    let role = create_role(&roles, "viewer").await;

    users.add_to_role(&mut user, &role.name).await.unwrap();

    let link = user_roles::Entity::find_by_id((user.id, role.id))
        .one(&fixture.conn())
        .await
        .unwrap()
        .unwrap();
    let ext = Extensions::from_json_str(&link.extensions).unwrap();
    assert!(ext.get_str(ROLE_CREATED).is_some());
}

#[tokio::test]
async fn should_cascade_role_delete() {
    let fixture = TestDatabase::new().await;
    let (users, roles) = db_managers(&fixture);
    let mut user = create_user(&users, "member").await;
    let mut role = create_role(&roles, "temp").await;
    roles
        .add_claim(&mut role, &Claim::new("perm", "x"))
        .await
        .unwrap();
    users.add_to_role(&mut user, &role.name).await.unwrap();

    assert_succeeded(&roles.delete(&role).await.unwrap());

    let db = fixture.conn();
    assert!(roles.find_by_id(role.id).await.unwrap().is_none());
    assert_eq!(
        role_claims::Entity::find()
            .filter(role_claims::Column::RoleId.eq(role.id))
            .count(&db)
            .await
            .unwrap(),
        0
    );
    assert!(users.get_roles(&user).await.unwrap().is_empty());
    assert!(users.find_by_id(user.id).await.unwrap().is_some());
}
