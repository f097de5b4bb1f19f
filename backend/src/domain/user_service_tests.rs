//! Behavioural coverage for the user service over mocked ports.

use std::sync::Arc;

use super::UserService;
use crate::domain::ErrorCode;
use crate::domain::identity::{CallerIdentity, LoginCredentials};
use crate::domain::ports::{
    ChangePasswordRequest, LoginService, MockPasswordHasher, MockUserRepository, RegisterRequest,
    UserCommand, UserPersistenceError, UserQuery,
};
use crate::domain::user::{EmailAddress, Office, Role, User, UserId};

fn sample_user() -> User {
    User::new(
        UserId::random(),
        "Ana",
        EmailAddress::new("ana@x.example").expect("valid email"),
        "stored-hash",
        Role::User,
        Office::Malaga,
    )
    .expect("valid user")
}

fn caller(role: Role) -> CallerIdentity {
    CallerIdentity {
        user_id: UserId::random(),
        name: "Ana".to_owned(),
        email: EmailAddress::new("ana@x.example").expect("valid email"),
        role,
        office: Office::Malaga,
    }
}

fn register_request() -> RegisterRequest {
    RegisterRequest {
        name: "Ana".to_owned(),
        email: "a@x.example".to_owned(),
        password: "secret".to_owned(),
        role: "user".to_owned(),
        office: "Malaga".to_owned(),
    }
}

fn service(repo: MockUserRepository, hasher: MockPasswordHasher) -> UserService {
    UserService::new(Arc::new(repo), Arc::new(hasher))
}

#[tokio::test]
async fn register_rejects_unknown_role() {
    let svc = service(MockUserRepository::new(), MockPasswordHasher::new());
    let err = svc
        .register(RegisterRequest {
            role: "ghost".to_owned(),
            ..register_request()
        })
        .await
        .expect_err("unknown role must fail");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message, "role not valid");
}

#[tokio::test]
async fn register_rejects_unknown_office() {
    let svc = service(MockUserRepository::new(), MockPasswordHasher::new());
    let err = svc
        .register(RegisterRequest {
            office: "Atlantis".to_owned(),
            ..register_request()
        })
        .await
        .expect_err("unknown office must fail");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message, "office not valid");
}

#[tokio::test]
async fn register_hashes_password_before_persisting() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password == "secret")
        .times(1)
        .returning(|_| Ok("argon2id$fake".to_owned()));

    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .withf(|user| user.password_hash() == "argon2id$fake")
        .times(1)
        .returning(|_| Ok(()));

    let svc = service(repo, hasher);
    let summary = svc.register(register_request()).await.expect("registered");
    assert_eq!(summary.email.as_ref(), "a@x.example");
    assert_eq!(summary.role, Role::User);
}

#[tokio::test]
async fn register_conflicts_on_duplicate_email() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok("argon2id$fake".to_owned()));

    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .times(1)
        .returning(|_| Err(UserPersistenceError::DuplicateEmail));

    let svc = service(repo, hasher);
    let err = svc
        .register(register_request())
        .await
        .expect_err("duplicate email conflicts");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn authenticate_unknown_email_is_unauthorised() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().times(1).returning(|_| Ok(None));

    let svc = service(repo, MockPasswordHasher::new());
    let creds = LoginCredentials::try_from_parts("ghost@x.example", "pw").expect("creds shape");
    let err = svc.authenticate(&creds).await.expect_err("unknown email");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn authenticate_wrong_password_is_unauthorised() {
    let user = sample_user();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .returning(move |_| Ok(Some(user.clone())));

    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().times(1).returning(|_, _| Ok(false));

    let svc = service(repo, hasher);
    let creds = LoginCredentials::try_from_parts("ana@x.example", "wrong").expect("creds shape");
    let err = svc.authenticate(&creds).await.expect_err("wrong password");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn authenticate_returns_the_account_id() {
    let user = sample_user();
    let expected = user.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .returning(move |_| Ok(Some(user.clone())));

    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .withf(|password, hash| password == "secret" && hash == "stored-hash")
        .times(1)
        .returning(|_, _| Ok(true));

    let svc = service(repo, hasher);
    let creds = LoginCredentials::try_from_parts("ana@x.example", "secret").expect("creds shape");
    let id = svc.authenticate(&creds).await.expect("authenticated");

    assert_eq!(id, expected);
}

#[tokio::test]
async fn identity_for_a_stale_session_fails_closed() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).returning(|_| Ok(None));

    let svc = service(repo, MockPasswordHasher::new());
    let err = svc
        .identity(&UserId::random())
        .await
        .expect_err("stale session");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn list_users_requires_admin() {
    let svc = service(MockUserRepository::new(), MockPasswordHasher::new());
    let err = svc
        .list_users(&caller(Role::Tecnico))
        .await
        .expect_err("non-admin listing");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn list_users_returns_summaries_for_admin() {
    let mut repo = MockUserRepository::new();
    repo.expect_list_all()
        .times(1)
        .returning(|| Ok(vec![sample_user(), sample_user()]));

    let svc = service(repo, MockPasswordHasher::new());
    let users = svc
        .list_users(&caller(Role::Admin))
        .await
        .expect("admin listing");

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Ana");
}

#[tokio::test]
async fn change_password_rejects_incorrect_current_password() {
    let user = sample_user();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(user.clone())));
    repo.expect_update_password_hash().times(0);

    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().times(1).returning(|_, _| Ok(false));

    let svc = service(repo, hasher);
    let err = svc
        .change_password(
            &caller(Role::User),
            ChangePasswordRequest {
                current_password: "wrong".to_owned(),
                new_password: "next".to_owned(),
            },
        )
        .await
        .expect_err("wrong current password");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message, "incorrect current password");
}

#[tokio::test]
async fn change_password_rehashes_and_persists() {
    let user = sample_user();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(user.clone())));
    repo.expect_update_password_hash()
        .withf(|_, hash| hash == "argon2id$new")
        .times(1)
        .returning(|_, _| Ok(true));

    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .withf(|password, _| password == "old")
        .times(1)
        .returning(|_, _| Ok(true));
    hasher
        .expect_hash()
        .withf(|password| password == "next")
        .times(1)
        .returning(|_| Ok("argon2id$new".to_owned()));

    let svc = service(repo, hasher);
    svc.change_password(
        &caller(Role::User),
        ChangePasswordRequest {
            current_password: "old".to_owned(),
            new_password: "next".to_owned(),
        },
    )
    .await
    .expect("password changed");
}

#[tokio::test]
async fn delete_user_requires_admin() {
    let svc = service(MockUserRepository::new(), MockPasswordHasher::new());
    let err = svc
        .delete_user(&caller(Role::User), &UserId::random())
        .await
        .expect_err("non-admin delete");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn delete_missing_user_is_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_delete().times(1).returning(|_| Ok(false));

    let svc = service(repo, MockPasswordHasher::new());
    let err = svc
        .delete_user(&caller(Role::Admin), &UserId::random())
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::NotFound);
}
