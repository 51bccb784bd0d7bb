//! Integration tests for the user directory. Need a PostgreSQL server
//! (`DATABASE_URL`); each test runs in its own freshly migrated database.

use sqlx::PgPool;

use atelier_db::models::user::CreateUser;
use atelier_db::repositories::UserRepo;
use atelier_db::DbError;

fn create_input(username: &str, email: &str, role: &str) -> CreateUser {
    CreateUser {
        username: username.into(),
        email: email.into(),
        display_name: None,
        role: role.into(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_find_round_trips(pool: PgPool) {
    let created = UserRepo::create(&pool, &create_input("mika", "mika@example.com", "artist"))
        .await
        .unwrap();
    assert_eq!(created.username, "mika");
    assert_eq!(created.role, "artist");
    assert!(created.is_active);

    let found = UserRepo::find_by_id(&pool, created.id).await.unwrap();
    assert_eq!(found.unwrap().email, "mika@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_missing_returns_none(pool: PgPool) {
    assert!(UserRepo::find_by_id(&pool, 4242).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_hits_unique_constraint(pool: PgPool) {
    UserRepo::create(&pool, &create_input("first", "same@example.com", "client"))
        .await
        .unwrap();
    let err = UserRepo::create(&pool, &create_input("second", "same@example.com", "client"))
        .await
        .unwrap_err();
    match err {
        DbError::Sqlx(sqlx::Error::Database(db)) => {
            assert_eq!(db.constraint(), Some("uq_users_email"));
        }
        other => panic!("expected a unique violation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_role_rejected_by_check_constraint(pool: PgPool) {
    let result = UserRepo::create(&pool, &create_input("odd", "odd@example.com", "curator")).await;
    assert!(result.is_err());
}
