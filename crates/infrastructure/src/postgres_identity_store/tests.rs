use std::sync::Arc;

use rolegate_application::{
    CreateUserInput, IdentityService, IdentityStore, NamedEntityInput, PasswordHasher,
    RoleRevocation, SyncService, UserDetails,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Permission, PermissionId, Role, UserId};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresIdentityStore;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("plain:{password}"))
    }
}

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres identity store tests: {error}");
    }

    Some(pool)
}

/// Names are unique per run since tests share one database.
fn unique(prefix: &str) -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    format!("{prefix}-{nanos}")
}

struct Services {
    identity: IdentityService,
    sync: SyncService,
}

async fn services(pool: &PgPool) -> AppResult<Services> {
    let store: Arc<dyn IdentityStore> = Arc::new(PostgresIdentityStore::new(pool.clone()));
    let default_role = unique("pg-default");
    let identity = IdentityService::new(store.clone(), Arc::new(PlainHasher), default_role.clone());
    identity.ensure_role(&default_role, None).await?;

    Ok(Services {
        sync: SyncService::new(store, RoleRevocation::Cascade),
        identity,
    })
}

impl Services {
    async fn user(&self, prefix: &str) -> AppResult<UserDetails> {
        self.identity
            .create_user(CreateUserInput {
                email: format!("{}@example.com", unique(prefix)),
                firstname: "Postgres".to_owned(),
                lastname: "User".to_owned(),
                password: "correct horse battery".to_owned(),
            })
            .await
    }

    async fn role(&self, prefix: &str) -> AppResult<Role> {
        self.identity
            .create_role(NamedEntityInput {
                name: unique(prefix),
                description: None,
            })
            .await
    }

    async fn permission(&self, prefix: &str) -> AppResult<Permission> {
        self.identity
            .create_permission(NamedEntityInput {
                name: unique(prefix),
                description: Some("created by postgres tests".to_owned()),
            })
            .await
    }
}

async fn count_rows(pool: &PgPool, sql: &str, id: i64) -> i64 {
    match sqlx::query_scalar::<_, i64>(sql).bind(id).fetch_one(pool).await {
        Ok(count) => count,
        Err(error) => panic!("failed to count rows: {error}"),
    }
}

async fn direct_grants(pool: &PgPool, user_id: UserId, permission_id: PermissionId) -> i64 {
    let counted = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM user_permissions
        WHERE user_id = $1 AND permission_id = $2
        "#,
    )
    .bind(user_id.as_i64())
    .bind(permission_id.as_i64())
    .fetch_one(pool)
    .await;

    match counted {
        Ok(count) => count,
        Err(error) => panic!("failed to count grants: {error}"),
    }
}

#[tokio::test]
async fn role_sync_propagates_to_holders_without_duplicate_rows() -> AppResult<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let services = services(&pool).await?;

    let role = services.role("pg-editor").await?;
    let publish = services.permission("pg-publish").await?;
    let review = services.permission("pg-review").await?;
    let first = services.user("pg-first").await?;
    let second = services.user("pg-second").await?;
    services
        .sync
        .assign_permission_to_user(publish.id(), first.user.id())
        .await?;
    for user in [&first, &second] {
        services
            .sync
            .assign_role_to_user(role.id(), user.user.id())
            .await?;
    }

    let details = services
        .sync
        .sync_role_permissions(role.id(), &[publish.id(), review.id(), publish.id()])
        .await?;
    assert_eq!(details.permissions.len(), 2);
    assert_eq!(details.user_ids.len(), 2);

    let again = services
        .sync
        .propagate_role_permissions(role.id(), &[publish.id(), review.id()])
        .await?;
    assert_eq!(again, 0);

    for user in [&first, &second] {
        for permission in [&publish, &review] {
            assert_eq!(direct_grants(&pool, user.user.id(), permission.id()).await, 1);
        }
    }
    Ok(())
}

#[tokio::test]
async fn assigning_twice_keeps_a_single_link_row() -> AppResult<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let services = services(&pool).await?;

    let role = services.role("pg-twice").await?;
    let user = services.user("pg-twice").await?;
    for _ in 0..2 {
        services
            .sync
            .assign_role_to_user(role.id(), user.user.id())
            .await?;
    }

    let links = count_rows(
        &pool,
        "SELECT COUNT(*) FROM user_roles WHERE role_id = $1",
        role.id().as_i64(),
    )
    .await;
    assert_eq!(links, 1);
    Ok(())
}

#[tokio::test]
async fn duplicate_names_and_emails_map_to_conflict() -> AppResult<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let services = services(&pool).await?;

    let role = services.role("pg-duplicate").await?;
    let duplicate_role = services
        .identity
        .create_role(NamedEntityInput {
            name: role.name().as_str().to_owned(),
            description: None,
        })
        .await;
    assert!(matches!(duplicate_role, Err(AppError::Conflict(_))));

    let user = services.user("pg-duplicate").await?;
    let duplicate_user = services
        .identity
        .create_user(CreateUserInput {
            email: user.user.email().as_str().to_owned(),
            firstname: "Other".to_owned(),
            lastname: "User".to_owned(),
            password: "correct horse battery".to_owned(),
        })
        .await;
    assert!(matches!(duplicate_user, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn deleting_a_permission_removes_every_link_row() -> AppResult<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let services = services(&pool).await?;

    let role = services.role("pg-linked").await?;
    let permission = services.permission("pg-linked").await?;
    let user = services.user("pg-linked").await?;
    services
        .sync
        .assign_permission_to_role(permission.id(), role.id())
        .await?;
    services
        .sync
        .assign_role_to_user(role.id(), user.user.id())
        .await?;

    services.identity.delete_permission(permission.id()).await?;

    let permission_id = permission.id().as_i64();
    let role_links = count_rows(
        &pool,
        "SELECT COUNT(*) FROM role_permissions WHERE permission_id = $1",
        permission_id,
    )
    .await;
    let user_links = count_rows(
        &pool,
        "SELECT COUNT(*) FROM user_permissions WHERE permission_id = $1",
        permission_id,
    )
    .await;
    let rows = count_rows(
        &pool,
        "SELECT COUNT(*) FROM permissions WHERE id = $1",
        permission_id,
    )
    .await;
    assert_eq!((role_links, user_links, rows), (0, 0, 0));

    let unassigned = services
        .sync
        .unassign_permission_from_user(permission.id(), user.user.id())
        .await?;
    assert!(unassigned.permissions.is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_a_role_detaches_it_before_removing_the_row() -> AppResult<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let services = services(&pool).await?;

    let role = services.role("pg-retired").await?;
    let permission = services.permission("pg-retired").await?;
    let user = services.user("pg-retired").await?;
    services
        .sync
        .assign_permission_to_role(permission.id(), role.id())
        .await?;
    services
        .sync
        .assign_role_to_user(role.id(), user.user.id())
        .await?;

    services.identity.delete_role(role.id()).await?;

    let role_id = role.id().as_i64();
    let holders = count_rows(
        &pool,
        "SELECT COUNT(*) FROM user_roles WHERE role_id = $1",
        role_id,
    )
    .await;
    let links = count_rows(
        &pool,
        "SELECT COUNT(*) FROM role_permissions WHERE role_id = $1",
        role_id,
    )
    .await;
    assert_eq!((holders, links), (0, 0));

    let details = services
        .sync
        .unassign_role_from_user(role.id(), user.user.id())
        .await?;
    assert!(details.roles.iter().all(|held| held.id() != role.id()));
    Ok(())
}

#[tokio::test]
async fn dropped_transaction_rolls_back() -> AppResult<()> {
    let Some(pool) = test_pool().await else {
        return Ok(());
    };
    let store = PostgresIdentityStore::new(pool);
    let name = unique("pg-rollback");

    let mut transaction = store.begin().await?;
    transaction.insert_role(&name, None).await?;
    drop(transaction);

    let mut transaction = store.begin().await?;
    assert!(transaction.find_role_by_name(&name).await?.is_none());
    Ok(())
}
