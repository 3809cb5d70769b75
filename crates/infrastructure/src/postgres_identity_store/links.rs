use super::*;

impl PostgresIdentityTransaction {
    pub(super) async fn roles_of_user_impl(&mut self, user_id: UserId) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, NamedRow>(
            r#"
            SELECT roles.id, roles.name, roles.description
            FROM roles
            INNER JOIN user_roles ON user_roles.role_id = roles.id
            WHERE user_roles.user_id = $1
            ORDER BY roles.id
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "list roles of user"))?
        .into_iter()
        .map(NamedRow::into_role)
        .collect()
    }

    pub(super) async fn users_with_role_impl(&mut self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM user_roles WHERE role_id = $1 ORDER BY user_id",
        )
        .bind(role_id.as_i64())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "list role holders"))?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }

    pub(super) async fn link_user_role_impl(
        &mut self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_i64())
        .bind(role_id.as_i64())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "assign role to user"))?;

        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn unlink_user_role_impl(
        &mut self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id.as_i64())
            .bind(role_id.as_i64())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "unassign role from user"))?;

        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn unlink_role_from_all_users_impl(&mut self, role_id: RoleId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_roles WHERE role_id = $1")
            .bind(role_id.as_i64())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "strip role from users"))?;

        Ok(result.rows_affected())
    }

    pub(super) async fn permissions_of_user_impl(
        &mut self,
        user_id: UserId,
    ) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, NamedRow>(
            r#"
            SELECT permissions.id, permissions.name, permissions.description
            FROM permissions
            INNER JOIN user_permissions ON user_permissions.permission_id = permissions.id
            WHERE user_permissions.user_id = $1
            ORDER BY permissions.id
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "list permissions of user"))?
        .into_iter()
        .map(NamedRow::into_permission)
        .collect()
    }

    pub(super) async fn users_with_permission_impl(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM user_permissions WHERE permission_id = $1 ORDER BY user_id",
        )
        .bind(permission_id.as_i64())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "list permission holders"))?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }

    pub(super) async fn link_user_permissions_impl(
        &mut self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        if permission_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, permission_id)
            SELECT $1, permission_id
            FROM UNNEST($2::BIGINT[]) AS requested(permission_id)
            ON CONFLICT (user_id, permission_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_i64())
        .bind(raw_ids(permission_ids, PermissionId::as_i64))
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "assign permissions to user"))?;

        Ok(result.rows_affected())
    }

    pub(super) async fn unlink_user_permissions_impl(
        &mut self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        if permission_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "DELETE FROM user_permissions WHERE user_id = $1 AND permission_id = ANY($2)",
        )
        .bind(user_id.as_i64())
        .bind(raw_ids(permission_ids, PermissionId::as_i64))
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "unassign permissions from user"))?;

        Ok(result.rows_affected())
    }

    pub(super) async fn clear_user_permissions_impl(&mut self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_permissions WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "clear user permissions"))?;

        Ok(result.rows_affected())
    }

    pub(super) async fn unlink_permission_from_all_users_impl(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_permissions WHERE permission_id = $1")
            .bind(permission_id.as_i64())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "strip permission from users"))?;

        Ok(result.rows_affected())
    }

    pub(super) async fn permissions_of_role_impl(
        &mut self,
        role_id: RoleId,
    ) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, NamedRow>(
            r#"
            SELECT permissions.id, permissions.name, permissions.description
            FROM permissions
            INNER JOIN role_permissions ON role_permissions.permission_id = permissions.id
            WHERE role_permissions.role_id = $1
            ORDER BY permissions.id
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "list permissions of role"))?
        .into_iter()
        .map(NamedRow::into_permission)
        .collect()
    }

    pub(super) async fn roles_with_permission_impl(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<RoleId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT role_id FROM role_permissions WHERE permission_id = $1 ORDER BY role_id",
        )
        .bind(permission_id.as_i64())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "list roles with permission"))?;

        Ok(ids.into_iter().map(RoleId::new).collect())
    }

    pub(super) async fn link_role_permissions_impl(
        &mut self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        if permission_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, permission_id
            FROM UNNEST($2::BIGINT[]) AS requested(permission_id)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_i64())
        .bind(raw_ids(permission_ids, PermissionId::as_i64))
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "assign permissions to role"))?;

        Ok(result.rows_affected())
    }

    pub(super) async fn unlink_role_permission_impl(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2",
        )
        .bind(role_id.as_i64())
        .bind(permission_id.as_i64())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "unassign permission from role"))?;

        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn clear_role_permissions_impl(&mut self, role_id: RoleId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id.as_i64())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "clear role permissions"))?;

        Ok(result.rows_affected())
    }

    pub(super) async fn unlink_permission_from_all_roles_impl(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM role_permissions WHERE permission_id = $1")
            .bind(permission_id.as_i64())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "strip permission from roles"))?;

        Ok(result.rows_affected())
    }

    pub(super) async fn link_permissions_to_users_impl(
        &mut self,
        user_ids: &[UserId],
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        if user_ids.is_empty() || permission_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, permission_id)
            SELECT holders.user_id, granted.permission_id
            FROM UNNEST($1::BIGINT[]) AS holders(user_id)
            CROSS JOIN UNNEST($2::BIGINT[]) AS granted(permission_id)
            ON CONFLICT (user_id, permission_id) DO NOTHING
            "#,
        )
        .bind(raw_ids(user_ids, UserId::as_i64))
        .bind(raw_ids(permission_ids, PermissionId::as_i64))
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "propagate permissions to users"))?;

        Ok(result.rows_affected())
    }
}
