use super::*;

impl PostgresIdentityTransaction {
    pub(super) async fn insert_permission_impl(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        sqlx::query_as::<_, NamedRow>(
            r#"
            INSERT INTO permissions (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&mut *self.transaction)
        .await
        .map_err(|error| {
            conflict_or_storage(
                error,
                format!("permission '{name}' already exists"),
                "insert permission",
            )
        })?
        .into_permission()
    }

    pub(super) async fn find_permission_impl(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description FROM permissions WHERE id = $1",
        )
        .bind(permission_id.as_i64())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "find permission"))?
        .map(NamedRow::into_permission)
        .transpose()
    }

    pub(super) async fn find_permission_by_name_impl(
        &mut self,
        name: &str,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, NamedRow>(
            "SELECT id, name, description FROM permissions WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "find permission by name"))?
        .map(NamedRow::into_permission)
        .transpose()
    }

    pub(super) async fn list_permissions_impl(&mut self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, NamedRow>("SELECT id, name, description FROM permissions ORDER BY id")
            .fetch_all(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "list permissions"))?
            .into_iter()
            .map(NamedRow::into_permission)
            .collect()
    }

    pub(super) async fn permissions_by_ids_impl(
        &mut self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        if permission_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, NamedRow>(
            r#"
            SELECT id, name, description
            FROM permissions
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(raw_ids(permission_ids, PermissionId::as_i64))
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "load permissions"))?
        .into_iter()
        .map(NamedRow::into_permission)
        .collect()
    }

    pub(super) async fn update_permission_impl(&mut self, permission: &Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE permissions
            SET name = $2, description = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(permission.id().as_i64())
        .bind(permission.name().as_str())
        .bind(permission.description())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            conflict_or_storage(
                error,
                format!("permission '{}' already exists", permission.name().as_str()),
                "update permission",
            )
        })?;

        Ok(())
    }

    pub(super) async fn delete_permission_impl(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(permission_id.as_i64())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "delete permission"))?;

        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn permission_ids_by_names_impl(
        &mut self,
        names: &[String],
    ) -> AppResult<Vec<PermissionId>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM permissions WHERE name = ANY($1) ORDER BY id",
        )
        .bind(names)
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "resolve permission names"))?;

        Ok(ids.into_iter().map(PermissionId::new).collect())
    }
}
