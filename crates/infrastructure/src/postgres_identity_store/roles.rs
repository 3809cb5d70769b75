use super::*;

impl PostgresIdentityTransaction {
    pub(super) async fn insert_role_impl(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Role> {
        sqlx::query_as::<_, NamedRow>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&mut *self.transaction)
        .await
        .map_err(|error| {
            conflict_or_storage(error, format!("role '{name}' already exists"), "insert role")
        })?
        .into_role()
    }

    pub(super) async fn find_role_impl(&mut self, role_id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, NamedRow>("SELECT id, name, description FROM roles WHERE id = $1")
            .bind(role_id.as_i64())
            .fetch_optional(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "find role"))?
            .map(NamedRow::into_role)
            .transpose()
    }

    pub(super) async fn find_role_by_name_impl(&mut self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, NamedRow>("SELECT id, name, description FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "find role by name"))?
            .map(NamedRow::into_role)
            .transpose()
    }

    pub(super) async fn list_roles_impl(&mut self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, NamedRow>("SELECT id, name, description FROM roles ORDER BY id")
            .fetch_all(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "list roles"))?
            .into_iter()
            .map(NamedRow::into_role)
            .collect()
    }

    pub(super) async fn update_role_impl(&mut self, role: &Role) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, description = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role.id().as_i64())
        .bind(role.name().as_str())
        .bind(role.description())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            conflict_or_storage(
                error,
                format!("role '{}' already exists", role.name().as_str()),
                "update role",
            )
        })?;

        Ok(())
    }

    pub(super) async fn delete_role_impl(&mut self, role_id: RoleId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id.as_i64())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "delete role"))?;

        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn role_ids_by_names_impl(&mut self, names: &[String]) -> AppResult<Vec<RoleId>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM roles WHERE name = ANY($1) ORDER BY id",
        )
        .bind(names)
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "resolve role names"))?;

        Ok(ids.into_iter().map(RoleId::new).collect())
    }
}
