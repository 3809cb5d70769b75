use super::*;

impl PostgresIdentityTransaction {
    pub(super) async fn insert_user_impl(&mut self, record: &NewUserRecord) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, firstname, lastname, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, firstname, lastname, password_hash, session_token
            "#,
        )
        .bind(record.email.as_str())
        .bind(record.firstname.as_str())
        .bind(record.lastname.as_str())
        .bind(record.password_hash.as_str())
        .fetch_one(&mut *self.transaction)
        .await
        .map_err(|error| {
            conflict_or_storage(
                error,
                format!("an account with email '{}' already exists", record.email.as_str()),
                "insert user",
            )
        })?;

        Ok(row.into_stored()?.user)
    }

    pub(super) async fn find_user_impl(&mut self, user_id: UserId) -> AppResult<Option<StoredUser>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, firstname, lastname, password_hash, session_token
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "find user"))?
        .map(UserRow::into_stored)
        .transpose()
    }

    pub(super) async fn find_user_by_email_impl(
        &mut self,
        email: &EmailAddress,
    ) -> AppResult<Option<StoredUser>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, firstname, lastname, password_hash, session_token
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "find user by email"))?
        .map(UserRow::into_stored)
        .transpose()
    }

    pub(super) async fn list_users_impl(&mut self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, firstname, lastname, password_hash, session_token
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "list users"))?;

        rows.into_iter()
            .map(|row| row.into_stored().map(|stored| stored.user))
            .collect()
    }

    pub(super) async fn update_user_impl(&mut self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, firstname = $3, lastname = $4, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user.id().as_i64())
        .bind(user.email().as_str())
        .bind(user.firstname().as_str())
        .bind(user.lastname().as_str())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            conflict_or_storage(
                error,
                format!("an account with email '{}' already exists", user.email().as_str()),
                "update user",
            )
        })?;

        Ok(())
    }

    pub(super) async fn set_password_hash_impl(
        &mut self,
        user_id: UserId,
        password_hash: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .bind(password_hash)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "update password"))?;

        Ok(())
    }

    pub(super) async fn set_session_token_impl(
        &mut self,
        user_id: UserId,
        session_token: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET session_token = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .bind(session_token)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| storage_error(error, "update session token"))?;

        Ok(())
    }

    pub(super) async fn delete_user_impl(&mut self, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.as_i64())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| storage_error(error, "delete user"))?;

        Ok(result.rows_affected() > 0)
    }
}
