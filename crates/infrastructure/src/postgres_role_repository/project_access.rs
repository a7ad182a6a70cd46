use super::*;

impl PostgresRoleRepository {
    pub(super) async fn project_access_impl(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Option<AccessLevel>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT access_level
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load project access: {error}")))?;

        value
            .map(|value| {
                AccessLevel::from_str(value.as_str()).map_err(|_| {
                    AppError::Internal(format!("invalid stored access level '{value}'"))
                })
            })
            .transpose()
    }

    pub(super) async fn set_project_access_impl(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        access_level: AccessLevel,
    ) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id, access_level)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, user_id) DO UPDATE
            SET access_level = EXCLUDED.access_level,
                updated_at = now()
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(access_level.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_membership_write_error(error, "store project access"))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn remove_project_access_impl(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove project access: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}
