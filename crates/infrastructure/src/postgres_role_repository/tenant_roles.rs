use super::*;

impl PostgresRoleRepository {
    pub(super) async fn tenant_roles_impl(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<TenantRoleSet> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role
            FROM tenant_member_roles
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load tenant roles: {error}")))?;

        let roles = rows
            .iter()
            .map(|value| parse_stored_role(value))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(TenantRoleSet::from_stored(roles))
    }

    pub(super) async fn replace_tenant_roles_impl(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        roles: &TenantRoleSet,
    ) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            DELETE FROM tenant_member_roles
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear tenant roles: {error}")))?;

        for role in roles.iter() {
            sqlx::query(
                r#"
                INSERT INTO tenant_member_roles (tenant_id, user_id, role)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(tenant_id.as_uuid())
            .bind(user_id.as_uuid())
            .bind(role.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_membership_write_error(error, "store tenant role"))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn revoke_all_roles_impl(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let owner_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT owner_id
            FROM tenants
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load tenant owner: {error}")))?;

        if owner_id == Some(user_id.as_uuid()) {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' owns tenant '{tenant_id}' and cannot be revoked"
            )));
        }

        sqlx::query(
            r#"
            DELETE FROM project_members
            WHERE user_id = $2
                AND project_id IN (SELECT id FROM projects WHERE tenant_id = $1)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove project memberships: {error}"))
        })?;

        sqlx::query(
            r#"
            DELETE FROM tenant_member_roles
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke tenant roles: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn list_tenant_role_assignments_impl(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<TenantRoleAssignment>> {
        let rows = sqlx::query_as::<_, TenantRoleRow>(
            r#"
            SELECT user_id, role, granted_at
            FROM tenant_member_roles
            WHERE tenant_id = $1
            ORDER BY user_id, role
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list tenant role assignments: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(TenantRoleAssignment {
                    user_id: UserId::from_uuid(row.user_id),
                    role: parse_stored_role(row.role.as_str())?,
                    granted_at: row.granted_at,
                })
            })
            .collect()
    }
}

fn parse_stored_role(value: &str) -> AppResult<TenantRole> {
    TenantRole::from_str(value)
        .map_err(|_| AppError::Internal(format!("invalid stored tenant role '{value}'")))
}
