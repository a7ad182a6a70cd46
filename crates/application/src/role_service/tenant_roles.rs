use super::*;

use bastion_domain::TenantRole;

impl RoleService {
    /// Returns the roles a user holds in a tenant.
    pub async fn tenant_roles(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<TenantRoleSet> {
        self.role_repository.tenant_roles(tenant_id, user_id).await
    }

    /// Replaces the user's roles in a tenant with the normalized request.
    ///
    /// `vendor` is exclusive; any other request gains `user`. The previous set
    /// is replaced atomically.
    pub async fn grant_tenant_roles(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        requested: impl IntoIterator<Item = TenantRole>,
    ) -> AppResult<TenantRoleSet> {
        self.require_tenant(tenant_id).await?;

        let roles = TenantRoleSet::normalize(requested);
        self.role_repository
            .replace_tenant_roles(tenant_id, user_id, &roles)
            .await?;

        info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            roles = ?roles.iter().map(|role| role.as_str()).collect::<Vec<_>>(),
            "tenant roles replaced"
        );
        Ok(roles)
    }

    /// Parses transport role names and grants them.
    pub async fn grant_tenant_role_names<S: AsRef<str>>(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        requested: &[S],
    ) -> AppResult<TenantRoleSet> {
        let roles = TenantRoleSet::parse_requested(requested)?;
        self.grant_tenant_roles(tenant_id, user_id, roles.iter())
            .await
    }

    /// Removes the user from the tenant and from every project of the tenant.
    ///
    /// The tenant owner keeps implicit access through ownership, so revoking
    /// them is a conflict until ownership moves to another user.
    pub async fn revoke_all_roles(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<()> {
        let tenant = self.require_tenant(tenant_id).await?;
        if tenant.owner_id() == user_id {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' owns tenant '{tenant_id}' and cannot be revoked"
            )));
        }

        self.role_repository
            .revoke_all_roles(tenant_id, user_id)
            .await?;

        info!(tenant_id = %tenant_id, user_id = %user_id, "tenant membership revoked");
        Ok(())
    }

    /// Grants the tenant owner `{admin, user}`.
    pub async fn bootstrap_tenant_owner(&self, tenant: &Tenant) -> AppResult<TenantRoleSet> {
        self.grant_tenant_roles(tenant.id(), tenant.owner_id(), [TenantRole::Admin])
            .await
    }

    /// Lists the stored role rows of a tenant, ordered by user then role.
    pub async fn list_tenant_role_assignments(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<TenantRoleAssignment>> {
        self.require_tenant(tenant_id).await?;
        let mut assignments = self
            .role_repository
            .list_tenant_role_assignments(tenant_id)
            .await?;
        assignments.sort_by_key(|assignment| (assignment.user_id, assignment.role));
        Ok(assignments)
    }
}
