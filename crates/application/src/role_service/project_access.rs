use super::*;

impl RoleService {
    /// Returns the user's access level in a project.
    pub async fn project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Option<AccessLevel>> {
        self.role_repository
            .project_access(project_id, user_id)
            .await
    }

    /// Inserts or replaces the user's access level in a project.
    ///
    /// The user must already belong to the project's tenant.
    pub async fn set_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        access_level: AccessLevel,
    ) -> AppResult<()> {
        let project = self.require_project(project_id).await?;
        let tenant = self.require_tenant(project.tenant_id()).await?;

        if tenant.owner_id() != user_id
            && self
                .role_repository
                .tenant_roles(tenant.id(), user_id)
                .await?
                .is_empty()
        {
            return Err(AppError::Validation(format!(
                "user '{user_id}' is not a member of tenant '{}'",
                tenant.id()
            )));
        }

        self.role_repository
            .set_project_access(project_id, user_id, access_level)
            .await?;

        info!(
            project_id = %project_id,
            user_id = %user_id,
            access_level = access_level.as_str(),
            "project access set"
        );
        Ok(())
    }

    /// Removes the user's project membership.
    pub async fn remove_project_access(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<()> {
        self.require_project(project_id).await?;

        if !self
            .role_repository
            .remove_project_access(project_id, user_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not a member of project '{project_id}'"
            )));
        }

        info!(project_id = %project_id, user_id = %user_id, "project access removed");
        Ok(())
    }

    /// Makes the project owner a `manager`.
    pub async fn bootstrap_project_owner(&self, project: &Project) -> AppResult<()> {
        self.set_project_access(project.id(), project.owner_id(), AccessLevel::Manager)
            .await
    }
}
