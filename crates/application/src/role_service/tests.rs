use std::sync::Arc;

use bastion_core::{AppError, TenantId};
use bastion_domain::{
    AccessLevel, ProjectId, ProjectPermissionToggles, TenantRole, TenantRoleSet, UserId,
};

use crate::RoleRepository;
use crate::test_support::{FakeResourceRepository, FakeRoleRepository, Stores};

use super::RoleService;

fn service(stores: &Stores) -> RoleService {
    RoleService::new(stores.resources.clone(), stores.roles.clone())
}

#[tokio::test]
async fn vendor_grant_replaces_previous_roles() {
    let stores = Stores::new();
    let tenant = stores.resources.add_tenant(UserId::new()).await;
    let user_id = UserId::new();
    let service = service(&stores);

    let first = service
        .grant_tenant_roles(
            tenant.id(),
            user_id,
            [TenantRole::Admin, TenantRole::Editor],
        )
        .await;
    assert!(first.is_ok());

    let roles = service
        .grant_tenant_roles(tenant.id(), user_id, [TenantRole::Vendor])
        .await
        .unwrap_or_default();
    assert_eq!(roles, TenantRoleSet::from_stored([TenantRole::Vendor]));

    let stored = service
        .tenant_roles(tenant.id(), user_id)
        .await
        .unwrap_or_default();
    assert_eq!(stored, TenantRoleSet::from_stored([TenantRole::Vendor]));
}

#[tokio::test]
async fn editor_and_vendor_request_stores_vendor_only() {
    let stores = Stores::new();
    let tenant = stores.resources.add_tenant(UserId::new()).await;
    let user_id = UserId::new();

    let roles = service(&stores)
        .grant_tenant_role_names(tenant.id(), user_id, &["editor", "vendor"])
        .await
        .unwrap_or_default();

    assert_eq!(roles, TenantRoleSet::from_stored([TenantRole::Vendor]));
}

#[tokio::test]
async fn non_vendor_grant_always_includes_user() {
    let stores = Stores::new();
    let tenant = stores.resources.add_tenant(UserId::new()).await;
    let user_id = UserId::new();

    let roles = service(&stores)
        .grant_tenant_roles(tenant.id(), user_id, [TenantRole::Viewer])
        .await
        .unwrap_or_default();

    assert_eq!(
        roles,
        TenantRoleSet::from_stored([TenantRole::Viewer, TenantRole::User])
    );
}

#[tokio::test]
async fn unknown_role_name_is_validation() {
    let stores = Stores::new();
    let tenant = stores.resources.add_tenant(UserId::new()).await;

    let result = service(&stores)
        .grant_tenant_role_names(tenant.id(), UserId::new(), &["owner"])
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn grant_in_unknown_tenant_is_not_found() {
    let stores = Stores::new();

    let result = service(&stores)
        .grant_tenant_roles(TenantId::new(), UserId::new(), [TenantRole::Editor])
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn store_write_failure_is_internal_not_forbidden() {
    let resources = Arc::new(FakeResourceRepository::default());
    let tenant = resources.add_tenant(UserId::new()).await;
    let service = RoleService::new(resources, Arc::new(FakeRoleRepository::failing_writes()));

    let result = service
        .grant_tenant_roles(tenant.id(), UserId::new(), [TenantRole::Editor])
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn project_access_requires_tenant_membership() {
    let stores = Stores::new();
    let tenant = stores.resources.add_tenant(UserId::new()).await;
    let project = stores
        .resources
        .add_project(
            &tenant,
            tenant.owner_id(),
            ProjectPermissionToggles::default(),
        )
        .await;
    let outsider = UserId::new();
    let service = service(&stores);

    let rejected = service
        .set_project_access(project.id(), outsider, AccessLevel::Viewer)
        .await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));

    let granted = service
        .grant_tenant_roles(tenant.id(), outsider, [TenantRole::Viewer])
        .await;
    assert!(granted.is_ok());

    let accepted = service
        .set_project_access(project.id(), outsider, AccessLevel::Viewer)
        .await;
    assert!(accepted.is_ok());

    let upgraded = service
        .set_project_access(project.id(), outsider, AccessLevel::Auditor)
        .await;
    assert!(upgraded.is_ok());
    assert_eq!(
        service
            .project_access(project.id(), outsider)
            .await
            .unwrap_or_default(),
        Some(AccessLevel::Auditor)
    );
}

#[tokio::test]
async fn set_access_on_missing_project_is_not_found() {
    let stores = Stores::new();

    let result = service(&stores)
        .set_project_access(ProjectId::new(), UserId::new(), AccessLevel::Viewer)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn removing_absent_membership_is_not_found() {
    let stores = Stores::new();
    let tenant = stores.resources.add_tenant(UserId::new()).await;
    let project = stores
        .resources
        .add_project(
            &tenant,
            tenant.owner_id(),
            ProjectPermissionToggles::default(),
        )
        .await;
    let service = service(&stores);

    assert!(service.bootstrap_project_owner(&project).await.is_ok());
    assert!(
        service
            .remove_project_access(project.id(), project.owner_id())
            .await
            .is_ok()
    );

    let again = service
        .remove_project_access(project.id(), project.owner_id())
        .await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn revoke_removes_roles_and_project_memberships_of_that_tenant_only() {
    let stores = Stores::new();
    let service = service(&stores);
    let member = UserId::new();

    let tenant = stores.resources.add_tenant(UserId::new()).await;
    let project = stores
        .resources
        .add_project(
            &tenant,
            tenant.owner_id(),
            ProjectPermissionToggles::default(),
        )
        .await;
    stores.roles.register_project(&project).await;

    let other_tenant = stores.resources.add_tenant(UserId::new()).await;
    let other_project = stores
        .resources
        .add_project(
            &other_tenant,
            other_tenant.owner_id(),
            ProjectPermissionToggles::default(),
        )
        .await;
    stores.roles.register_project(&other_project).await;

    for (tenant_id, project_id) in [
        (tenant.id(), project.id()),
        (other_tenant.id(), other_project.id()),
    ] {
        assert!(
            service
                .grant_tenant_roles(tenant_id, member, [TenantRole::Editor])
                .await
                .is_ok()
        );
        assert!(
            service
                .set_project_access(project_id, member, AccessLevel::Contributor)
                .await
                .is_ok()
        );
    }

    assert!(service.revoke_all_roles(tenant.id(), member).await.is_ok());

    assert!(
        service
            .tenant_roles(tenant.id(), member)
            .await
            .is_ok_and(|roles| roles.is_empty())
    );
    assert_eq!(
        service
            .project_access(project.id(), member)
            .await
            .unwrap_or_default(),
        None
    );
    assert_eq!(
        service
            .project_access(other_project.id(), member)
            .await
            .unwrap_or_default(),
        Some(AccessLevel::Contributor)
    );
}

#[tokio::test]
async fn bootstrap_tenant_owner_grants_admin_and_user() {
    let stores = Stores::new();
    let tenant = stores.resources.add_tenant(UserId::new()).await;
    let service = service(&stores);

    let roles = service
        .bootstrap_tenant_owner(&tenant)
        .await
        .unwrap_or_default();
    assert_eq!(
        roles,
        TenantRoleSet::from_stored([TenantRole::Admin, TenantRole::User])
    );

    let rows = service
        .list_tenant_role_assignments(tenant.id())
        .await
        .unwrap_or_default();
    let roles: Vec<TenantRole> = rows.iter().map(|row| row.role).collect();
    assert_eq!(roles, vec![TenantRole::Admin, TenantRole::User]);
    assert!(rows.iter().all(|row| row.user_id == tenant.owner_id()));

    assert_eq!(stores.roles.reads(), 0);
    assert!(
        stores
            .roles
            .tenant_roles(tenant.id(), tenant.owner_id())
            .await
            .is_ok_and(|stored| stored.contains(TenantRole::Admin))
    );
}

#[tokio::test]
async fn revoking_the_tenant_owner_is_a_conflict() {
    let stores = Stores::new();
    let tenant = stores.resources.add_tenant(UserId::new()).await;
    let service = service(&stores);
    assert!(service.bootstrap_tenant_owner(&tenant).await.is_ok());

    let result = service
        .revoke_all_roles(tenant.id(), tenant.owner_id())
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(
        service
            .tenant_roles(tenant.id(), tenant.owner_id())
            .await
            .is_ok_and(|roles| roles.contains(TenantRole::Admin))
    );
}

#[tokio::test]
async fn assignments_are_listed_by_user_then_role() {
    let stores = Stores::new();
    let tenant = stores.resources.add_tenant(UserId::new()).await;
    let service = service(&stores);
    let first = UserId::new();
    let second = UserId::new();

    for user_id in [second, first] {
        assert!(
            service
                .grant_tenant_roles(tenant.id(), user_id, [TenantRole::Viewer])
                .await
                .is_ok()
        );
    }

    let rows = service
        .list_tenant_role_assignments(tenant.id())
        .await
        .unwrap_or_default();
    let listed: Vec<(UserId, TenantRole)> =
        rows.iter().map(|row| (row.user_id, row.role)).collect();

    let (low, high) = if first < second {
        (first, second)
    } else {
        (second, first)
    };
    assert_eq!(
        listed,
        vec![
            (low, TenantRole::Viewer),
            (low, TenantRole::User),
            (high, TenantRole::Viewer),
            (high, TenantRole::User),
        ]
    );
}
