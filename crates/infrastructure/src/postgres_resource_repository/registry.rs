use bastion_domain::ResourceKind;

/// Column set holding the parent foreign key of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParentColumn {
    Tenant,
    Project,
    /// `project_id` when set, `tenant_id` otherwise.
    ProjectOrTenant,
    Resource(ResourceKind, &'static str),
}

/// Storage layout of one owned resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct KindTable {
    pub(super) table: &'static str,
    pub(super) parent: ParentColumn,
    pub(super) owner_columns: &'static [&'static str],
    pub(super) review_status: bool,
}

impl KindTable {
    const fn tenant_child(table: &'static str) -> Self {
        Self {
            table,
            parent: ParentColumn::Tenant,
            owner_columns: &["owner_id"],
            review_status: false,
        }
    }

    const fn project_child(table: &'static str) -> Self {
        Self {
            table,
            parent: ParentColumn::Project,
            owner_columns: &["owner_id"],
            review_status: false,
        }
    }

    /// Builds the primary-key lookup for this table.
    pub(super) fn select_by_id(&self) -> String {
        let (tenant_id, project_id, parent_id) = match self.parent {
            ParentColumn::Tenant => ("tenant_id", "NULL::uuid", "NULL::uuid"),
            ParentColumn::Project => ("NULL::uuid", "project_id", "NULL::uuid"),
            ParentColumn::ProjectOrTenant => ("tenant_id", "project_id", "NULL::uuid"),
            ParentColumn::Resource(_, column) => ("NULL::uuid", "NULL::uuid", column),
        };
        let owner_ids = if self.owner_columns.is_empty() {
            "ARRAY[]::uuid[]".to_owned()
        } else {
            format!(
                "array_remove(ARRAY[{}]::uuid[], NULL)",
                self.owner_columns.join(", ")
            )
        };
        let review_status = if self.review_status {
            "review_status"
        } else {
            "NULL::text"
        };

        format!(
            "SELECT id, {tenant_id} AS tenant_id, {project_id} AS project_id, \
             {parent_id} AS parent_id, {owner_ids} AS owner_ids, \
             {review_status} AS review_status \
             FROM {} WHERE id = $1",
            self.table
        )
    }
}

/// Returns the storage layout of a kind; anchors have dedicated queries.
pub(super) fn kind_table(kind: ResourceKind) -> Option<KindTable> {
    let table = match kind {
        ResourceKind::Tenant | ResourceKind::Project => return None,
        ResourceKind::Control => KindTable::tenant_child("controls"),
        ResourceKind::Policy => KindTable::tenant_child("policies"),
        ResourceKind::Framework => KindTable::tenant_child("frameworks"),
        ResourceKind::Tag => KindTable::tenant_child("tags"),
        ResourceKind::PolicyLabel => KindTable::tenant_child("policy_labels"),
        ResourceKind::Vendor => KindTable::tenant_child("vendors"),
        ResourceKind::Questionnaire => KindTable::tenant_child("questionnaires"),
        ResourceKind::VendorApp => KindTable {
            table: "vendor_apps",
            parent: ParentColumn::Resource(ResourceKind::Vendor, "vendor_id"),
            owner_columns: &[],
            review_status: false,
        },
        ResourceKind::Assessment => KindTable {
            table: "assessments",
            parent: ParentColumn::Resource(ResourceKind::Vendor, "vendor_id"),
            owner_columns: &["owner_id"],
            review_status: false,
        },
        ResourceKind::AssessmentItem => KindTable {
            table: "assessment_items",
            parent: ParentColumn::Resource(ResourceKind::Assessment, "assessment_id"),
            owner_columns: &["responder_id"],
            review_status: false,
        },
        ResourceKind::Risk => KindTable {
            table: "risks",
            parent: ParentColumn::ProjectOrTenant,
            owner_columns: &["owner_id"],
            review_status: false,
        },
        ResourceKind::ProjectControl => KindTable {
            table: "project_controls",
            parent: ParentColumn::Project,
            owner_columns: &[],
            review_status: true,
        },
        ResourceKind::ProjectSubControl => KindTable {
            table: "project_subcontrols",
            parent: ParentColumn::Resource(ResourceKind::ProjectControl, "project_control_id"),
            owner_columns: &["owner_id", "operator_id"],
            review_status: true,
        },
        ResourceKind::ProjectPolicy => KindTable::project_child("project_policies"),
        ResourceKind::Evidence => KindTable::project_child("project_evidence"),
        ResourceKind::ProjectComment => KindTable::project_child("project_comments"),
        ResourceKind::ControlComment => KindTable {
            table: "control_comments",
            parent: ParentColumn::Resource(ResourceKind::ProjectControl, "project_control_id"),
            owner_columns: &["owner_id"],
            review_status: false,
        },
        ResourceKind::AuditorFeedback => KindTable {
            table: "auditor_feedback",
            parent: ParentColumn::Resource(ResourceKind::ProjectControl, "project_control_id"),
            owner_columns: &["owner_id"],
            review_status: false,
        },
        ResourceKind::SubControlComment => KindTable {
            table: "subcontrol_comments",
            parent: ParentColumn::Resource(
                ResourceKind::ProjectSubControl,
                "project_subcontrol_id",
            ),
            owner_columns: &["owner_id"],
            review_status: false,
        },
    };

    Some(table)
}
