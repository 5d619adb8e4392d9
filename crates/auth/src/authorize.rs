use serde::Serialize;

use crate::{PermissionTable, Role};

/// Can `role` exercise `permission`?
///
/// - No IO
/// - No panics
/// - Fails closed: an undefined key or a missing role is a denial
pub fn can_access(permission: &str, role: Option<Role>) -> bool {
    match role {
        Some(role) => PermissionTable::standard().allows(permission, role),
        None => false,
    }
}

/// [`can_access`] for a role still in wire form. Unknown role names are denied.
pub fn can_access_as(permission: &str, role: &str) -> bool {
    can_access(permission, Role::parse(role))
}

// ─────────────────────────────────────────────────────────────────────────────
// Access Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of a permission decision.
///
/// Always agrees with [`can_access`]; it only adds the why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessExplanation {
    pub permission: String,
    pub role: Option<Role>,
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Roles that hold the permission (empty for undefined keys).
    pub granted_to: Vec<Role>,

    pub denial: Option<DenialKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    UnknownPermission,
    UnknownRole,
    RoleNotAllowed,
}

/// Explain why a permission decision was made (or would be made).
pub fn explain_access(permission: &str, role: Option<Role>) -> AccessExplanation {
    let table = PermissionTable::standard();
    let granted_to = table.roles_for(permission).map(<[Role]>::to_vec);

    let (granted, denial, reason) = match (&granted_to, role) {
        (None, _) => (
            false,
            Some(DenialKind::UnknownPermission),
            format!("permission '{permission}' is not defined"),
        ),
        (Some(_), None) => (
            false,
            Some(DenialKind::UnknownRole),
            "no recognised role; nothing is granted".to_string(),
        ),
        (Some(roles), Some(role)) if roles.contains(&role) => (
            true,
            None,
            format!("role '{role}' holds '{permission}'"),
        ),
        (Some(roles), Some(role)) => (
            false,
            Some(DenialKind::RoleNotAllowed),
            format!(
                "role '{role}' does not hold '{permission}' (granted to: {})",
                join_roles(roles)
            ),
        ),
    };

    AccessExplanation {
        permission: permission.to_string(),
        role,
        granted,
        reason,
        granted_to: granted_to.unwrap_or_default(),
        denial,
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry (audit/display)
// ─────────────────────────────────────────────────────────────────────────────

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub description: &'static str,
    pub permissions: Vec<PermissionDefinition>,
}

/// Permission definition (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct PermissionDefinition {
    pub name: &'static str,
    pub category: Option<&'static str>,
    pub description: Option<String>,
}

/// Describe one role and everything it holds.
pub fn describe_role(role: Role) -> RoleDefinition {
    let table = PermissionTable::standard();
    let permissions = table
        .permissions_for(role)
        .into_iter()
        .map(|name| PermissionDefinition {
            name,
            category: table.category(name),
            description: permission_description(name),
        })
        .collect();

    RoleDefinition {
        role,
        description: role_description(role),
        permissions,
    }
}

/// Describe every role, in [`Role::ALL`] order.
pub fn registry() -> Vec<RoleDefinition> {
    Role::ALL.into_iter().map(describe_role).collect()
}

fn role_description(role: Role) -> &'static str {
    match role {
        Role::Seller => "Counter seller confined to the seller shell",
        Role::SellerTt => "Territory seller confined to the field-sales shell",
        Role::SellerExecutive => "Sales lead with order follow-up and reporting",
        Role::Operator => "Warehouse operator handling stock and fulfilment",
        Role::Editor => "Catalog editor for products, categories and providers",
        Role::Supervisor => "Operations supervisor with approval rights",
        Role::Manager => "Business manager holding every permission",
    }
}

fn permission_description(perm: &str) -> Option<String> {
    // "domain.action", where action may itself contain underscores (price_edit)
    let (domain, action) = perm.split_once('.')?;

    let action_desc = match action {
        "view" => "View",
        "create" => "Create",
        "edit" => "Edit",
        "delete" => "Delete",
        "price_edit" => "Change prices of",
        "adjust" => "Adjust",
        "transfer" => "Transfer",
        "cancel" => "Cancel",
        "approve" => "Approve",
        "export" => "Export",
        "audit_log" => "Read the audit log of",
        "admin" => "Administer",
        other => other,
    };

    Some(format!("{action_desc} {domain}"))
}
