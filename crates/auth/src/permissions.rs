//! Static permission table.
//!
//! Permission keys are opaque `domain.action` strings (e.g. `products.price_edit`).
//! Each key is defined exactly once, below, together with the non-empty set of
//! roles allowed to hold it. Nothing mutates the table at runtime.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::Role;
use crate::Role::{Editor, Manager, Operator, Seller, SellerExecutive, SellerTt, Supervisor};

pub mod keys {
    pub const DASHBOARD_VIEW: &str = "dashboard.view";

    pub const USERS_VIEW: &str = "users.view";
    pub const USERS_CREATE: &str = "users.create";
    pub const USERS_EDIT: &str = "users.edit";
    pub const USERS_DELETE: &str = "users.delete";

    pub const PRODUCTS_VIEW: &str = "products.view";
    pub const PRODUCTS_CREATE: &str = "products.create";
    pub const PRODUCTS_EDIT: &str = "products.edit";
    pub const PRODUCTS_DELETE: &str = "products.delete";
    pub const PRODUCTS_PRICE_EDIT: &str = "products.price_edit";

    pub const INVENTORY_VIEW: &str = "inventory.view";
    pub const INVENTORY_ADJUST: &str = "inventory.adjust";
    pub const INVENTORY_TRANSFER: &str = "inventory.transfer";

    pub const SALES_VIEW: &str = "sales.view";
    pub const SALES_CREATE: &str = "sales.create";
    pub const SALES_CANCEL: &str = "sales.cancel";

    pub const CATEGORIES_VIEW: &str = "categories.view";
    pub const CATEGORIES_CREATE: &str = "categories.create";
    pub const CATEGORIES_EDIT: &str = "categories.edit";
    pub const CATEGORIES_DELETE: &str = "categories.delete";

    pub const PROVIDERS_VIEW: &str = "providers.view";
    pub const PROVIDERS_CREATE: &str = "providers.create";
    pub const PROVIDERS_EDIT: &str = "providers.edit";
    pub const PROVIDERS_DELETE: &str = "providers.delete";

    pub const ORDERS_VIEW: &str = "orders.view";
    pub const ORDERS_CREATE: &str = "orders.create";
    pub const ORDERS_EDIT: &str = "orders.edit";
    pub const ORDERS_APPROVE: &str = "orders.approve";
    pub const ORDERS_DELETE: &str = "orders.delete";

    pub const WAREHOUSES_VIEW: &str = "warehouses.view";
    pub const WAREHOUSES_CREATE: &str = "warehouses.create";
    pub const WAREHOUSES_EDIT: &str = "warehouses.edit";
    pub const WAREHOUSES_DELETE: &str = "warehouses.delete";

    pub const REPORTS_VIEW: &str = "reports.view";
    pub const REPORTS_EXPORT: &str = "reports.export";

    pub const SETTINGS_VIEW: &str = "settings.view";
    pub const SETTINGS_EDIT: &str = "settings.edit";

    pub const SYSTEM_AUDIT_LOG: &str = "system.audit_log";
    pub const SYSTEM_ADMIN: &str = "system.admin";
}

use keys::*;

const EVERYONE: &[Role] = &Role::ALL;
const MANAGEMENT: &[Role] = &[Supervisor, Manager];
const MANAGER_ONLY: &[Role] = &[Manager];
const CATALOG_EDITORS: &[Role] = &[Editor, Supervisor, Manager];
const STOCK_HANDLERS: &[Role] = &[Operator, Supervisor, Manager];
const BACK_OFFICE: &[Role] = &[SellerExecutive, Operator, Editor, Supervisor, Manager];
const SELLERS: &[Role] = &[Seller, SellerTt, SellerExecutive, Supervisor, Manager];

static ENTRIES: &[(&str, &[Role])] = &[
    (DASHBOARD_VIEW, BACK_OFFICE),
    (USERS_VIEW, MANAGEMENT),
    (USERS_CREATE, MANAGER_ONLY),
    (USERS_EDIT, MANAGER_ONLY),
    (USERS_DELETE, MANAGER_ONLY),
    (PRODUCTS_VIEW, EVERYONE),
    (PRODUCTS_CREATE, CATALOG_EDITORS),
    (PRODUCTS_EDIT, CATALOG_EDITORS),
    (PRODUCTS_DELETE, MANAGEMENT),
    (PRODUCTS_PRICE_EDIT, MANAGEMENT),
    (INVENTORY_VIEW, BACK_OFFICE),
    (INVENTORY_ADJUST, STOCK_HANDLERS),
    (INVENTORY_TRANSFER, STOCK_HANDLERS),
    (SALES_VIEW, SELLERS),
    (SALES_CREATE, SELLERS),
    (SALES_CANCEL, &[SellerExecutive, Supervisor, Manager]),
    (CATEGORIES_VIEW, BACK_OFFICE),
    (CATEGORIES_CREATE, CATALOG_EDITORS),
    (CATEGORIES_EDIT, CATALOG_EDITORS),
    (CATEGORIES_DELETE, MANAGEMENT),
    (PROVIDERS_VIEW, &[Operator, Editor, Supervisor, Manager]),
    (PROVIDERS_CREATE, CATALOG_EDITORS),
    (PROVIDERS_EDIT, CATALOG_EDITORS),
    (PROVIDERS_DELETE, MANAGER_ONLY),
    (ORDERS_VIEW, &[Seller, SellerTt, SellerExecutive, Operator, Supervisor, Manager]),
    (ORDERS_CREATE, SELLERS),
    (ORDERS_EDIT, &[SellerExecutive, Operator, Supervisor, Manager]),
    (ORDERS_APPROVE, MANAGEMENT),
    (ORDERS_DELETE, MANAGER_ONLY),
    (WAREHOUSES_VIEW, STOCK_HANDLERS),
    (WAREHOUSES_CREATE, MANAGEMENT),
    (WAREHOUSES_EDIT, MANAGEMENT),
    (WAREHOUSES_DELETE, MANAGER_ONLY),
    (REPORTS_VIEW, &[SellerExecutive, Supervisor, Manager]),
    (REPORTS_EXPORT, MANAGEMENT),
    (SETTINGS_VIEW, MANAGEMENT),
    (SETTINGS_EDIT, MANAGER_ONLY),
    (SYSTEM_AUDIT_LOG, MANAGEMENT),
    (SYSTEM_ADMIN, MANAGER_ONLY),
];

static STANDARD: LazyLock<PermissionTable> = LazyLock::new(|| PermissionTable::from_entries(ENTRIES));

/// Read-only view over the permission table.
#[derive(Debug)]
pub struct PermissionTable {
    entries: &'static [(&'static str, &'static [Role])],
    index: HashMap<&'static str, &'static [Role]>,
}

impl PermissionTable {
    fn from_entries(entries: &'static [(&'static str, &'static [Role])]) -> Self {
        let index = entries.iter().copied().collect();
        Self { entries, index }
    }

    /// The console's permission table.
    pub fn standard() -> &'static PermissionTable {
        &STANDARD
    }

    /// All permission keys, in definition order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Roles allowed to hold `key`, or `None` if the key is not defined.
    pub fn roles_for(&self, key: &str) -> Option<&'static [Role]> {
        self.index.get(key).copied()
    }

    pub fn allows(&self, key: &str, role: Role) -> bool {
        self.roles_for(key)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// Every key `role` holds, in definition order.
    pub fn permissions_for(&self, role: Role) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|(_, roles)| roles.contains(&role))
            .map(|(key, _)| *key)
            .collect()
    }

    /// Domain part of a defined key (`"orders"` for `"orders.delete"`).
    pub fn category<'k>(&self, key: &'k str) -> Option<&'k str> {
        self.index.get(key)?;
        key.split_once('.').map(|(domain, _)| domain)
    }
}
