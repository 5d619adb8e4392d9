use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for RBAC.
///
/// The set is closed: a user holds exactly one of these at a time. Strings the
/// backend sends that do not name one of them are treated as "no role" by every
/// caller, which denies everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Counter seller; confined to the seller shell.
    Seller,
    /// Territory (field-sales) seller; confined to the territory shell.
    SellerTt,
    SellerExecutive,
    Operator,
    Editor,
    Supervisor,
    Manager,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Seller,
        Role::SellerTt,
        Role::SellerExecutive,
        Role::Operator,
        Role::Editor,
        Role::Supervisor,
        Role::Manager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seller => "seller",
            Role::SellerTt => "seller_tt",
            Role::SellerExecutive => "seller_executive",
            Role::Operator => "operator",
            Role::Editor => "editor",
            Role::Supervisor => "supervisor",
            Role::Manager => "manager",
        }
    }

    /// Parse a wire role name. Surrounding whitespace and ASCII case are ignored.
    pub fn parse(raw: &str) -> Option<Role> {
        let raw = raw.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(raw))
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
