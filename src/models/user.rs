use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Staff,
    Customer,
}

impl UserRole {
    /// Admin and staff both see the Schedule screens.
    pub fn can_view_schedule(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Staff)
    }

    /// Only the staff variant of the screen is editable.
    pub fn can_edit_schedule(&self) -> bool {
        matches!(self, UserRole::Staff)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
            UserRole::Customer => "customer",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "staff" => Ok(UserRole::Staff),
            "customer" => Ok(UserRole::Customer),
            _ => Err(anyhow::anyhow!("Unknown role: {s}")),
        }
    }
}
