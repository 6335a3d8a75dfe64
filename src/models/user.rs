use serde::{Deserialize, Serialize};

use super::enums::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: String,
}

/// Role-specific profile attributes supplied when an account is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ProfileDetails {
    Patient {
        date_of_birth: Option<String>,
    },
    Doctor {
        specialty: String,
        clinic_address: Option<String>,
    },
    Lab {
        lab_address: Option<String>,
        #[serde(default)]
        available_tests: Vec<String>,
    },
    Admin,
}

impl ProfileDetails {
    pub fn role(&self) -> Role {
        match self {
            Self::Patient { .. } => Role::Patient,
            Self::Doctor { .. } => Role::Doctor,
            Self::Lab { .. } => Role::Lab,
            Self::Admin => Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub profile: ProfileDetails,
}

/// Partial user edit applied by an admin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.is_active.is_none()
    }
}
