use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub created_at: Option<String>,
}

/// Role a profile holds inside its company. Stored as `admin` / `member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyRole {
    Admin,
    Member,
}

impl CompanyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyRole::Admin => "admin",
            CompanyRole::Member => "member",
        }
    }
}

impl fmt::Display for CompanyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(CompanyRole::Admin),
            "member" => Ok(CompanyRole::Member),
            other => Err(format!("Unknown company role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub company_id: Option<i64>,
    pub company_role: CompanyRole,
    pub created_at: Option<String>,
}

/// Raw `profiles` row; the role column is text until parsed.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub company_id: Option<i64>,
    pub company_role: String,
    pub created_at: Option<String>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = String;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            company_id: row.company_id,
            company_role: row.company_role.parse()?,
            created_at: row.created_at,
        })
    }
}
