use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ProfileId;

/// Role an identity may hold. Stored as text in `user_roles.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

/// Row in `user_roles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRole {
    pub profile_id: ProfileId,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRole {
    /// Typed role; unknown values (impossible under the CHECK constraint) are skipped by callers
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub async fn find_for_profile(profile_id: ProfileId, pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, UserRole>(
            "SELECT * FROM user_roles WHERE profile_id = $1 ORDER BY role",
        )
        .bind(profile_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_all(pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, UserRole>("SELECT * FROM user_roles ORDER BY profile_id, role")
            .fetch_all(pool)
            .await
    }

    /// Grant a role. Granting a role already held is a no-op.
    pub async fn grant(profile_id: ProfileId, role: Role, pool: &PgPool) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (profile_id, role)
            VALUES ($1, $2)
            ON CONFLICT (profile_id, role) DO NOTHING
            "#,
        )
        .bind(profile_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Revoke a role, returning whether it was held
    pub async fn revoke(profile_id: ProfileId, role: Role, pool: &PgPool) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE profile_id = $1 AND role = $2")
            .bind(profile_id)
            .bind(role.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_case_insensitively() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" User ".parse::<Role>().unwrap(), Role::User);
        assert!("editor".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_display_matches_column_value() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_unknown_stored_role_is_none() {
        let row = UserRole {
            profile_id: ProfileId::new(),
            role: "moderator".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(row.role(), None);
    }
}
