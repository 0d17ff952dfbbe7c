use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ProfileId;
use crate::domains::profiles::models::Role;

/// One row per authenticated identity. The id is the identity provider's subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a first-sight profile insert
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: ProfileId,
    pub display_name: String,
    pub email: String,
}

impl NewProfile {
    /// Build from token claims. Without a `name` claim the email's local part is used.
    pub fn from_claims(id: ProfileId, email: &str, name: Option<&str>) -> Self {
        let display_name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());

        Self {
            id,
            display_name,
            email: email.to_string(),
        }
    }
}

/// Profile plus its role set, for admin listings
#[derive(Debug, Clone, PartialEq)]
pub struct UserWithRoles {
    pub profile: Profile,
    pub roles: Vec<Role>,
}

impl UserWithRoles {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

impl Profile {
    pub async fn find_by_id(id: ProfileId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_all(pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    /// Insert if absent, returning the stored row either way.
    /// The second boolean is true when this call created the row.
    pub async fn insert_if_absent(
        profile: &NewProfile,
        pool: &PgPool,
    ) -> sqlx::Result<(Self, bool)> {
        let inserted = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, display_name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(&profile.email)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(row) => Ok((row, true)),
            None => {
                let existing = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
                    .bind(profile.id)
                    .fetch_one(pool)
                    .await?;
                Ok((existing, false))
            }
        }
    }

    pub async fn update_display_name(
        id: ProfileId,
        display_name: &str,
        pool: &PgPool,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET display_name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(display_name)
        .fetch_optional(pool)
        .await
    }

    /// Delete a profile; roles and posts cascade. Returns whether a row was removed.
    pub async fn delete(id: ProfileId, pool: &PgPool) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
