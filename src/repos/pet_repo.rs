/*
 * Responsibility
 * - pets の保存先 (Resource Store): get / put / delete / scan_all
 * - Postgres 実装と in-memory 実装を同じ trait の裏に置く
 * - scan_all は内部でページングする (呼び出し側は全件を受け取る)
 */
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;

use crate::repos::error::RepoError;

// Rows fetched per page while scanning.
const SCAN_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Pet {
    pub id: String,
    pub owner: String,
    #[sqlx(rename = "ownerDisplayName")]
    pub owner_display_name: Option<String>,
    pub name: String,
    pub species: Option<String>,
}

#[async_trait]
pub trait PetStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Pet>, RepoError>;

    // Insert or replace by id.
    async fn put(&self, pet: &Pet) -> Result<(), RepoError>;

    async fn delete(&self, id: &str) -> Result<(), RepoError>;

    async fn scan_all(&self) -> Result<Vec<Pet>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct PgPetStore {
    pool: PgPool,
}

impl PgPetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn scan_page(&self, after: Option<&str>) -> Result<Vec<Pet>, RepoError> {
        let rows = sqlx::query_as::<_, Pet>(
            r#"
            SELECT id, owner, "ownerDisplayName", name, species
            FROM pets
            WHERE $1::text IS NULL OR id > $1
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(after)
        .bind(SCAN_PAGE_SIZE)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl PetStore for PgPetStore {
    async fn get(&self, id: &str) -> Result<Option<Pet>, RepoError> {
        let row = sqlx::query_as::<_, Pet>(
            r#"
            SELECT id, owner, "ownerDisplayName", name, species
            FROM pets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn put(&self, pet: &Pet) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO pets (id, owner, "ownerDisplayName", name, species)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET
                owner = EXCLUDED.owner,
                "ownerDisplayName" = EXCLUDED."ownerDisplayName",
                name = EXCLUDED.name,
                species = EXCLUDED.species
            "#,
        )
        .bind(&pet.id)
        .bind(&pet.owner)
        .bind(&pet.owner_display_name)
        .bind(&pet.name)
        .bind(&pet.species)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            DELETE FROM pets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<Pet>, RepoError> {
        let mut pets = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let page = self.scan_page(after.as_deref()).await?;
            let last_page = (page.len() as i64) < SCAN_PAGE_SIZE;
            after = page.last().map(|p| p.id.clone());
            pets.extend(page);

            if last_page || after.is_none() {
                break;
            }
        }

        Ok(pets)
    }
}

/// In-process pet store for local development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPetStore {
    pets: Arc<RwLock<HashMap<String, Pet>>>,
}

impl InMemoryPetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PetStore for InMemoryPetStore {
    async fn get(&self, id: &str) -> Result<Option<Pet>, RepoError> {
        Ok(self.pets.read().await.get(id).cloned())
    }

    async fn put(&self, pet: &Pet) -> Result<(), RepoError> {
        self.pets.write().await.insert(pet.id.clone(), pet.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        self.pets.write().await.remove(id);
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<Pet>, RepoError> {
        let mut pets: Vec<Pet> = self.pets.read().await.values().cloned().collect();
        pets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(pets)
    }
}
