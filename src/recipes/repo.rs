use serde::Serialize;
use sqlx::{FromRow, MySqlPool};
use time::OffsetDateTime;

use super::dto::NewRecipe;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ingredients_text: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Recipe joined with its owner, for category listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeWithUser {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ingredients_text: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user_name: String,
    pub user_photo: Option<String>,
}

/// Recipe joined with its category, for per-user listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeWithCategory {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ingredients_text: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub category_name: String,
}

/// Single-recipe projection with owner and category names. The joins are
/// LEFT so a dangling reference still yields the recipe row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeDetails {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ingredients_text: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user_name: Option<String>,
    pub category_name: Option<String>,
}

pub async fn list_all(db: &MySqlPool) -> sqlx::Result<Vec<Recipe>> {
    sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, user_id, category_id, title, description, ingredients_text,
               image_url, video_url, created_at
        FROM recipes
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn list_by_category(
    db: &MySqlPool,
    category_id: i64,
) -> sqlx::Result<Vec<RecipeWithUser>> {
    sqlx::query_as::<_, RecipeWithUser>(
        r#"
        SELECT r.id, r.user_id, r.category_id, r.title, r.description,
               r.ingredients_text, r.image_url, r.video_url, r.created_at,
               u.name AS user_name, u.photo_url AS user_photo
        FROM recipes r
        JOIN users u ON r.user_id = u.id
        WHERE r.category_id = ?
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(category_id)
    .fetch_all(db)
    .await
}

pub async fn list_by_category_name(
    db: &MySqlPool,
    name: &str,
) -> sqlx::Result<Vec<RecipeWithUser>> {
    sqlx::query_as::<_, RecipeWithUser>(
        r#"
        SELECT r.id, r.user_id, r.category_id, r.title, r.description,
               r.ingredients_text, r.image_url, r.video_url, r.created_at,
               u.name AS user_name, u.photo_url AS user_photo
        FROM recipes r
        JOIN users u ON r.user_id = u.id
        JOIN menu_categories c ON r.category_id = c.id
        WHERE c.name = ?
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(name)
    .fetch_all(db)
    .await
}

pub async fn find_by_title(db: &MySqlPool, title: &str) -> sqlx::Result<Option<RecipeDetails>> {
    sqlx::query_as::<_, RecipeDetails>(
        r#"
        SELECT r.id, r.user_id, r.category_id, r.title, r.description,
               r.ingredients_text, r.image_url, r.video_url, r.created_at,
               u.name AS user_name, c.name AS category_name
        FROM recipes r
        LEFT JOIN users u ON r.user_id = u.id
        LEFT JOIN menu_categories c ON r.category_id = c.id
        WHERE r.title = ?
        LIMIT 1
        "#,
    )
    .bind(title)
    .fetch_optional(db)
    .await
}

pub async fn list_by_user(db: &MySqlPool, user_id: i64) -> sqlx::Result<Vec<RecipeWithCategory>> {
    sqlx::query_as::<_, RecipeWithCategory>(
        r#"
        SELECT r.id, r.user_id, r.category_id, r.title, r.description,
               r.ingredients_text, r.image_url, r.video_url, r.created_at,
               c.name AS category_name
        FROM recipes r
        JOIN menu_categories c ON r.category_id = c.id
        WHERE r.user_id = ?
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Insert one recipe row; returns the id the store assigned.
pub async fn insert(db: &MySqlPool, recipe: &NewRecipe) -> sqlx::Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO recipes
        (user_id, category_id, title, description, ingredients_text, image_url, video_url)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(recipe.user_id)
    .bind(recipe.category_id)
    .bind(&recipe.title)
    .bind(&recipe.description)
    .bind(&recipe.ingredients_text)
    .bind(&recipe.image_url)
    .bind(&recipe.video_url)
    .execute(db)
    .await?;
    Ok(result.last_insert_id() as i64)
}

/// Delete one recipe row; returns how many rows were affected.
pub async fn delete(db: &MySqlPool, recipe_id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
