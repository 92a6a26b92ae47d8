use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    Json,
};
use tracing::{instrument, warn};

use crate::{error::ApiError, state::AppState, uploads::allowed_extension};

use super::dto::{CreateRecipeBody, CreatedResponse, MessageResponse, RecipeDraft};
use super::repo::{self, Recipe, RecipeDetails, RecipeWithCategory, RecipeWithUser};

#[instrument(skip(state))]
pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = repo::list_all(&state.db).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<Json<Vec<RecipeWithUser>>, ApiError> {
    let recipes = repo::list_by_category(&state.db, category_id).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn list_by_category_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<RecipeWithUser>>, ApiError> {
    let recipes = repo::list_by_category_name(&state.db, &name).await?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn get_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = repo::find_by_title(&state.db, &title)
        .await?
        .ok_or(ApiError::NotFound("Recipe"))?;
    Ok(Json(recipe))
}

#[instrument(skip(state))]
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<RecipeWithCategory>>, ApiError> {
    let recipes = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(recipes))
}

/// POST /recipes
///
/// Accepts either `multipart/form-data` (text parts plus an optional file
/// part named `image`) or a JSON body with the same logical fields. Both
/// shapes normalize into one `RecipeDraft` before anything is persisted.
///
/// A file part whose name fails the extension allowlist is dropped silently
/// and the recipe is created without an image; that is the documented policy,
/// not an error. If the insert fails after an image was already stored, the
/// file is left behind (accepted gap, no compensating delete).
#[instrument(skip(state, req))]
pub async fn create_recipe(
    State(state): State<AppState>,
    req: Request,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let draft = if is_multipart {
        let multipart = Multipart::from_request(req, &state)
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        draft_from_multipart(&state, multipart).await?
    } else {
        let Json(body) = Json::<CreateRecipeBody>::from_request(req, &state)
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        RecipeDraft::from_json(body)
    };

    let recipe = draft.finish()?;
    let id = repo::insert(&state.db, &recipe).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Recipe created successfully",
        }),
    ))
}

async fn draft_from_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<RecipeDraft, ApiError> {
    let mut draft = RecipeDraft::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "image" {
            let Some(ext) = field.file_name().and_then(allowed_extension) else {
                warn!("dropping image part with disallowed or missing extension");
                continue;
            };
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            draft.image_url = Some(state.uploads.save(&ext, data).await?);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            draft.set_form_field(&name, value);
        }
    }
    Ok(draft)
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let affected = repo::delete(&state.db, recipe_id).await?;
    if affected == 1 {
        Ok(Json(MessageResponse {
            message: "Recipe deleted successfully",
        }))
    } else {
        Err(ApiError::NotFound("Recipe"))
    }
}
