mod dto;
pub mod handlers;
mod repo;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/recipes",
            get(handlers::list_recipes).post(handlers::create_recipe),
        )
        .route("/recipes/category/:category_id", get(handlers::list_by_category))
        .route("/categories/:name/recipes", get(handlers::list_by_category_name))
        .route("/recipes/by-title/:title", get(handlers::get_by_title))
        .route("/users/:user_id/recipes", get(handlers::list_by_user))
        .route("/recipes/:recipe_id", delete(handlers::delete_recipe))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}
