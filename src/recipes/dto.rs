use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::uploads::validate_upload_ref;

/// JSON body for POST /recipes. Multipart requests carry the same logical
/// fields as form parts; both shapes fold into a [`RecipeDraft`].
#[derive(Debug, Deserialize)]
pub struct CreateRecipeBody {
    pub user_id: Option<i64>,
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients_text: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

/// Wire-shape-independent accumulation of an incoming recipe. Finished into
/// a [`NewRecipe`] once all parts of the request have been consumed.
#[derive(Debug, Default)]
pub struct RecipeDraft {
    pub user_id: Option<i64>,
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients_text: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

/// Normalized record handed to the storage gateway.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ingredients_text: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

impl RecipeDraft {
    pub fn from_json(body: CreateRecipeBody) -> Self {
        Self {
            user_id: body.user_id,
            category_id: body.category_id,
            title: body.title,
            description: body.description,
            ingredients_text: body.ingredients_text,
            // A client-supplied reference goes through the same validation
            // as an uploaded file; anything else is dropped, not stored.
            image_url: body.image_url.as_deref().and_then(validate_upload_ref),
            video_url: body.video_url,
        }
    }

    /// Record one text form part. Unknown part names are ignored.
    pub fn set_form_field(&mut self, name: &str, value: String) {
        match name {
            "user_id" => self.user_id = value.trim().parse().ok(),
            "category_id" => self.category_id = value.trim().parse().ok(),
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "ingredients_text" => self.ingredients_text = Some(value),
            "video_url" => self.video_url = Some(value),
            _ => {}
        }
    }

    pub fn finish(self) -> Result<NewRecipe, ApiError> {
        let user_id = self
            .user_id
            .ok_or_else(|| ApiError::BadRequest("user_id is required".into()))?;
        let category_id = self
            .category_id
            .ok_or_else(|| ApiError::BadRequest("category_id is required".into()))?;
        let title = non_empty(self.title)
            .ok_or_else(|| ApiError::BadRequest("title is required".into()))?;
        Ok(NewRecipe {
            user_id,
            category_id,
            title,
            description: non_empty(self.description),
            ingredients_text: non_empty(self.ingredients_text),
            image_url: self.image_url,
            video_url: non_empty(self.video_url),
        })
    }
}

/// Optional text fields store NULL instead of an empty string.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_body() -> CreateRecipeBody {
        CreateRecipeBody {
            user_id: Some(1),
            category_id: Some(2),
            title: Some("Shakshuka".into()),
            description: None,
            ingredients_text: None,
            image_url: None,
            video_url: None,
        }
    }

    #[test]
    fn empty_video_url_becomes_null() {
        let mut body = base_body();
        body.video_url = Some(String::new());
        let recipe = RecipeDraft::from_json(body).finish().unwrap();
        assert_eq!(recipe.video_url, None);

        let mut body = base_body();
        body.video_url = Some("   ".into());
        let recipe = RecipeDraft::from_json(body).finish().unwrap();
        assert_eq!(recipe.video_url, None);

        let mut body = base_body();
        body.video_url = Some("https://example.com/v.mp4".into());
        let recipe = RecipeDraft::from_json(body).finish().unwrap();
        assert_eq!(recipe.video_url.as_deref(), Some("https://example.com/v.mp4"));
    }

    #[test]
    fn json_image_url_passes_through_validation() {
        let mut body = base_body();
        body.image_url = Some("/uploads/deadbeef.png".into());
        let recipe = RecipeDraft::from_json(body).finish().unwrap();
        assert_eq!(recipe.image_url.as_deref(), Some("/uploads/deadbeef.png"));

        let mut body = base_body();
        body.image_url = Some("https://elsewhere.example/pic.png".into());
        let recipe = RecipeDraft::from_json(body).finish().unwrap();
        assert_eq!(recipe.image_url, None);

        let mut body = base_body();
        body.image_url = Some("/uploads/../../etc/passwd".into());
        let recipe = RecipeDraft::from_json(body).finish().unwrap();
        assert_eq!(recipe.image_url, None);
    }

    #[test]
    fn required_fields_are_enforced() {
        let mut body = base_body();
        body.title = Some("  ".into());
        assert!(RecipeDraft::from_json(body).finish().is_err());

        let mut body = base_body();
        body.user_id = None;
        assert!(RecipeDraft::from_json(body).finish().is_err());

        let mut body = base_body();
        body.category_id = None;
        assert!(RecipeDraft::from_json(body).finish().is_err());
    }

    #[test]
    fn form_fields_parse_ids_and_ignore_unknown_names() {
        let mut draft = RecipeDraft::default();
        draft.set_form_field("user_id", " 7 ".into());
        draft.set_form_field("category_id", "3".into());
        draft.set_form_field("title", "Pho".into());
        draft.set_form_field("bogus", "ignored".into());
        let recipe = draft.finish().unwrap();
        assert_eq!(recipe.user_id, 7);
        assert_eq!(recipe.category_id, 3);
        assert_eq!(recipe.title, "Pho");
    }

    #[test]
    fn unparseable_form_id_is_treated_as_missing() {
        let mut draft = RecipeDraft::default();
        draft.set_form_field("user_id", "not-a-number".into());
        draft.set_form_field("category_id", "3".into());
        draft.set_form_field("title", "Pho".into());
        assert!(draft.finish().is_err());
    }
}
