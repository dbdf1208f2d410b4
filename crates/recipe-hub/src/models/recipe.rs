//! Recipe search results from the FatSecret `recipes.search` method.
//!
//! FatSecret returns `recipe` as an array for several hits, a bare object for
//! exactly one hit, and omits it when nothing matched. Numbers arrive as strings.

use serde::{Deserialize, Serialize};

/// A recipe as displayed on the index page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// FatSecret recipe id.
    #[serde(rename = "recipe_id")]
    pub id: String,

    /// Recipe name.
    #[serde(rename = "recipe_name")]
    pub name: String,

    /// Short description.
    #[serde(rename = "recipe_description", default)]
    pub description: Option<String>,

    /// Thumbnail URL.
    #[serde(rename = "recipe_image", default)]
    pub image: Option<String>,

    /// Recipe page on fatsecret.com.
    #[serde(rename = "recipe_url", default)]
    pub url: Option<String>,
}

/// Top-level `recipes.search` response.
#[derive(Debug, Deserialize)]
pub struct RecipeSearchResponse {
    #[serde(default)]
    pub recipes: Option<RecipePage>,
}

/// The `recipes` object of a search response.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePage {
    #[serde(default)]
    pub recipe: Option<OneOrMany<Recipe>>,

    #[serde(default)]
    pub total_results: Option<String>,
}

/// FatSecret collapses single-element arrays into objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flatten into a vector.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

impl RecipeSearchResponse {
    /// All recipes in the response, empty when nothing matched.
    #[must_use]
    pub fn into_recipes(self) -> Vec<Recipe> {
        self.recipes.and_then(|page| page.recipe).map(OneOrMany::into_vec).unwrap_or_default()
    }
}

/// Error document FatSecret sends with a 200 status.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Body of an API error document.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe_json(id: &str, name: &str) -> serde_json::Value {
        json!({
            "recipe_id": id,
            "recipe_name": name,
            "recipe_description": "Tasty",
            "recipe_image": "https://example.com/img.jpg",
            "recipe_url": "https://www.fatsecret.com/recipes/x"
        })
    }

    #[test]
    fn test_many_recipes() {
        let body = json!({
            "recipes": {
                "recipe": [recipe_json("1", "Soup"), recipe_json("2", "Stew")],
                "total_results": "2"
            }
        });
        let parsed: RecipeSearchResponse = serde_json::from_value(body).unwrap();
        let recipes = parsed.into_recipes();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[1].name, "Stew");
    }

    #[test]
    fn test_single_recipe_object() {
        let body = json!({"recipes": {"recipe": recipe_json("7", "Plov"), "total_results": "1"}});
        let parsed: RecipeSearchResponse = serde_json::from_value(body).unwrap();
        let recipes = parsed.into_recipes();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, "7");
    }

    #[test]
    fn test_no_results() {
        let body = json!({"recipes": {"total_results": "0"}});
        let parsed: RecipeSearchResponse = serde_json::from_value(body).unwrap();
        assert!(parsed.into_recipes().is_empty());
    }

    #[test]
    fn test_optional_fields_missing() {
        let body = json!({"recipes": {"recipe": {"recipe_id": "3", "recipe_name": "Toast"}}});
        let parsed: RecipeSearchResponse = serde_json::from_value(body).unwrap();
        let recipe = &parsed.into_recipes()[0];
        assert!(recipe.description.is_none());
        assert!(recipe.image.is_none());
    }
}
