//! Data models for users, quiz content and FatSecret recipes.
//!
//! Stored documents use camelCase field names; FatSecret payloads keep the
//! API's snake_case names via explicit renames.

mod quiz;
mod recipe;
mod user;

pub use quiz::{QuestionView, QuizQuestion, QuizResult, QuizSubmission};
pub use recipe::{ApiErrorResponse, OneOrMany, Recipe, RecipePage, RecipeSearchResponse};
pub use user::{SessionUser, User};
