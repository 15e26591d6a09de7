use axum::{
    extract::{Json, State},
    response::{IntoResponse, Json as AxumJson},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::AppError;
use crate::AppState;

const RECIPE_COUNT: u8 = 5;
const NO_INSTRUCTIONS: &str = "No instructions available.";

#[derive(Deserialize)]
pub struct RecipeRequest {
    /// Comma-separated leftover ingredients, e.g. "tomato, onion, pasta".
    pub ingredients: String,
    pub diet: Option<String>,
    /// ISO language code; anything other than "en" triggers translation
    /// when a translation endpoint is configured.
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoundRecipe {
    id: i64,
    title: String,
    #[serde(default)]
    used_ingredients: Vec<IngredientRef>,
    #[serde(default)]
    missed_ingredients: Vec<IngredientRef>,
}

#[derive(Debug, Deserialize)]
struct IngredientRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RecipeInformation {
    instructions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecipeSuggestion {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

pub async fn suggest_recipes(
    State(state): State<AppState>,
    Json(req): Json<RecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ingredients = req.ingredients.trim();
    if ingredients.is_empty() {
        return Err(AppError::Validation(
            "Please enter at least one ingredient".to_string(),
        ));
    }

    let api_key = state.recipe_api_key.as_deref().ok_or_else(|| {
        AppError::Upstream("recipe service is not configured".to_string())
    })?;

    let encoded: String = url::form_urlencoded::byte_serialize(ingredients.as_bytes()).collect();
    let mut search_url = format!(
        "{}/recipes/findByIngredients?apiKey={}&ingredients={}&number={}",
        state.recipe_api_base, api_key, encoded, RECIPE_COUNT
    );
    if let Some(diet) = req.diet.as_deref().filter(|d| !d.eq_ignore_ascii_case("none")) {
        let diet: String = url::form_urlencoded::byte_serialize(diet.to_lowercase().as_bytes()).collect();
        search_url.push_str(&format!("&diet={}", diet));
    }

    let found: Vec<FoundRecipe> = fetch_json(&state, &search_url).await?;

    let language = req.language.as_deref().unwrap_or("en");
    let mut suggestions = Vec::with_capacity(found.len());
    for recipe in found {
        let info_url = format!(
            "{}/recipes/{}/information?apiKey={}",
            state.recipe_api_base, recipe.id, api_key
        );
        let info: RecipeInformation = fetch_json(&state, &info_url).await?;
        let mut steps = extract_steps(info.instructions.as_deref().unwrap_or(""));

        let mut title = recipe.title;
        if language != "en" {
            title = translate(&state, &title, language).await.unwrap_or(title);
            for step in &mut steps {
                if let Some(translated) = translate(&state, step, language).await {
                    *step = translated;
                }
            }
        }

        let ingredients = recipe
            .used_ingredients
            .into_iter()
            .chain(recipe.missed_ingredients)
            .map(|i| i.name)
            .collect();

        suggestions.push(RecipeSuggestion {
            id: recipe.id,
            title,
            ingredients,
            steps,
        });
    }

    Ok(AxumJson(serde_json::json!({ "recipes": suggestions })))
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    state: &AppState,
    url: &str,
) -> Result<T, AppError> {
    let resp = state.http.get(url).send().await.map_err(|e| {
        tracing::error!("Recipe service request failed: {}", e);
        AppError::Upstream("recipe service unreachable".to_string())
    })?;

    if !resp.status().is_success() {
        return Err(AppError::Upstream(format!(
            "recipe service returned {}",
            resp.status()
        )));
    }

    resp.json().await.map_err(|e| {
        tracing::error!("Recipe service response malformed: {}", e);
        AppError::Upstream("recipe service response malformed".to_string())
    })
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Best-effort translation. Any failure degrades to the original English
/// text with a warning, never an error to the caller.
async fn translate(state: &AppState, text: &str, target: &str) -> Option<String> {
    let endpoint = state.translate_api_url.as_deref()?;

    let result = state
        .http
        .post(endpoint)
        .json(&serde_json::json!({ "q": text, "source": "en", "target": target }))
        .send()
        .await;

    match result {
        Ok(resp) if resp.status().is_success() => match resp.json::<TranslateResponse>().await {
            Ok(body) => Some(body.translated_text),
            Err(e) => {
                tracing::warn!("Translation response malformed: {}", e);
                None
            }
        },
        Ok(resp) => {
            tracing::warn!("Translation service returned {}", resp.status());
            None
        }
        Err(e) => {
            tracing::warn!("Translation request failed: {}", e);
            None
        }
    }
}

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("list item regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

/// Reduces raw instruction markup to an ordered sequence of step strings:
/// list items when the markup has them, otherwise tag-stripped lines.
pub fn extract_steps(instructions_html: &str) -> Vec<String> {
    if instructions_html.trim().is_empty() {
        return vec![NO_INSTRUCTIONS.to_string()];
    }

    let mut steps: Vec<String> = LIST_ITEM_RE
        .captures_iter(instructions_html)
        .map(|cap| TAG_RE.replace_all(&cap[1], "").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if steps.is_empty() {
        steps = TAG_RE
            .replace_all(instructions_html, "\n")
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    if steps.is_empty() {
        vec![NO_INSTRUCTIONS.to_string()]
    } else {
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_ordered_list_items() {
        let html = "<ol><li>Boil water.</li><li>Add <b>pasta</b>.</li><li></li></ol>";
        let steps = extract_steps(html);
        assert_eq!(steps, vec!["Boil water.", "Add pasta."]);
    }

    #[test]
    fn falls_back_to_line_splitting_without_list_markup() {
        let html = "<p>Chop the onion.</p><p>Fry until golden.</p>";
        let steps = extract_steps(html);
        assert_eq!(steps, vec!["Chop the onion.", "Fry until golden."]);
    }

    #[test]
    fn plain_text_splits_on_lines() {
        let steps = extract_steps("Mix everything.\nServe cold.");
        assert_eq!(steps, vec!["Mix everything.", "Serve cold."]);
    }

    #[test]
    fn empty_instructions_yield_placeholder() {
        assert_eq!(extract_steps(""), vec![NO_INSTRUCTIONS]);
        assert_eq!(extract_steps("   "), vec![NO_INSTRUCTIONS]);
        assert_eq!(extract_steps("<ol></ol>"), vec![NO_INSTRUCTIONS]);
    }
}
