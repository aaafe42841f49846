//! Per-provider sampling validation.

use crate::schema::{GeminiSettings, OpenAiSettings, GEMINI_MODELS, OPENAI_MODELS};

use super::helpers::{validate_min, validate_one_of, validate_range_f64};

pub(crate) fn validate_gemini(errors: &mut Vec<String>, gemini: &GeminiSettings) {
    validate_one_of(errors, "gemini.model", &gemini.model, GEMINI_MODELS);
    validate_range_f64(errors, "gemini.temperature", gemini.temperature, 0.0, 1.0);
    validate_range_f64(errors, "gemini.top_p", gemini.top_p, 0.0, 1.0);
    validate_min(errors, "gemini.top_k", gemini.top_k, 1);
    validate_min(
        errors,
        "gemini.max_output_tokens",
        gemini.max_output_tokens,
        1,
    );
}

pub(crate) fn validate_openai(errors: &mut Vec<String>, openai: &OpenAiSettings) {
    validate_one_of(errors, "openai.model", &openai.model, OPENAI_MODELS);
    validate_range_f64(errors, "openai.temperature", openai.temperature, 0.0, 2.0);
    validate_range_f64(errors, "openai.top_p", openai.top_p, 0.0, 1.0);
    validate_range_f64(
        errors,
        "openai.presence_penalty",
        openai.presence_penalty,
        -2.0,
        2.0,
    );
    validate_range_f64(
        errors,
        "openai.frequency_penalty",
        openai.frequency_penalty,
        -2.0,
        2.0,
    );
    if let Some(max_tokens) = openai.max_tokens {
        validate_min(errors, "openai.max_tokens", max_tokens, 1);
    }
}

pub(crate) fn validate_priority(errors: &mut Vec<String>, priority: Option<&[String]>) {
    let Some(priority) = priority else {
        return;
    };
    if priority.is_empty() {
        errors.push("model_priority must name at least one model".into());
    }
    for (i, model) in priority.iter().enumerate() {
        if model.trim().is_empty() {
            errors.push(format!("model_priority[{i}] is blank"));
        }
    }
}
