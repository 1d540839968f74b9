use super::{complete_within, nutrition_prompt, require_text, settle, Operation, ResponderError};
use crate::llm::LanguageModel;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Answers food-item lookups from the model's own knowledge, no index involved
pub struct DirectResponder {
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
}

impl DirectResponder {
    pub fn new(model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Nutrition breakdown for `food_item`, or a fixed fallback string
    pub async fn analyze(&self, food_item: &str) -> String {
        let result = self.try_analyze(food_item).await;
        if result.is_ok() {
            info!(food = food_item, "Fetched nutrition data");
        }
        settle(Operation::Analyze, food_item, result)
    }

    pub async fn try_analyze(&self, food_item: &str) -> Result<String, ResponderError> {
        let food_item = require_text(food_item, "food item")?;
        let prompt = nutrition_prompt(food_item);
        Ok(complete_within(self.model.as_ref(), &prompt, self.timeout).await?)
    }
}
