//! Prompt templates
use crate::index::RetrievedDocument;

/// Direct lookup prompt for a single food item
pub fn nutrition_prompt(food_item: &str) -> String {
    format!(
        "You are a food nutrition expert.\n\
         Give me detailed nutrition info for food item: {food_item}.\n\
         Mention various vitamins, minerals, their proportions, and use cases."
    )
}

/// Context-stuffed prompt for a retrieval-grounded question
///
/// `retrieved` is most similar first; it is written in reverse so the most
/// similar passage ends up directly above the question.
pub fn retrieval_prompt(question: &str, retrieved: &[RetrievedDocument]) -> String {
    let context = retrieved
        .iter()
        .rev()
        .map(|hit| hit.document.content())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Use the following pieces of context to answer the question at the end. \
         Answer using only the provided context when it is relevant. \
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         {context}\n\n\
         Question: {question}\n\
         Helpful Answer:"
    )
}
