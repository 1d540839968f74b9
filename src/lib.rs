//! Nutrisage - nutrition answers grounded in a local document corpus
//!
//! Builds a semantic index over a directory of text files, retrieves the
//! passages closest to a question and has a generative model answer from
//! them. Food-item lookups go straight to the model.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod index;
pub mod llm;
pub mod responder;
pub mod service;

pub use error::{NutriError, Result};
pub use service::NutritionService;
