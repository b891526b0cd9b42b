//! Core library for qna
//!
//! This crate implements the **Functional Core** of the qna client,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`qna_core`** (this crate): Pure transformation functions with zero I/O
//! - **`qna`**: HTTP transport, controllers and the CLI (the Imperative Shell)
//!
//! Everything here takes plain data and returns plain data: the wire types of
//! the questions API, the mapping into canonical view models, the derivation
//! of list request parameters, page controls, and form validation. None of it
//! needs a server to test.
//!
//! # Module Organization
//!
//! - [`question`]: Wire types, canonical view models and the mapper between them
//! - [`query`]: List query state, request parameters and navigation commands
//! - [`pagination`]: Page control generation
//! - [`validation`]: Checks that run before a request is sent
//! - [`format`]: Timestamp and text formatting for display
//!
//! # Example Usage
//!
//! ```rust
//! use qna_core::question::{transform_questions_response, RawQuestionsResponse};
//! use qna_core::pagination::pagination_links;
//!
//! let raw: RawQuestionsResponse = serde_json::from_str(
//!     r#"{"questions": [], "pagination": {"total": 0, "page": 1, "limit": 10, "total_pages": 0}}"#,
//! )
//! .unwrap();
//!
//! let list = transform_questions_response(raw).unwrap();
//! assert!(list.questions.is_empty());
//! assert!(pagination_links(list.pagination.as_ref()).is_empty());
//! ```

pub mod format;
pub mod pagination;
pub mod query;
pub mod question;
pub mod validation;
