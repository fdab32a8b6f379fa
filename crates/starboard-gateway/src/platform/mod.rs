//! Chat platform adapters

mod dto;
mod rest;

pub use dto::{ApiErrorBody, CreateMessageRequest, EditMessageRequest, MessageDto};
pub use rest::{RestPlatform, REACTORS_PAGE_LIMIT};
