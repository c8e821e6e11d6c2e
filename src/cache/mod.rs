pub mod message;
pub mod token;
pub mod token_store;
