pub mod authorizations;
pub mod chat;
pub mod health;
