pub mod auth;
pub mod exam;
pub mod export;
pub mod health;
pub mod question;
pub mod subject;
