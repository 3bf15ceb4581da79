pub mod activity;
pub mod auth_token;
pub mod ids;
pub mod notice;
pub mod task;
pub mod user;
