pub mod activity;
pub mod auth_token;
pub mod notice;
pub mod notice_read;
pub mod notice_recipient;
pub mod task;
pub mod task_team;
pub mod user;
