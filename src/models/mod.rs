pub mod email_outbox;
pub mod interview;
pub mod notification;
pub mod user;
