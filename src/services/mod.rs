pub mod directory_service;
pub mod interview_service;
pub mod notification_service;
pub mod reminder_service;
