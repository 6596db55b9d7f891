pub mod interview_store;
pub mod memory_store;
pub mod pool;
