pub mod ask;
pub mod chat;
pub mod insights;
pub mod log;
pub mod search;
pub mod status;
pub mod version;
