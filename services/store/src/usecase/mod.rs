pub mod role_manager;
pub mod user_manager;
