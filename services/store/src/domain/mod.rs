pub mod hooks;
pub mod repository;
