//! User accounts and roles

pub mod models;
pub mod repository;

pub use models::{Actor, Role, User, UserStatus};
pub use repository::UserRepository;
