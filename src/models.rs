pub mod auth;
pub mod dashboard;
pub mod diagnostic;
pub mod filing;
pub mod inventory;
pub mod periods;
pub mod retention;
pub mod settings;
