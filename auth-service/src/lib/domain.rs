pub mod auth;
pub mod deadline;
pub mod errors;
pub mod session;
pub mod user;
