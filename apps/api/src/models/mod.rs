pub mod problem;
pub mod user;
