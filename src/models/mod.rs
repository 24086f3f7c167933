pub mod batch;
pub mod course;
pub mod registration;
pub mod session;
pub mod user;
