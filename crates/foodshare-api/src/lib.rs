pub mod error;
pub mod foods;
pub mod requests;
pub mod session;
