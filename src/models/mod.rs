mod user;

pub use user::{Address, Company, User};
