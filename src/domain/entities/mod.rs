mod user;

pub use user::{User, USER_TYPE};
