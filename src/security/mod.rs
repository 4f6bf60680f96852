pub mod validator;

pub use validator::SecurityValidator;
