mod request;
mod validator;

pub use request::*;
pub use validator::*;
