pub mod identifier;
pub mod record;
pub mod schema;
pub mod store;
pub mod validator;
