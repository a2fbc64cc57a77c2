pub mod form_post;
pub mod webhook;
