pub mod account;
pub mod api_error;
