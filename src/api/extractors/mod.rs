pub mod auth_ctx;
