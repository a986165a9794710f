pub mod health;
pub mod hello;
pub mod pets;
pub mod sign_out;
