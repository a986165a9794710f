pub mod pets;
pub mod sign_out;
