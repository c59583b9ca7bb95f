pub mod encrypt;
pub mod order;
