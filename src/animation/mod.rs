pub mod bridge;
pub mod ease;
pub mod value;
