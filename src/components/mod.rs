pub mod colors;
pub mod tools;
