pub mod clash;
pub mod fill;
pub mod scripting;
pub mod shapes;
