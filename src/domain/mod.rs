pub mod geometry;
pub mod item;
pub mod layout;
pub mod palette;
