pub mod focus;
pub mod gamepad;
pub mod input;
pub mod messages;
pub mod presenter;
pub mod renderer;
pub mod sound;
