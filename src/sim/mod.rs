pub mod event;
pub mod gateway;
pub mod round;
pub mod session;
