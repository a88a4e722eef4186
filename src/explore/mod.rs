pub mod driver;
pub mod error;
pub mod observer;
pub mod result;
pub mod session;
pub mod simulated;
