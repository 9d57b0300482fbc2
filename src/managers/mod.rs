pub mod session;
pub mod suggest;
