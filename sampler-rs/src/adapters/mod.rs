pub(crate) mod gaussian;
pub mod mock;
pub mod polling;
pub mod production;
pub mod simulated;
