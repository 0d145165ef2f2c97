pub mod cors;
pub mod routing;
pub mod types;
