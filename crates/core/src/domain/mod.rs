pub mod client;
pub mod instrument;
pub mod market;
pub mod recommendation;
