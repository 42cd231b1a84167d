pub mod contract;
pub mod input;
pub mod recommendation;
pub mod score;
