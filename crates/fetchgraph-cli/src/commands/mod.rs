pub mod check;
pub mod list;
pub mod merge;
pub mod plan;
pub mod resolve;
