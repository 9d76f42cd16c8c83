pub mod error;
pub mod geoglows;
