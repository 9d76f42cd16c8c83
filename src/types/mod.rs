pub mod forecast;
pub mod station;
pub mod variable;
