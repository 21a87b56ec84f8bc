pub mod datetime;
pub mod fixed_string;

pub use datetime::DateTime;
pub use fixed_string::FixedString;
