pub mod alert;

pub use alert::AlertRequest;
