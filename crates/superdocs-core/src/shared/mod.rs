pub mod message;

pub use message::{Plan, StreamMessage};
