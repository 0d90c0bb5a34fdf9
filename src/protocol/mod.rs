pub mod command;
pub mod packet;
pub mod primitive;
pub mod response;
pub mod r#trait;

pub use r#trait::{Rows, Transport};
