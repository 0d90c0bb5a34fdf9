mod reader;

pub use reader::{PacketReader, read_payload};
