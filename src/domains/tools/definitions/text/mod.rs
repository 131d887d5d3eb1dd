pub mod char_count;

pub use char_count::{CharCountParams, CharCountTool};
