pub mod watermark;

pub use watermark::{UpsertWatermark, User, Watermark};
