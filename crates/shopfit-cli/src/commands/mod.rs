pub mod optimize;
pub mod research;
