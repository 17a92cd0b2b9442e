pub mod jobs;
pub mod print;
