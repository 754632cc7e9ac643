pub mod scoring;
pub mod similarity;
