pub mod mood;
pub mod normalizer;
pub mod progress;
pub mod providers;
pub mod radar;
pub mod ranker;
