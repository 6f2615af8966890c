pub mod english;
pub mod generator;
pub mod worker;

pub use english::EnglishGenerator;
pub use generator::{Generator, dual_dictionary_card, initialize_card, single_dictionary_card};
pub use worker::{BatchRequest, BatchSummary, BatchWorker, WorkerError};
