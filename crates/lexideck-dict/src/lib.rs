pub mod dictionary;
pub mod error;
pub mod html;
pub mod media;
pub mod providers;

pub use dictionary::Dictionary;
pub use error::FetchError;
pub use providers::{CambridgeDictionary, OxfordDictionary, ProviderSet, providers_for};
