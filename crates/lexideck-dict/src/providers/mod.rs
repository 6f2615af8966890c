use lexideck_types::{Language, Translation};

use crate::dictionary::Dictionary;

mod cambridge;
mod oxford;

pub use cambridge::CambridgeDictionary;
pub use oxford::OxfordDictionary;

/// The provider set serving one translation direction: either a single
/// dictionary supplying every field, or a main dictionary plus a separate
/// meaning dictionary.
pub enum ProviderSet {
    Single(Box<dyn Dictionary>),
    Dual {
        main: Box<dyn Dictionary>,
        meaning: Box<dyn Dictionary>,
    },
}

/// Provider dispatch per translation pair. `None` means the pair is not
/// supported.
pub fn providers_for(client: &reqwest::Client, translation: &Translation) -> Option<ProviderSet> {
    match (translation.source, translation.target) {
        (Language::English, Language::English) => Some(ProviderSet::Single(Box::new(
            OxfordDictionary::new(client.clone()),
        ))),
        (Language::English, Language::Vietnamese) => Some(ProviderSet::Dual {
            main: Box::new(OxfordDictionary::new(client.clone())),
            meaning: Box::new(CambridgeDictionary::new(client.clone())),
        }),
        _ => None,
    }
}
