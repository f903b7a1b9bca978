use thiserror::Error;

/// Violations du contrat d'appel. Les manques de données ne sont jamais des erreurs :
/// ils retombent sur des valeurs neutres.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("pool invalide : {expected} numéros attendus, {actual} reçus")]
    PoolSize { expected: usize, actual: usize },

    #[error("numéro {0} hors limites (1-45)")]
    NumberOutOfRange(u8),

    #[error("numéro en double dans le pool : {0}")]
    DuplicateNumber(u8),

    #[error("configuration invalide : {0}")]
    InvalidConfig(String),

    #[error("lecture/écriture de configuration : {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("format de configuration : {0}")]
    ConfigFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
