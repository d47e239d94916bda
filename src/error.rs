use thiserror::Error;

/// Errors raised while wiring effects onto a page or loading configuration.
///
/// None of these are fatal for the page: `init_page` logs them and carries on
/// with the remaining components.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("slider region {region} is missing its {part}")]
    MissingSliderPart { region: usize, part: &'static str },

    #[error("no slider regions found")]
    NoSliderRegions,

    #[error("typewriter target not found: {0}")]
    MissingTypewriterTarget(String),

    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("layout error: {0}")]
    Layout(#[from] taffy::TaffyError),
}

pub type Result<T> = std::result::Result<T, PageError>;
