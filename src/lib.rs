//! Assistant panel library exports for testing

use clap::ValueEnum;

pub mod core;
pub mod inference;
pub mod tui;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[value(name = "lmstudio")]
    LmStudio,
    #[value(name = "openrouter")]
    OpenRouter,
}

impl Provider {
    /// Name used in the config file and `ASSIST_PANEL_PROVIDER`.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::LmStudio => "lmstudio",
            Provider::OpenRouter => "openrouter",
        }
    }
}
