//! Data for the sibling panel components: the tip banner and the stage list.
//!
//! Both are supplied from outside (the config file today) and rendered
//! read-only. Neither feeds back into the submission flow.

use serde::{Deserialize, Serialize};

/// Visual tone of the tip banner.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TipVariant {
    #[default]
    Info,
    Success,
    Warning,
}

impl TipVariant {
    pub fn label(self) -> &'static str {
        match self {
            TipVariant::Info => "Tip",
            TipVariant::Success => "Done",
            TipVariant::Warning => "Heads up",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tip {
    pub text: String,
    pub variant: TipVariant,
    pub dismissible: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Activity {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub impact: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Stage {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// Any color ratatui can parse: a name ("cyan") or hex ("#33aa77").
    pub accent_color: Option<String>,
}
