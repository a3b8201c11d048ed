// Dashboard panels and their persisted names

use serde::{Deserialize, Serialize};

/// Which panel the main area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppView {
    #[default]
    Agenda,
    /// Image lab
    Studio,
    /// Video lab
    Video,
    Password,
    /// Shorts feed
    Clips,
    /// Social links
    Connect,
    Settings,
}

impl AppView {
    pub const ALL: [AppView; 7] = [
        AppView::Agenda,
        AppView::Studio,
        AppView::Video,
        AppView::Password,
        AppView::Clips,
        AppView::Connect,
        AppView::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppView::Agenda => "agenda",
            AppView::Studio => "studio",
            AppView::Video => "video",
            AppView::Password => "password",
            AppView::Clips => "clips",
            AppView::Connect => "connect",
            AppView::Settings => "settings",
        }
    }

    /// Unknown names fall back to the agenda
    pub fn parse(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|view| view.as_str() == raw.trim())
            .unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppView::Agenda => "Agenda",
            AppView::Studio => "Image Lab",
            AppView::Video => "Video Lab",
            AppView::Password => "Password Gen",
            AppView::Clips => "Shorts",
            AppView::Connect => "Connect",
            AppView::Settings => "Settings",
        }
    }
}
