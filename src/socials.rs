// Static directory of social links shown on the connect panel

use egui::Color32;
use egui_phosphor::regular as icons;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocialLink {
    pub id: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    /// Phosphor glyph
    pub icon: &'static str,
    /// Hover/border accent
    pub accent: Color32,
}

pub const SOCIALS: [SocialLink; 7] = [
    SocialLink {
        id: "github",
        name: "GitHub",
        url: "https://github.com",
        icon: icons::GITHUB_LOGO,
        accent: Color32::from_rgb(31, 41, 55),
    },
    SocialLink {
        id: "twitter",
        name: "Twitter",
        url: "https://twitter.com",
        icon: icons::TWITTER_LOGO,
        accent: Color32::from_rgb(14, 165, 233),
    },
    SocialLink {
        id: "linkedin",
        name: "LinkedIn",
        url: "https://linkedin.com",
        icon: icons::LINKEDIN_LOGO,
        accent: Color32::from_rgb(29, 78, 216),
    },
    SocialLink {
        id: "instagram",
        name: "Instagram",
        url: "https://instagram.com",
        icon: icons::INSTAGRAM_LOGO,
        accent: Color32::from_rgb(219, 39, 119),
    },
    SocialLink {
        id: "portfolio",
        name: "Portfolio",
        url: "https://example.com",
        icon: icons::BRIEFCASE,
        accent: Color32::from_rgb(79, 70, 229),
    },
    SocialLink {
        id: "youtube",
        name: "YouTube",
        url: "https://youtube.com",
        icon: icons::YOUTUBE_LOGO,
        accent: Color32::from_rgb(220, 38, 38),
    },
    SocialLink {
        id: "buzzer",
        name: "Buzzer",
        url: "https://buzzer.com",
        icon: icons::MEGAPHONE,
        accent: Color32::from_rgb(245, 158, 11),
    },
];

/// Open a link in the default browser
pub fn open_link(link: &SocialLink) -> std::io::Result<()> {
    tracing::debug!("Opening {} ({})", link.name, link.url);
    open::that(link.url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique_and_urls_https() {
        let ids: HashSet<_> = SOCIALS.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), SOCIALS.len());
        assert!(SOCIALS.iter().all(|s| s.url.starts_with("https://")));
    }

    #[test]
    fn test_directory_order() {
        let names: Vec<_> = SOCIALS.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            ["GitHub", "Twitter", "LinkedIn", "Instagram", "Portfolio", "YouTube", "Buzzer"]
        );
    }
}
