// UI type definitions for SmartPlan
// Form state, texture caches and styling shared by the panels

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use eframe::egui;
use egui_phosphor::regular as icons;
use smartplan::genai::ImageData;
use smartplan::{AppView, Category, NewAgendaItem};
use std::time::Duration;

/// How long the "copied" badge stays up after copying a password
pub const COPIED_INDICATOR: Duration = Duration::from_secs(2);

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(79, 70, 229);
pub const MUTED: egui::Color32 = egui::Color32::from_rgb(120, 120, 130);
pub const ERROR: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);
pub const SUCCESS: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);

pub fn view_icon(view: AppView) -> &'static str {
    match view {
        AppView::Agenda => icons::CALENDAR_CHECK,
        AppView::Studio => icons::IMAGE,
        AppView::Video => icons::VIDEO_CAMERA,
        AppView::Password => icons::KEY,
        AppView::Clips => icons::FILM_STRIP,
        AppView::Connect => icons::SHARE_NETWORK,
        AppView::Settings => icons::GEAR,
    }
}

pub fn category_color(category: Category) -> egui::Color32 {
    match category {
        Category::Work => egui::Color32::from_rgb(59, 130, 246),
        Category::Personal => egui::Color32::from_rgb(168, 85, 247),
        Category::Health => egui::Color32::from_rgb(34, 197, 94),
        Category::Other => egui::Color32::from_rgb(107, 114, 128),
    }
}

/// Light theme with an indigo accent
pub fn apply_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);

    let mut visuals = egui::Visuals::light();
    visuals.widgets.noninteractive.bg_fill = egui::Color32::from_rgb(245, 245, 247);
    visuals.widgets.inactive.bg_fill = egui::Color32::from_rgb(238, 238, 243);
    visuals.widgets.hovered.bg_fill = egui::Color32::from_rgb(226, 226, 236);
    visuals.widgets.active.bg_fill = ACCENT;
    visuals.selection.bg_fill = egui::Color32::from_rgba_premultiplied(79, 70, 229, 80);
    visuals.extreme_bg_color = egui::Color32::from_rgb(250, 250, 252);
    visuals.panel_fill = egui::Color32::from_rgb(248, 248, 250);
    visuals.window_fill = egui::Color32::WHITE;

    style.visuals = visuals;
    ctx.set_style(style);
}

/// The "new agenda item" form; date and time are entered in local time
#[derive(Debug, Clone)]
pub struct AgendaForm {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub category: Category,
}

impl Default for AgendaForm {
    fn default() -> Self {
        let soon = Local::now() + chrono::Duration::hours(1);
        Self {
            title: String::new(),
            description: String::new(),
            date: soon.format(DATE_FORMAT).to_string(),
            time: soon.format(TIME_FORMAT).to_string(),
            category: Category::default(),
        }
    }
}

impl AgendaForm {
    /// Validate the inputs; the error is shown under the form
    pub fn to_new_item(&self) -> Result<NewAgendaItem, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|_| format!("Date must look like {}", Local::now().format(DATE_FORMAT)))?;
        let time = NaiveTime::parse_from_str(self.time.trim(), TIME_FORMAT)
            .map_err(|_| "Time must be HH:MM (24h)".to_string())?;

        let local = Local
            .from_local_datetime(&NaiveDateTime::new(date, time))
            .earliest()
            .ok_or_else(|| "That time does not exist in your time zone".to_string())?;

        Ok(NewAgendaItem::new(title, local.with_timezone(&Utc))
            .with_description(self.description.trim())
            .with_category(self.category))
    }

    /// Keep the schedule fields for quick follow-up entries
    pub fn clear_text(&mut self) {
        self.title.clear();
        self.description.clear();
    }
}

/// Decoded textures for the image lab, rebuilt when its images change
///
/// The inner `None` remembers a failed decode so it is not retried every frame.
#[derive(Default)]
pub struct LabTextures {
    source: Option<Option<egui::TextureHandle>>,
    result: Option<Option<egui::TextureHandle>>,
}

impl LabTextures {
    pub fn clear(&mut self) {
        self.source = None;
        self.result = None;
    }

    pub fn source(&mut self, ctx: &egui::Context, data: &ImageData) -> Option<&egui::TextureHandle> {
        self.source
            .get_or_insert_with(|| load_texture(ctx, "image-lab-source", data))
            .as_ref()
    }

    pub fn result(&mut self, ctx: &egui::Context, data: &ImageData) -> Option<&egui::TextureHandle> {
        self.result
            .get_or_insert_with(|| load_texture(ctx, "image-lab-result", data))
            .as_ref()
    }
}

/// Decode an image into an egui texture; undecodable data is logged and skipped
pub fn load_texture(ctx: &egui::Context, name: &str, data: &ImageData) -> Option<egui::TextureHandle> {
    match image::load_from_memory(&data.bytes) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR))
        }
        Err(e) => {
            tracing::warn!("Could not decode {} ({}): {}", name, data.mime_type, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, date: &str, time: &str) -> AgendaForm {
        AgendaForm {
            title: title.to_string(),
            description: "  notes ".to_string(),
            date: date.to_string(),
            time: time.to_string(),
            category: Category::Health,
        }
    }

    #[test]
    fn test_form_builds_item_in_local_time() {
        let item = form(" Dentist ", "2030-01-02", "09:30").to_new_item().unwrap();

        let expected = Local
            .from_local_datetime(&NaiveDateTime::new(
                NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
                NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            ))
            .earliest()
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(item.title, "Dentist");
        assert_eq!(item.description, "notes");
        assert_eq!(item.category, Category::Health);
        assert_eq!(item.time, expected);
    }

    #[test]
    fn test_form_rejects_bad_input() {
        assert!(form("   ", "2030-01-02", "09:30").to_new_item().is_err());
        assert!(form("Gym", "02/01/2030", "09:30").to_new_item().is_err());
        assert!(form("Gym", "2030-01-02", "9.30pm").to_new_item().is_err());
    }

    #[test]
    fn test_clear_text_keeps_schedule() {
        let mut f = form("Gym", "2030-01-02", "09:30");
        f.clear_text();
        assert!(f.title.is_empty());
        assert_eq!(f.date, "2030-01-02");
        assert_eq!(f.time, "09:30");
    }
}
