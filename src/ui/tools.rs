// Password generator, shorts feed and connect panels

use crate::ui::types::{COPIED_INDICATOR, ERROR, MUTED, SUCCESS};
use eframe::egui;
use egui_phosphor::regular as icons;
use smartplan::password::{self, Strength, MAX_LENGTH, MIN_LENGTH};
use smartplan::shorts::{format_count, ClipKind};
use smartplan::socials::{self, SOCIALS};
use std::time::Instant;

impl crate::SmartPlanApp {
    pub fn render_password_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                let shown = if self.password.is_empty() {
                    egui::RichText::new("Select at least one character type").color(MUTED)
                } else {
                    egui::RichText::new(&self.password).monospace().size(20.0)
                };
                ui.add(egui::Label::new(shown).wrap());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(icons::ARROWS_CLOCKWISE).on_hover_text("Regenerate").clicked() {
                        self.regenerate_password();
                    }
                    let copy = ui.add_enabled(
                        !self.password.is_empty(),
                        egui::Button::new(icons::COPY),
                    );
                    if copy.on_hover_text("Copy").clicked() {
                        ctx.copy_text(self.password.clone());
                        self.copied_at = Some(Instant::now());
                    }
                    if self
                        .copied_at
                        .is_some_and(|at| at.elapsed() < COPIED_INDICATOR)
                    {
                        ui.colored_label(SUCCESS, "Copied!");
                    }
                });
            });
        });

        ui.add_space(12.0);

        let mut changed = false;
        let mut length = self.password_config.length();
        ui.horizontal(|ui| {
            ui.label("Length");
            changed |= ui
                .add(egui::Slider::new(&mut length, MIN_LENGTH..=MAX_LENGTH))
                .changed();
        });
        if changed {
            self.password_config.set_length(length);
        }

        let config = &mut self.password_config;
        changed |= ui.checkbox(&mut config.uppercase, "Uppercase (A-Z)").changed();
        changed |= ui.checkbox(&mut config.lowercase, "Lowercase (a-z)").changed();
        changed |= ui.checkbox(&mut config.numbers, "Numbers (0-9)").changed();
        changed |= ui.checkbox(&mut config.symbols, "Symbols (!@#...)").changed();

        if changed {
            self.regenerate_password();
        }

        ui.add_space(12.0);
        let strength = Strength::of(&self.password_config);
        ui.horizontal(|ui| {
            ui.label("Strength");
            ui.colored_label(strength.color(), strength.label());
        });
        ui.add(
            egui::ProgressBar::new(f32::from(strength.percent()) / 100.0)
                .fill(strength.color())
                .desired_width(ui.available_width().min(400.0)),
        );
    }

    fn regenerate_password(&mut self) {
        self.password = password::generate(&self.password_config);
        self.copied_at = None;
    }

    pub fn render_shorts_view(&mut self, ui: &mut egui::Ui) {
        if let Some(discovery) = &mut self.discovery {
            ui.horizontal(|ui| {
                let response = ui.add_enabled(
                    !discovery.is_searching(),
                    egui::TextEdit::singleline(&mut discovery.query)
                        .hint_text("Discover shorts about...")
                        .desired_width(300.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let clicked = ui
                    .add_enabled(
                        !discovery.is_searching(),
                        egui::Button::new(format!("{} Search", icons::MAGNIFYING_GLASS)),
                    )
                    .clicked();
                if clicked || submitted {
                    discovery.submit();
                }
                if discovery.is_searching() {
                    ui.spinner();
                }
            });
            if let Some(error) = discovery.error() {
                ui.colored_label(ERROR, error);
            }
        }

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!("{} clips", self.api.shorts().len())).color(MUTED),
            );
            if ui.button(format!("{} Reset feed", icons::ARROW_COUNTER_CLOCKWISE)).clicked() {
                self.confirm_reset_shorts = true;
            }
        });
        ui.add_space(8.0);

        for clip in self.api.shorts() {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    let kind_icon = match clip.kind {
                        ClipKind::Youtube => icons::YOUTUBE_LOGO,
                        ClipKind::Video => icons::FILM_STRIP,
                    };
                    ui.label(egui::RichText::new(kind_icon).size(24.0));
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(&clip.user).strong());
                        ui.add(egui::Label::new(&clip.description).wrap());
                        ui.label(
                            egui::RichText::new(format!(
                                "{} {}   {} {}",
                                icons::HEART,
                                format_count(clip.likes),
                                icons::SHARE_FAT,
                                format_count(clip.shares)
                            ))
                            .size(11.0)
                            .color(MUTED),
                        );
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button(format!("{} Watch", icons::PLAY)).clicked() {
                            if let Err(e) = open::that(clip.watch_url()) {
                                tracing::warn!("Failed to open clip {}: {}", clip.id, e);
                            }
                        }
                    });
                });
            });
            ui.add_space(4.0);
        }
    }

    pub fn render_connect_view(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Find me around the web").color(MUTED));
        ui.add_space(8.0);

        egui::Grid::new("socials_grid")
            .num_columns(2)
            .spacing([12.0, 12.0])
            .show(ui, |ui| {
                for (index, link) in SOCIALS.iter().enumerate() {
                    let button = egui::Button::new(
                        egui::RichText::new(format!("{}  {}", link.icon, link.name)).size(16.0),
                    )
                    .stroke(egui::Stroke::new(1.5, link.accent))
                    .min_size(egui::vec2(200.0, 44.0));

                    if ui.add(button).on_hover_text(link.url).clicked() {
                        if let Err(e) = socials::open_link(link) {
                            tracing::warn!("Failed to open {}: {}", link.url, e);
                        }
                    }
                    if index % 2 == 1 {
                        ui.end_row();
                    }
                }
            });
    }
}
