// Image and video lab panels

use crate::ui::types::{ERROR, MUTED, SUCCESS};
use eframe::egui;
use egui_phosphor::regular as icons;
use smartplan::genai::{AspectRatio, Resolution};
use smartplan::labs::{ImageMode, BILLING_URL};

const PREVIEW_WIDTH: f32 = 360.0;

fn show_texture(ui: &mut egui::Ui, texture: &egui::TextureHandle) {
    ui.add(
        egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
            .max_width(PREVIEW_WIDTH),
    );
}

fn unavailable(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(30.0);
        ui.label(egui::RichText::new("AI tools are not configured.").color(MUTED));
    });
}

impl crate::SmartPlanApp {
    pub fn render_image_lab(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(lab) = self.image_lab.as_mut() else {
            unavailable(ui);
            return;
        };

        let mut pick_requested = false;

        ui.horizontal(|ui| {
            for mode in [ImageMode::Generate, ImageMode::Edit] {
                if ui.selectable_label(lab.mode() == mode, mode.label()).clicked() {
                    lab.set_mode(mode);
                    self.lab_textures.clear();
                }
            }
        });
        ui.add_space(8.0);

        if lab.mode() == ImageMode::Edit {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(
                        !lab.is_loading(),
                        egui::Button::new(format!("{} Choose image", icons::UPLOAD_SIMPLE)),
                    )
                    .clicked()
                {
                    pick_requested = true;
                }
                if let Some(source) = lab.source() {
                    ui.label(egui::RichText::new(&source.mime_type).color(MUTED));
                }
            });
            if let Some(source) = lab.source() {
                if let Some(texture) = self.lab_textures.source(ctx, source) {
                    show_texture(ui, texture);
                }
            }
            ui.add_space(8.0);
        }

        let hint = match lab.mode() {
            ImageMode::Generate => "Describe the image you want...",
            ImageMode::Edit => "Describe how to change the image...",
        };
        ui.add(
            egui::TextEdit::multiline(&mut lab.prompt)
                .hint_text(hint)
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );

        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    lab.can_submit(),
                    egui::Button::new(format!("{} {}", icons::SPARKLE, lab.mode().label())),
                )
                .clicked()
                && lab.submit()
            {
                self.lab_textures.clear();
            }
            if ui.button(format!("{} Start over", icons::ARROW_COUNTER_CLOCKWISE)).clicked() {
                lab.reset();
                self.lab_textures.clear();
            }
            if lab.is_loading() {
                ui.spinner();
                ui.label(egui::RichText::new("Working on it...").color(MUTED));
            }
        });

        if let Some(error) = lab.error() {
            ui.colored_label(ERROR, error);
        }

        if let Some(result) = lab.result() {
            ui.add_space(12.0);
            if let Some(texture) = self.lab_textures.result(ctx, result) {
                show_texture(ui, texture);
            }
            ui.horizontal(|ui| {
                if ui.button(format!("{} Save", icons::DOWNLOAD_SIMPLE)).clicked() {
                    lab.save_result();
                }
                if let Some(path) = lab.saved_to() {
                    ui.colored_label(SUCCESS, format!("Saved to {}", path.display()));
                }
            });
        }

        if pick_requested {
            self.pick_source_image();
        }
    }

    /// Ask for a local image and load it as the edit source
    fn pick_source_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif", "bmp"])
            .pick_file()
        else {
            return;
        };
        let (Some(runtime), Some(lab)) = (self.deps.runtime.clone(), self.image_lab.as_mut()) else {
            return;
        };

        let loaded = runtime
            .block_on(self.deps.filesystem.read(&path))
            .and_then(|bytes| lab.load_source(bytes));
        match loaded {
            Ok(()) => tracing::info!("Loaded source image {:?}", path),
            Err(e) => tracing::warn!("Could not load {:?}: {}", path, e),
        }
        self.lab_textures.clear();
    }

    pub fn render_video_lab(&mut self, ui: &mut egui::Ui) {
        let Some(lab) = self.video_lab.as_mut() else {
            unavailable(ui);
            return;
        };

        if !lab.has_credential() {
            ui.group(|ui| {
                ui.set_width(ui.available_width());
                ui.label(egui::RichText::new(format!("{} API key required", icons::KEY)).strong());
                ui.label("Video generation needs a Gemini API key from a project with billing enabled.");
                ui.hyperlink_to("Billing documentation", BILLING_URL);
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.credential_input)
                            .password(true)
                            .hint_text("Paste API key")
                            .desired_width(280.0),
                    );
                    if ui.button("Use key").clicked() && lab.select_credential(&self.credential_input) {
                        self.credential_input.clear();
                    }
                });
                if let Some(error) = lab.error() {
                    ui.colored_label(ERROR, error);
                }
            });
            return;
        }

        let busy = lab.is_loading();
        ui.add_enabled(
            !busy,
            egui::TextEdit::multiline(&mut lab.prompt)
                .hint_text("Describe the scene...")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );

        ui.add_enabled_ui(!busy, |ui| {
            ui.horizontal(|ui| {
                ui.label("Aspect");
                for ratio in [AspectRatio::Landscape, AspectRatio::Portrait] {
                    ui.radio_value(&mut lab.aspect_ratio, ratio, ratio.label());
                }
                ui.add_space(12.0);
                ui.label("Resolution");
                for resolution in [Resolution::Hd, Resolution::FullHd] {
                    ui.radio_value(&mut lab.resolution, resolution, resolution.as_str());
                }
            });
        });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    lab.can_submit(),
                    egui::Button::new(format!("{} Generate video", icons::FILM_SLATE)),
                )
                .clicked()
            {
                lab.submit();
            }
            if ui.button(format!("{} Reset", icons::ARROW_COUNTER_CLOCKWISE)).clicked() {
                lab.reset();
            }
        });

        if busy {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new(lab.progress_message()).italics().color(MUTED));
            });
            ui.label(
                egui::RichText::new("This usually takes a few minutes.")
                    .size(11.0)
                    .color(MUTED),
            );
        }

        if let Some(error) = lab.error() {
            ui.colored_label(ERROR, error);
        }

        if let Some(path) = lab.video_path().map(|p| p.display().to_string()) {
            ui.add_space(8.0);
            ui.colored_label(SUCCESS, format!("Video ready: {}", path));
            if ui.button(format!("{} Play", icons::PLAY)).clicked() {
                lab.open_video();
            }
        }
    }
}
