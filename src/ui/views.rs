// UI view rendering methods for SmartPlan
// Login gate, navigation, agenda, settings and the modal dialogs

use crate::ui::types::{category_color, view_icon, ACCENT, ERROR, MUTED, SUCCESS};
use eframe::egui;
use egui_phosphor::regular as icons;
use smartplan::session::LOGOUT_CONFIRMATION;
use smartplan::{AlarmDelivery, AppView, Category, ConfigService, NotificationPermission};

/// Agenda row actions, applied after the list is drawn
enum AgendaAction {
    ToggleComplete(String),
    ToggleAlarm(String),
    Remove(String),
}

impl crate::SmartPlanApp {
    /// Full-window login card shown until a Gmail address is accepted
    pub fn render_login_screen(&mut self, ctx: &egui::Context) {
        crate::ui::apply_style(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.2);
                ui.label(
                    egui::RichText::new(icons::CALENDAR_CHECK)
                        .size(48.0)
                        .color(ACCENT),
                );
                ui.heading(egui::RichText::new("SmartPlan").size(28.0).strong());
                ui.label(egui::RichText::new("Sign in with your Gmail address").color(MUTED));
                ui.add_space(16.0);

                let response = ui.add_sized(
                    [320.0, 32.0],
                    egui::TextEdit::singleline(&mut self.login_email).hint_text("you@gmail.com"),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                ui.add_space(8.0);
                let clicked = ui
                    .add_sized(
                        [320.0, 32.0],
                        egui::Button::new(format!("{} Continue", icons::SIGN_IN)),
                    )
                    .clicked();

                if clicked || submitted {
                    match self.api.login(&self.login_email) {
                        Ok(()) => {
                            self.login_email.clear();
                            self.login_error = None;
                        }
                        Err(e) => {
                            self.login_error = Some(match e {
                                smartplan::SmartPlanError::InvalidInput(msg) => msg,
                                other => other.to_string(),
                            });
                        }
                    }
                }

                if let Some(error) = &self.login_error {
                    ui.add_space(8.0);
                    ui.colored_label(ERROR, error);
                }
            });
        });
    }

    /// Navigation, signed-in user and save status
    pub fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new("SmartPlan").strong().color(ACCENT));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(icons::CARET_LEFT).clicked() {
                    self.sidebar_open = false;
                }
            });
        });
        ui.separator();
        ui.add_space(10.0);

        let active = self.api.active_view();
        for view in AppView::ALL {
            let label = format!("{}  {}", view_icon(view), view.label());
            if ui.selectable_label(active == view, label).clicked() {
                if let Err(e) = self.api.set_view(view) {
                    tracing::error!("Failed to persist active view: {}", e);
                }
            }
            ui.add_space(4.0);
        }

        ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
            ui.add_space(8.0);
            let saved = match self.last_saved {
                Some(at) => format!("{} Saved {}", icons::CLOUD_CHECK, at.format("%H:%M:%S")),
                None => format!("{} Not saved yet", icons::CLOUD),
            };
            ui.label(egui::RichText::new(saved).size(11.0).color(MUTED));
            ui.label(
                egui::RichText::new(format!(
                    "{} pending",
                    self.api.agenda().pending_count()
                ))
                .size(11.0)
                .color(MUTED),
            );
            ui.label(
                egui::RichText::new(format!("{} {}", icons::USER, self.api.session().email()))
                    .size(12.0),
            );
            ui.separator();
        });
    }

    pub fn render_agenda_view(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new("New item").strong());
            ui.add_space(4.0);

            ui.add(
                egui::TextEdit::singleline(&mut self.agenda_form.title)
                    .hint_text("Title")
                    .desired_width(f32::INFINITY),
            );
            ui.add(
                egui::TextEdit::multiline(&mut self.agenda_form.description)
                    .hint_text("Description (optional)")
                    .desired_rows(2)
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                ui.label("Date");
                ui.add(
                    egui::TextEdit::singleline(&mut self.agenda_form.date)
                        .hint_text("YYYY-MM-DD")
                        .desired_width(100.0),
                );
                ui.label("Time");
                ui.add(
                    egui::TextEdit::singleline(&mut self.agenda_form.time)
                        .hint_text("HH:MM")
                        .desired_width(60.0),
                );

                egui::ComboBox::from_id_salt("agenda_category")
                    .selected_text(self.agenda_form.category.label())
                    .show_ui(ui, |ui| {
                        for category in Category::ALL {
                            ui.selectable_value(
                                &mut self.agenda_form.category,
                                category,
                                category.label(),
                            );
                        }
                    });

                if ui.button(format!("{} Add", icons::PLUS)).clicked() {
                    self.agenda_error = match self.agenda_form.to_new_item() {
                        Ok(item) => match self.api.add_item(item) {
                            Ok(_) => {
                                self.agenda_form.clear_text();
                                None
                            }
                            Err(e) => Some(e.to_string()),
                        },
                        Err(msg) => Some(msg),
                    };
                }
            });

            if let Some(error) = &self.agenda_error {
                ui.colored_label(ERROR, error);
            }
        });

        ui.add_space(12.0);

        if self.api.agenda().is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(egui::RichText::new("Nothing scheduled yet.").color(MUTED));
            });
            return;
        }

        let mut actions = Vec::new();
        for item in self.api.agenda().sorted() {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    let complete_icon = if item.completed {
                        icons::CHECK_CIRCLE
                    } else {
                        icons::CIRCLE
                    };
                    if ui.button(complete_icon).on_hover_text("Toggle complete").clicked() {
                        actions.push(AgendaAction::ToggleComplete(item.id.clone()));
                    }

                    ui.vertical(|ui| {
                        let mut title = egui::RichText::new(&item.title).strong();
                        if item.completed {
                            title = title.strikethrough().color(MUTED);
                        }
                        ui.label(title);
                        if !item.description.is_empty() {
                            ui.label(egui::RichText::new(&item.description).size(12.0).color(MUTED));
                        }
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} {}",
                                    icons::CLOCK,
                                    item.time.with_timezone(&chrono::Local).format("%a %d %b, %H:%M")
                                ))
                                .size(11.0)
                                .color(MUTED),
                            );
                            ui.label(
                                egui::RichText::new(item.category.label())
                                    .size(11.0)
                                    .color(category_color(item.category)),
                            );
                        });
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button(icons::TRASH).on_hover_text("Delete").clicked() {
                            actions.push(AgendaAction::Remove(item.id.clone()));
                        }
                        let (bell, hint) = if item.alarm_enabled {
                            (icons::BELL_RINGING, "Alarm on")
                        } else {
                            (icons::BELL_SLASH, "Alarm off")
                        };
                        if ui.button(bell).on_hover_text(hint).clicked() {
                            actions.push(AgendaAction::ToggleAlarm(item.id.clone()));
                        }
                    });
                });
            });
            ui.add_space(4.0);
        }

        for action in actions {
            let result = match action {
                AgendaAction::ToggleComplete(id) => self.api.toggle_complete(&id).map(|_| ()),
                AgendaAction::ToggleAlarm(id) => self.api.toggle_alarm(&id).map(|_| ()),
                AgendaAction::Remove(id) => self.api.remove_item(&id).map(|_| ()),
            };
            if let Err(e) = result {
                tracing::error!("Agenda update failed: {}", e);
                self.agenda_error = Some(e.to_string());
            }
        }
    }

    pub fn render_settings_view(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Account").strong().size(16.0));
        ui.label(format!("Signed in as {}", self.api.session().email()));
        if ui.button(format!("{} Log out", icons::SIGN_OUT)).clicked() {
            self.confirm_logout = true;
        }

        ui.add_space(16.0);
        ui.separator();
        ui.label(egui::RichText::new("Notifications").strong().size(16.0));

        let permission = self.api.notification_permission();
        let (status, color) = match permission {
            NotificationPermission::Granted => ("Desktop notifications are on", SUCCESS),
            NotificationPermission::Denied => ("Desktop notifications are blocked", ERROR),
            NotificationPermission::Default => ("Alarms will show in a dialog", MUTED),
        };
        ui.colored_label(color, status);

        ui.horizontal(|ui| {
            if permission != NotificationPermission::Granted
                && ui.button(format!("{} Allow", icons::BELL)).clicked()
            {
                self.update_permission(NotificationPermission::Granted);
            }
            if permission != NotificationPermission::Denied
                && ui.button(format!("{} Block", icons::BELL_SLASH)).clicked()
            {
                self.update_permission(NotificationPermission::Denied);
            }
            if ui.button("Send test notification").clicked() {
                self.settings_message = Some(match self.api.send_test_notification() {
                    Ok(()) => ("Test notification sent".to_string(), false),
                    Err(e) => (e.to_string(), true),
                });
            }
        });

        if let Some((message, is_error)) = &self.settings_message {
            ui.colored_label(if *is_error { ERROR } else { SUCCESS }, message);
        }

        ui.add_space(16.0);
        ui.separator();
        ui.label(egui::RichText::new("Storage").strong().size(16.0));
        ui.label(
            egui::RichText::new(format!(
                "Data directory: {}",
                self.deps.config.get_data_dir().display()
            ))
            .color(MUTED),
        );
        if ui.button(format!("{} Save now", icons::FLOPPY_DISK)).clicked() {
            self.settings_message = Some(match self.api.save_all() {
                Ok(()) => ("Workspace saved".to_string(), false),
                Err(e) => (e.to_string(), true),
            });
        }
    }

    fn update_permission(&mut self, permission: NotificationPermission) {
        if let Err(e) = self.api.set_notification_permission(permission) {
            tracing::error!("Failed to store notification permission: {}", e);
            self.settings_message = Some((e.to_string(), true));
        }
    }

    /// Modal for the oldest undelivered alarm
    pub fn render_alarm_dialog(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.alerts.front().cloned() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new(format!("{} {}", icons::ALARM, alert.title()))
            .id(egui::Id::new("alarm_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                if alert.item.description.is_empty() {
                    ui.label("It's time!");
                } else {
                    ui.label(&alert.item.description);
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if let AlarmDelivery::Dialog {
                        ask_permission: true,
                    } = alert.delivery
                    {
                        if ui.button(format!("{} Enable notifications", icons::BELL)).clicked() {
                            self.update_permission(NotificationPermission::Granted);
                            dismissed = true;
                        }
                    }
                    if ui.button("Dismiss").clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed {
            self.alerts.pop_front();
        }
    }

    /// Yes/no prompts for logout and feed reset
    pub fn render_confirmations(&mut self, ctx: &egui::Context) {
        if self.confirm_logout {
            match confirm_dialog(ctx, "confirm_logout", "Log out", LOGOUT_CONFIRMATION) {
                Some(true) => {
                    self.confirm_logout = false;
                    if let Err(e) = self.api.logout() {
                        tracing::error!("Logout failed: {}", e);
                        self.settings_message = Some((e.to_string(), true));
                    }
                }
                Some(false) => self.confirm_logout = false,
                None => {}
            }
        }

        if self.confirm_reset_shorts {
            match confirm_dialog(
                ctx,
                "confirm_reset_shorts",
                "Reset feed",
                "Reset the feed to the default clips? Discovered clips will be removed.",
            ) {
                Some(true) => {
                    self.confirm_reset_shorts = false;
                    if let Err(e) = self.api.reset_shorts() {
                        tracing::error!("Failed to reset shorts feed: {}", e);
                    }
                }
                Some(false) => self.confirm_reset_shorts = false,
                None => {}
            }
        }
    }
}

/// Returns Some(answer) once a button is pressed
fn confirm_dialog(ctx: &egui::Context, id: &str, title: &str, message: &str) -> Option<bool> {
    let mut answer = None;
    egui::Window::new(title)
        .id(egui::Id::new(id))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Confirm").clicked() {
                    answer = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    answer = Some(false);
                }
            });
        });
    answer
}
