mod ui;

use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use eframe::egui;
use smartplan::labs::{ImageLab, VideoLab};
use smartplan::password::{self, PasswordConfig};
use smartplan::shorts::DiscoverySearch;
use smartplan::{
    version, AlarmAlert, AppBuilder, AppDependencies, AppView, ConfigService, DashboardApi,
    DashboardApiBuilder, Event, EventKind,
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use ui::{AgendaForm, LabTextures};

/// Repaint cadence while an AI job is running
const BUSY_REPAINT: Duration = Duration::from_millis(250);

fn main() -> std::result::Result<(), eframe::Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();
    tracing::info!("Starting {}", version::full_version_info());

    let (deps, api) = match bootstrap() {
        Ok(parts) => parts,
        Err(e) => {
            // Don't panic across the eframe boundary; report and exit
            tracing::error!("Failed to start SmartPlan: {:#}", e);
            eprintln!("\nERROR: failed to start SmartPlan\n\n{:#}\n", e);
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 560.0])
            .with_title("SmartPlan"),
        ..Default::default()
    };

    eframe::run_native(
        "smartplan",
        options,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);

            Ok(Box::new(SmartPlanApp::new(deps, api)))
        }),
    )
}

/// Wire services and load the persisted workspace
fn bootstrap() -> anyhow::Result<(AppDependencies, DashboardApi)> {
    let deps = AppBuilder::new()
        .with_production_deps()
        .context("Failed to build dependencies")?
        .build()
        .context("Failed to finalize dependencies")?;

    let runtime = deps
        .runtime
        .clone()
        .context("Production dependencies have no runtime")?;

    let api = DashboardApiBuilder::new()
        .storage(deps.storage.clone())
        .notifier(deps.notifier.clone())
        .event_bus(deps.event_bus.clone())
        .runtime(runtime)
        .alarm_interval(deps.config.get_alarm_interval())
        .catch_up_policy(deps.config.get_catch_up_policy())
        .build()
        .context("Failed to load workspace")?;

    Ok((deps, api))
}

struct SmartPlanApp {
    // Injected dependencies (service layer)
    deps: AppDependencies,

    // Dashboard state and persistence
    api: DashboardApi,
    event_rx: broadcast::Receiver<Event>,

    // Login
    login_email: String,
    login_error: Option<String>,

    // Agenda
    agenda_form: AgendaForm,
    agenda_error: Option<String>,
    alerts: VecDeque<AlarmAlert>,
    last_saved: Option<DateTime<Local>>,

    // AI tools; None when no adapter or runtime is wired
    image_lab: Option<ImageLab>,
    video_lab: Option<VideoLab>,
    discovery: Option<DiscoverySearch>,
    lab_textures: LabTextures,
    credential_input: String,

    // Password generator
    password_config: PasswordConfig,
    password: String,
    copied_at: Option<Instant>,

    // Settings / confirmations
    settings_message: Option<(String, bool)>, // (message, is_error)
    confirm_logout: bool,
    confirm_reset_shorts: bool,
    sidebar_open: bool,
}

impl SmartPlanApp {
    fn new(deps: AppDependencies, api: DashboardApi) -> Self {
        let event_rx = api.subscribe_events();

        let (image_lab, video_lab, discovery) = match (&deps.genai, &deps.runtime) {
            (Some(genai), Some(runtime)) => {
                let handle = runtime.handle().clone();
                (
                    Some(ImageLab::new(
                        genai.clone(),
                        deps.filesystem.clone(),
                        handle.clone(),
                        deps.downloads_dir(),
                    )),
                    Some(VideoLab::new(
                        genai.clone(),
                        deps.filesystem.clone(),
                        handle.clone(),
                        deps.videos_dir(),
                    )),
                    Some(DiscoverySearch::new(genai.clone(), handle)),
                )
            }
            _ => {
                tracing::warn!("No AI adapter configured - labs and discovery disabled");
                (None, None, None)
            }
        };

        let password_config = PasswordConfig::default();
        let password = password::generate(&password_config);

        Self {
            deps,
            api,
            event_rx,
            login_email: String::new(),
            login_error: None,
            agenda_form: AgendaForm::default(),
            agenda_error: None,
            alerts: VecDeque::new(),
            last_saved: None,
            image_lab,
            video_lab,
            discovery,
            lab_textures: LabTextures::default(),
            credential_input: String::new(),
            password_config,
            password,
            copied_at: None,
            settings_message: None,
            confirm_logout: false,
            confirm_reset_shorts: false,
            sidebar_open: true,
        }
    }

    /// Drain the event bus; returns true if anything arrived
    fn process_events(&mut self) -> bool {
        let mut processed = false;
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => {
                    processed = true;
                    match event.kind {
                        EventKind::AlarmFired { item_id, title, .. } => {
                            tracing::info!("Alarm fired for {} ({})", title, item_id);
                        }
                        EventKind::ViewChanged(view) => tracing::debug!("View -> {}", view),
                        EventKind::SessionChanged { authenticated } => {
                            tracing::debug!("Session changed: authenticated={}", authenticated);
                            if !authenticated {
                                self.alerts.clear();
                            }
                        }
                        EventKind::WorkspaceSaved { at } => self.last_saved = Some(at),
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("UI lagged behind the event bus by {} events", skipped);
                }
                Err(_) => break,
            }
        }
        processed
    }

    /// Poll background jobs; returns true while any of them is still running
    fn poll_background(&mut self) -> bool {
        let mut busy = false;

        if let Some(lab) = &mut self.image_lab {
            if lab.update() {
                self.lab_textures.clear();
            }
            busy |= lab.is_loading();
        }

        if let Some(lab) = &mut self.video_lab {
            lab.update();
            busy |= lab.is_loading();
        }

        if let Some(discovery) = &mut self.discovery {
            if let Some(clip) = discovery.update() {
                if let Err(e) = self.api.prepend_clip(clip) {
                    tracing::error!("Failed to store discovered clip: {}", e);
                }
            }
            busy |= discovery.is_searching();
        }

        busy
    }
}

impl eframe::App for SmartPlanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.process_events() {
            ctx.request_repaint();
        }

        if !self.api.is_authenticated() {
            self.render_login_screen(ctx);
            return;
        }

        // Alarm monitor runs on the UI thread whenever its interval has elapsed.
        // Alerts already shown as desktop notifications skip the dialog.
        let now = Instant::now();
        let fired = self.api.tick_alarms(now, Utc::now());
        self.alerts
            .extend(fired.into_iter().filter(AlarmAlert::needs_dialog));

        let busy = self.poll_background();
        let copy_pending = self
            .copied_at
            .is_some_and(|at| at.elapsed() < ui::COPIED_INDICATOR);

        let next_wake = self.api.until_next_alarm_check(now);
        if busy || copy_pending {
            ctx.request_repaint_after(next_wake.min(BUSY_REPAINT));
        } else {
            ctx.request_repaint_after(next_wake);
        }

        ui::apply_style(ctx);

        if self.sidebar_open {
            egui::SidePanel::left("sidebar")
                .resizable(false)
                .default_width(210.0)
                .show(ctx, |ui| self.render_sidebar(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if !self.sidebar_open && ui.button(egui_phosphor::regular::LIST).clicked() {
                    self.sidebar_open = true;
                }
                ui.heading(self.api.active_view().label());
                ui.add_space(10.0);
                ui.label(
                    egui::RichText::new(version::version_string())
                        .size(12.0)
                        .color(egui::Color32::from_rgb(120, 120, 120)),
                );
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| match self.api.active_view() {
                    AppView::Agenda => self.render_agenda_view(ui),
                    AppView::Studio => self.render_image_lab(ui, ctx),
                    AppView::Video => self.render_video_lab(ui),
                    AppView::Password => self.render_password_view(ui, ctx),
                    AppView::Clips => self.render_shorts_view(ui),
                    AppView::Connect => self.render_connect_view(ui),
                    AppView::Settings => self.render_settings_view(ui),
                });
        });

        self.render_alarm_dialog(ctx);
        self.render_confirmations(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        match self.api.save_all() {
            Ok(()) => tracing::info!("Workspace saved on exit"),
            Err(e) => tracing::error!("Failed to save workspace on exit: {}", e),
        }
    }
}
