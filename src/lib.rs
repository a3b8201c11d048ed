// Library interface for SmartPlan
// This exposes the dashboard core as a library that can be:
// - Driven by the egui front end in main.rs
// - Called from scripts and tests without a window

pub mod agenda;
pub mod api;
pub mod app_builder;
pub mod error;
pub mod events;
pub mod genai; // Gemini image, video and search calls
pub mod labs;
pub mod password;
pub mod services; // Service layer for dependency injection
pub mod session;
pub mod shorts;
pub mod socials;
pub mod version;
pub mod view;

// Re-export commonly used types for convenience
pub use agenda::{Agenda, AgendaItem, AlarmMonitor, CatchUpPolicy, Category, NewAgendaItem};
pub use api::{AlarmAlert, AlarmDelivery, DashboardApi, DashboardApiBuilder};
pub use app_builder::{AppBuilder, AppDependencies};
pub use error::{Result, SmartPlanError};
pub use events::{Event, EventBus, EventKind};
pub use genai::{GenAiAdapter, ImageData, VideoOperation, VideoRequest};
pub use session::Session;
pub use view::AppView;

pub use services::{
    ConfigService, DesktopNotifier, FileConfigService, FileStorageService, FileSystem,
    NotificationPermission, Notifier, RealFileSystem, StorageService,
};
