// API layer for the dashboard state
// Every user action in the UI has an equivalent method here, so the whole
// workspace can be driven (and tested) without a window.
//
// State lives on the calling thread. Persistence goes through the
// StorageService on the shared runtime with `block_on`, so this type must be
// used from outside the runtime (the UI thread, or a plain #[test]).

use crate::agenda::{
    AgendaItem, AlarmMonitor, Agenda, CatchUpPolicy, NewAgendaItem, TriggeredAlarms,
    DEFAULT_ALARM_INTERVAL,
};
use crate::error::{Result, SmartPlanError};
use crate::events::{Event, EventBus, EventKind};
use crate::services::{NotificationPermission, Notifier, StorageService};
use crate::session::{self, Session};
use crate::shorts::{default_clips, ClipData};
use crate::view::AppView;
use chrono::{DateTime, Local, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// Persisted storage keys
pub mod keys {
    pub const AUTH: &str = "smart_plan_auth";
    pub const USER_EMAIL: &str = "smart_plan_user_email";
    pub const ACTIVE_VIEW: &str = "smart_plan_active_view";
    pub const AGENDA: &str = "smart_plan_agenda_data";
    pub const TRIGGERED_ALARMS: &str = "smart_plan_triggered_alarms";
    pub const SHORTS_FEED: &str = "smart_plan_shorts_feed";
    pub const NOTIFICATION_PERMISSION: &str = "smart_plan_notification_permission";
}

const EVENT_SOURCE: &str = "dashboard";

/// How a fired alarm reached the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmDelivery {
    /// Desktop notification shown
    Notified,
    /// The UI must show a modal alert; `ask_permission` adds the
    /// "enable notifications" prompt
    Dialog { ask_permission: bool },
}

/// A fired alarm handed back to the UI
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmAlert {
    pub item: AgendaItem,
    pub delivery: AlarmDelivery,
}

impl AlarmAlert {
    pub fn title(&self) -> String {
        format!("Alarm: {}", self.item.title)
    }

    /// True when the UI still has to show this alert itself
    pub fn needs_dialog(&self) -> bool {
        matches!(self.delivery, AlarmDelivery::Dialog { .. })
    }
}

/// Dashboard state plus its persistence
pub struct DashboardApi {
    storage: Arc<dyn StorageService>,
    notifier: Arc<dyn Notifier>,
    event_bus: Arc<EventBus>,
    runtime: Arc<Runtime>,

    agenda: Agenda,
    monitor: AlarmMonitor,
    session: Session,
    active_view: AppView,
    permission: NotificationPermission,
    shorts: Vec<ClipData>,
    last_saved: Option<DateTime<Local>>,
}

impl DashboardApi {
    // Agenda

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    /// Add an item (alarm enabled) and persist; returns the new id
    pub fn add_item(&mut self, item: NewAgendaItem) -> Result<String> {
        if item.title.trim().is_empty() {
            return Err(SmartPlanError::InvalidInput("Title is required".to_string()));
        }
        let id = self.agenda.add(item);
        tracing::debug!("Added agenda item {}", id);
        self.persist_agenda()?;
        Ok(id)
    }

    pub fn toggle_alarm(&mut self, id: &str) -> Result<bool> {
        let found = self.agenda.toggle_alarm(id);
        if found {
            self.persist_agenda()?;
        }
        Ok(found)
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<bool> {
        let found = self.agenda.toggle_complete(id);
        if found {
            self.persist_agenda()?;
        }
        Ok(found)
    }

    pub fn remove_item(&mut self, id: &str) -> Result<Option<AgendaItem>> {
        let removed = self.agenda.remove(id);
        if removed.is_some() {
            self.persist_agenda()?;
        }
        Ok(removed)
    }

    // Alarms

    /// Run the alarm monitor; call every frame
    ///
    /// Nothing fires while signed out. Each fired item is delivered as a
    /// desktop notification when permission is granted; otherwise (or when
    /// the notifier fails) it comes back as a dialog for the UI to show.
    pub fn tick_alarms(&mut self, at: Instant, now: DateTime<Utc>) -> Vec<AlarmAlert> {
        if !self.session.is_authenticated() {
            self.monitor.disarm();
            return Vec::new();
        }

        let fired = self.monitor.poll(&mut self.agenda, at, now);
        if fired.is_empty() {
            return Vec::new();
        }

        let alerts: Vec<AlarmAlert> = fired.into_iter().map(|item| self.deliver(item)).collect();
        if let Err(e) = self.persist_agenda() {
            tracing::error!("Failed to persist triggered alarms: {}", e);
        }
        alerts
    }

    /// Time until the monitor wants to run again
    pub fn until_next_alarm_check(&self, at: Instant) -> Duration {
        self.monitor.until_next_tick(at)
    }

    fn deliver(&self, item: AgendaItem) -> AlarmAlert {
        self.event_bus.emit(Event::broadcast(
            EVENT_SOURCE,
            EventKind::AlarmFired {
                item_id: item.id.clone(),
                title: item.title.clone(),
                description: item.description.clone(),
            },
        ));

        let delivery = match self.permission {
            NotificationPermission::Granted => {
                match self
                    .notifier
                    .notify(&format!("Alarm: {}", item.title), &item.description)
                {
                    Ok(()) => AlarmDelivery::Notified,
                    Err(e) => {
                        tracing::warn!("Desktop notification failed, using dialog: {}", e);
                        AlarmDelivery::Dialog {
                            ask_permission: false,
                        }
                    }
                }
            }
            NotificationPermission::Default => AlarmDelivery::Dialog {
                ask_permission: true,
            },
            NotificationPermission::Denied => AlarmDelivery::Dialog {
                ask_permission: false,
            },
        };
        AlarmAlert { item, delivery }
    }

    pub fn notification_permission(&self) -> NotificationPermission {
        self.permission
    }

    pub fn set_notification_permission(&mut self, permission: NotificationPermission) -> Result<()> {
        self.permission = permission;
        tracing::info!("Notification permission: {}", permission.as_str());
        self.write(&[(keys::NOTIFICATION_PERMISSION, permission.as_str().to_string())])
    }

    /// Send a test notification through the desktop notifier
    pub fn send_test_notification(&self) -> Result<()> {
        self.notifier
            .notify("SmartPlan", "Notifications are working.")
    }

    // Session

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Sign in; on error the session and storage are both unchanged
    pub fn login(&mut self, email: &str) -> Result<()> {
        let email = session::validate_email(email)?;
        self.write(&[
            (keys::AUTH, "true".to_string()),
            (keys::USER_EMAIL, email.clone()),
        ])?;
        self.session.login(&email)?;
        self.event_bus.emit(Event::broadcast(
            EVENT_SOURCE,
            EventKind::SessionChanged { authenticated: true },
        ));
        Ok(())
    }

    /// Sign out; the agenda stays on disk
    ///
    /// The stored flag goes first, so a failed write leaves the user signed in.
    pub fn logout(&mut self) -> Result<()> {
        self.runtime.block_on(async {
            self.storage.remove_item(keys::AUTH).await?;
            self.storage.remove_item(keys::USER_EMAIL).await
        })?;
        self.session.logout();
        self.monitor.disarm();
        self.event_bus.emit(Event::broadcast(
            EVENT_SOURCE,
            EventKind::SessionChanged {
                authenticated: false,
            },
        ));
        Ok(())
    }

    // Views

    pub fn active_view(&self) -> AppView {
        self.active_view
    }

    pub fn set_view(&mut self, view: AppView) -> Result<()> {
        if view == self.active_view {
            return Ok(());
        }
        self.active_view = view;
        self.event_bus.emit(Event::broadcast(
            EVENT_SOURCE,
            EventKind::ViewChanged(view.as_str().to_string()),
        ));
        self.write(&[(keys::ACTIVE_VIEW, view.as_str().to_string())])
    }

    // Shorts

    pub fn shorts(&self) -> &[ClipData] {
        &self.shorts
    }

    /// Put a clip at the top of the feed
    pub fn prepend_clip(&mut self, clip: ClipData) -> Result<()> {
        self.shorts.insert(0, clip);
        self.persist_shorts()
    }

    pub fn reset_shorts(&mut self) -> Result<()> {
        self.shorts = default_clips();
        self.persist_shorts()
    }

    // Persistence

    /// When agenda state last reached disk
    pub fn last_saved(&self) -> Option<DateTime<Local>> {
        self.last_saved
    }

    /// Write every key; used on shutdown
    pub fn save_all(&mut self) -> Result<()> {
        let mut entries = self.agenda_entries()?;
        entries.push((keys::ACTIVE_VIEW, self.active_view.as_str().to_string()));
        entries.push((keys::SHORTS_FEED, serde_json::to_string(&self.shorts)?));
        entries.push((
            keys::NOTIFICATION_PERMISSION,
            self.permission.as_str().to_string(),
        ));
        if self.session.is_authenticated() {
            entries.push((keys::AUTH, "true".to_string()));
            entries.push((keys::USER_EMAIL, self.session.email().to_string()));
        }
        self.write(&entries)?;
        self.mark_saved();
        Ok(())
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_bus.subscribe()
    }

    fn agenda_entries(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (keys::AGENDA, serde_json::to_string(self.agenda.items())?),
            (
                keys::TRIGGERED_ALARMS,
                serde_json::to_string(self.agenda.triggered())?,
            ),
        ])
    }

    fn persist_agenda(&mut self) -> Result<()> {
        let entries = self.agenda_entries()?;
        self.write(&entries)?;
        self.mark_saved();
        Ok(())
    }

    fn persist_shorts(&self) -> Result<()> {
        self.write(&[(keys::SHORTS_FEED, serde_json::to_string(&self.shorts)?)])
    }

    fn mark_saved(&mut self) {
        let at = Local::now();
        self.last_saved = Some(at);
        self.event_bus
            .emit(Event::broadcast(EVENT_SOURCE, EventKind::WorkspaceSaved { at }));
    }

    fn write(&self, entries: &[(&'static str, String)]) -> Result<()> {
        let entries: Vec<(String, String)> = entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        self.runtime
            .block_on(self.storage.set_items(&entries))
            .map_err(|e| {
                tracing::error!("Failed to write storage: {}", e);
                e
            })
    }
}

/// Builder for creating DashboardApi instances from storage
pub struct DashboardApiBuilder {
    storage: Option<Arc<dyn StorageService>>,
    notifier: Option<Arc<dyn Notifier>>,
    event_bus: Option<Arc<EventBus>>,
    runtime: Option<Arc<Runtime>>,
    alarm_interval: Duration,
    catch_up_policy: CatchUpPolicy,
}

impl DashboardApiBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            notifier: None,
            event_bus: None,
            runtime: None,
            alarm_interval: DEFAULT_ALARM_INTERVAL,
            catch_up_policy: CatchUpPolicy::default(),
        }
    }

    /// Set the storage backend (required)
    pub fn storage(mut self, storage: Arc<dyn StorageService>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the notifier (required)
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set the event bus (optional - will create one if not provided)
    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Set the tokio runtime (optional - will create one if not provided)
    pub fn runtime(mut self, runtime: Arc<Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn alarm_interval(mut self, interval: Duration) -> Self {
        self.alarm_interval = interval;
        self
    }

    pub fn catch_up_policy(mut self, policy: CatchUpPolicy) -> Self {
        self.catch_up_policy = policy;
        self
    }

    /// Load the persisted workspace and build the API
    ///
    /// Missing or corrupt values fall back to their defaults.
    pub fn build(self) -> Result<DashboardApi> {
        let storage = self
            .storage
            .ok_or_else(|| SmartPlanError::ConfigError("Storage must be provided".to_string()))?;
        let notifier = self
            .notifier
            .ok_or_else(|| SmartPlanError::ConfigError("Notifier must be provided".to_string()))?;
        let event_bus = self.event_bus.unwrap_or_else(|| Arc::new(EventBus::new()));
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Arc::new(Runtime::new()?),
        };

        let stored = runtime.block_on(async {
            let mut values = Vec::new();
            for key in [
                keys::AUTH,
                keys::USER_EMAIL,
                keys::ACTIVE_VIEW,
                keys::AGENDA,
                keys::TRIGGERED_ALARMS,
                keys::SHORTS_FEED,
                keys::NOTIFICATION_PERMISSION,
            ] {
                values.push(storage.get_item(key).await?);
            }
            Ok::<_, SmartPlanError>(values)
        })?;
        let [auth, email, view, agenda, triggered, shorts, permission]: [Option<String>; 7] =
            stored.try_into().map_err(|_| {
                SmartPlanError::StorageError("Unexpected number of stored values".to_string())
            })?;

        let now = Utc::now();
        let items: Vec<AgendaItem> = parse_or_default(keys::AGENDA, agenda);
        let triggered: TriggeredAlarms = parse_or_default(keys::TRIGGERED_ALARMS, triggered);
        let mut agenda = Agenda::from_parts(items, triggered, now);

        let monitor = AlarmMonitor::new(self.alarm_interval, self.catch_up_policy);
        monitor.apply_catch_up(&mut agenda, now);

        let shorts = match shorts {
            Some(raw) => parse_or_default::<Option<Vec<ClipData>>>(keys::SHORTS_FEED, Some(raw))
                .unwrap_or_else(default_clips),
            None => default_clips(),
        };

        let session = Session::restore(auth.as_deref() == Some("true"), email.unwrap_or_default());
        let active_view = view.map(|v| AppView::parse(&v)).unwrap_or_default();
        let permission = permission
            .map(|p| NotificationPermission::parse(&p))
            .unwrap_or_default();

        tracing::info!(
            "Loaded workspace: {} agenda item(s), {} triggered, view '{}', signed in: {}",
            agenda.len(),
            agenda.triggered().len(),
            active_view.as_str(),
            session.is_authenticated()
        );

        Ok(DashboardApi {
            storage,
            notifier,
            event_bus,
            runtime,
            agenda,
            monitor,
            session,
            active_view,
            permission,
            shorts,
            last_saved: None,
        })
    }
}

impl Default for DashboardApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a stored JSON value, logging and defaulting when it is corrupt
fn parse_or_default<T: DeserializeOwned + Default>(key: &str, raw: Option<String>) -> T {
    let Some(raw) = raw else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Stored value for '{}' is corrupt ({}), using default", key, e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mocks::test_helpers::*;
    use chrono::Duration as ChronoDuration;

    fn build_with(storage: crate::services::traits::MockStorageService) -> DashboardApi {
        DashboardApiBuilder::new()
            .storage(Arc::new(storage))
            .notifier(Arc::new(create_mock_notifier()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_storage_gives_defaults() {
        let api = build_with(create_mock_storage());

        assert!(api.agenda().is_empty());
        assert!(!api.is_authenticated());
        assert_eq!(api.active_view(), AppView::Agenda);
        assert_eq!(api.notification_permission(), NotificationPermission::Default);
        assert_eq!(api.shorts(), default_clips().as_slice());
    }

    #[test]
    fn test_corrupt_values_fall_back() {
        let mut storage = crate::services::traits::MockStorageService::new();
        storage.expect_get_item().returning(|key| {
            Ok(match key {
                keys::AGENDA => Some("{broken".to_string()),
                keys::TRIGGERED_ALARMS => Some("42".to_string()),
                keys::SHORTS_FEED => Some("null".to_string()),
                keys::ACTIVE_VIEW => Some("marketplace".to_string()),
                keys::AUTH => Some("true".to_string()),
                keys::USER_EMAIL => Some("kim@gmail.com".to_string()),
                _ => None,
            })
        });

        let api = build_with(storage);
        assert!(api.agenda().is_empty());
        assert_eq!(api.shorts().len(), 4);
        assert_eq!(api.active_view(), AppView::Agenda);
        assert!(api.is_authenticated());
        assert_eq!(api.session().email(), "kim@gmail.com");
    }

    #[test]
    fn test_build_requires_storage() {
        let result = DashboardApiBuilder::new()
            .notifier(Arc::new(create_mock_notifier()))
            .build();
        assert!(matches!(result, Err(SmartPlanError::ConfigError(_))));
    }

    #[test]
    fn test_signed_out_never_fires() {
        let mut api = build_with(create_mock_storage());
        api.add_item(NewAgendaItem::new("Past", Utc::now() - ChronoDuration::hours(1)))
            .unwrap();

        let start = Instant::now();
        assert!(api.tick_alarms(start, Utc::now()).is_empty());
        assert!(api
            .tick_alarms(start + Duration::from_secs(60), Utc::now())
            .is_empty());
        assert!(api.agenda().triggered().is_empty());
    }

    #[test]
    fn test_granted_permission_uses_notifier() {
        let mut notifier = crate::services::traits::MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|title, body| title == "Alarm: Standup" && body == "Room 4")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut api = DashboardApiBuilder::new()
            .storage(Arc::new(create_mock_storage()))
            .notifier(Arc::new(notifier))
            .build()
            .unwrap();
        api.login("lee@gmail.com").unwrap();
        api.set_notification_permission(NotificationPermission::Granted)
            .unwrap();
        api.add_item(
            NewAgendaItem::new("Standup", Utc::now() - ChronoDuration::minutes(1))
                .with_description("Room 4"),
        )
        .unwrap();

        let start = Instant::now();
        api.tick_alarms(start, Utc::now());
        let alerts = api.tick_alarms(start + Duration::from_secs(10), Utc::now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].delivery, AlarmDelivery::Notified);
        assert_eq!(alerts[0].title(), "Alarm: Standup");
    }

    #[test]
    fn test_failing_notifier_falls_back_to_dialog() {
        let mut api = DashboardApiBuilder::new()
            .storage(Arc::new(create_mock_storage()))
            .notifier(Arc::new(create_failing_notifier()))
            .build()
            .unwrap();
        api.login("lee@gmail.com").unwrap();
        api.set_notification_permission(NotificationPermission::Granted)
            .unwrap();
        api.add_item(NewAgendaItem::new("Pills", Utc::now() - ChronoDuration::minutes(1)))
            .unwrap();

        let start = Instant::now();
        api.tick_alarms(start, Utc::now());
        let alerts = api.tick_alarms(start + Duration::from_secs(10), Utc::now());
        assert_eq!(
            alerts[0].delivery,
            AlarmDelivery::Dialog {
                ask_permission: false
            }
        );
    }

    fn failing_writes(signed_in: bool) -> crate::services::traits::MockStorageService {
        let mut storage = crate::services::traits::MockStorageService::new();
        storage.expect_get_item().returning(move |key| {
            Ok(match key {
                keys::AUTH if signed_in => Some("true".to_string()),
                keys::USER_EMAIL if signed_in => Some("kim@gmail.com".to_string()),
                _ => None,
            })
        });
        storage
            .expect_set_items()
            .returning(|_| Err(SmartPlanError::StorageError("disk full".to_string())));
        storage
            .expect_remove_item()
            .returning(|_| Err(SmartPlanError::StorageError("disk full".to_string())));
        storage
    }

    #[test]
    fn test_failed_login_write_stays_signed_out() {
        let mut api = build_with(failing_writes(false));

        let result = api.login("kim@gmail.com");
        assert!(matches!(result, Err(SmartPlanError::StorageError(_))));
        assert!(!api.is_authenticated());
        assert_eq!(api.session().email(), "");
    }

    #[test]
    fn test_failed_logout_write_stays_signed_in() {
        let mut api = build_with(failing_writes(true));
        assert!(api.is_authenticated());

        assert!(api.logout().is_err());
        assert!(api.is_authenticated());
        assert_eq!(api.session().email(), "kim@gmail.com");
    }

    #[test]
    fn test_only_dialog_deliveries_need_dialog() {
        let item = AgendaItem {
            id: "a1".to_string(),
            title: "Standup".to_string(),
            description: String::new(),
            time: Utc::now(),
            alarm_enabled: true,
            completed: false,
            category: Default::default(),
        };
        let alert = |delivery| AlarmAlert {
            item: item.clone(),
            delivery,
        };

        assert!(!alert(AlarmDelivery::Notified).needs_dialog());
        assert!(alert(AlarmDelivery::Dialog {
            ask_permission: true
        })
        .needs_dialog());
        assert!(alert(AlarmDelivery::Dialog {
            ask_permission: false
        })
        .needs_dialog());
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut api = build_with(create_mock_storage());
        assert!(api.add_item(NewAgendaItem::new("   ", Utc::now())).is_err());
        assert!(api.agenda().is_empty());
    }
}
