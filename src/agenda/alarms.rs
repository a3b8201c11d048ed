// Alarm monitoring for agenda items
//
// The monitor is a fixed-interval poll driven from the UI thread: every frame
// asks `poll()` whether the interval elapsed, and only then is the agenda
// scanned. There is a single owner of the agenda, so marking an item as
// triggered and reporting it happen in one step with no de-duplication race.

use super::{Agenda, AgendaItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Default poll period between alarm checks
pub const DEFAULT_ALARM_INTERVAL: Duration = Duration::from_secs(10);

/// Ids of agenda items whose alarm has already fired
///
/// Serialized as a JSON array of ids. A BTreeSet keeps the stored order stable
/// so unchanged state writes identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggeredAlarms(BTreeSet<String>);

impl TriggeredAlarms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Returns true if the id was not already present
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    /// Re-arm an item so its alarm can fire again
    pub fn clear(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    pub fn retain(&mut self, keep: impl FnMut(&String) -> bool) {
        self.0.retain(keep)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl FromIterator<String> for TriggeredAlarms {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What to do with alarms whose time passed while the app was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatchUpPolicy {
    /// Overdue alarms fire on the first tick after startup
    #[default]
    Fire,
    /// Overdue alarms are marked triggered at startup without alerting
    Suppress,
}

impl CatchUpPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fire" => Some(Self::Fire),
            "suppress" => Some(Self::Suppress),
            _ => None,
        }
    }
}

/// Fixed-interval alarm poller
pub struct AlarmMonitor {
    interval: Duration,
    policy: CatchUpPolicy,
    last_check: Option<Instant>,
}

impl AlarmMonitor {
    pub fn new(interval: Duration, policy: CatchUpPolicy) -> Self {
        Self {
            interval,
            policy,
            last_check: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn policy(&self) -> CatchUpPolicy {
        self.policy
    }

    /// Apply the catch-up policy once, right after the workspace is loaded
    ///
    /// Only items already due at `now` are silenced; later ones fire as usual.
    /// Returns the number of alarms that were silenced.
    pub fn apply_catch_up(&self, agenda: &mut Agenda, now: DateTime<Utc>) -> usize {
        match self.policy {
            CatchUpPolicy::Fire => 0,
            CatchUpPolicy::Suppress => {
                let silenced = agenda.collect_due(now).len();
                if silenced > 0 {
                    tracing::info!("Suppressed {} alarm(s) missed while closed", silenced);
                }
                silenced
            }
        }
    }

    /// True when the timer is armed and a full interval has passed at `at`
    pub fn tick_due(&self, at: Instant) -> bool {
        match self.last_check {
            None => false,
            Some(last) => at.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Time left until the next tick, for scheduling a repaint
    pub fn until_next_tick(&self, at: Instant) -> Duration {
        match self.last_check {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(at.saturating_duration_since(last)),
        }
    }

    /// Run a check if the interval elapsed; returns the items that fired
    ///
    /// The first call only arms the timer, matching an interval timer whose
    /// first callback comes one period after it is started.
    pub fn poll(&mut self, agenda: &mut Agenda, at: Instant, now: DateTime<Utc>) -> Vec<AgendaItem> {
        if self.last_check.is_none() {
            self.last_check = Some(at);
            return Vec::new();
        }
        if !self.tick_due(at) {
            return Vec::new();
        }
        self.last_check = Some(at);
        self.check(agenda, now)
    }

    /// Unconditional check, independent of the interval
    pub fn check(&self, agenda: &mut Agenda, now: DateTime<Utc>) -> Vec<AgendaItem> {
        let fired = agenda.collect_due(now);
        for item in &fired {
            tracing::info!("Alarm fired: {} ({})", item.title, item.id);
        }
        fired
    }

    /// Stop ticking until the next `poll` re-arms the timer (e.g. on logout)
    pub fn disarm(&mut self) {
        self.last_check = None;
    }
}

impl Default for AlarmMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_ALARM_INTERVAL, CatchUpPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::NewAgendaItem;
    use chrono::Duration as ChronoDuration;

    fn agenda_with_past_item() -> (Agenda, String) {
        let mut agenda = Agenda::default();
        let id = agenda.add(NewAgendaItem::new(
            "Call dentist",
            Utc::now() - ChronoDuration::minutes(5),
        ));
        (agenda, id)
    }

    #[test]
    fn test_first_poll_only_arms_timer() {
        let (mut agenda, _) = agenda_with_past_item();
        let mut monitor = AlarmMonitor::default();

        let fired = monitor.poll(&mut agenda, Instant::now(), Utc::now());
        assert!(fired.is_empty());
        assert!(agenda.triggered().is_empty());
    }

    #[test]
    fn test_past_item_fires_once_within_one_tick() {
        let (mut agenda, id) = agenda_with_past_item();
        let mut monitor = AlarmMonitor::new(Duration::from_secs(10), CatchUpPolicy::Fire);

        let start = Instant::now();
        monitor.poll(&mut agenda, start, Utc::now());

        let fired = monitor.poll(&mut agenda, start + Duration::from_secs(10), Utc::now());
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, id);
        assert!(agenda.triggered().contains(&id));

        let again = monitor.poll(&mut agenda, start + Duration::from_secs(20), Utc::now());
        assert!(again.is_empty());
    }

    #[test]
    fn test_poll_before_interval_does_nothing() {
        let (mut agenda, _) = agenda_with_past_item();
        let mut monitor = AlarmMonitor::new(Duration::from_secs(10), CatchUpPolicy::Fire);

        let start = Instant::now();
        monitor.poll(&mut agenda, start, Utc::now());
        let fired = monitor.poll(&mut agenda, start + Duration::from_secs(3), Utc::now());
        assert!(fired.is_empty());
        assert_eq!(
            monitor.until_next_tick(start + Duration::from_secs(3)),
            Duration::from_secs(7)
        );
    }

    #[test]
    fn test_suppress_policy_silences_overdue_alarms() {
        let (mut agenda, id) = agenda_with_past_item();
        let monitor = AlarmMonitor::new(Duration::from_secs(10), CatchUpPolicy::Suppress);

        assert_eq!(monitor.apply_catch_up(&mut agenda, Utc::now()), 1);
        assert!(agenda.triggered().contains(&id));
        assert!(monitor.check(&mut agenda, Utc::now()).is_empty());
    }

    #[test]
    fn test_suppress_policy_spares_later_items() {
        let (mut agenda, past) = agenda_with_past_item();
        let start = Utc::now();
        let later = agenda.add(NewAgendaItem::new("Standup", start + ChronoDuration::minutes(1)));
        let monitor = AlarmMonitor::new(Duration::from_secs(10), CatchUpPolicy::Suppress);

        assert_eq!(monitor.apply_catch_up(&mut agenda, start), 1);
        assert!(agenda.triggered().contains(&past));
        assert!(!agenda.triggered().contains(&later));

        let fired = monitor.check(&mut agenda, start + ChronoDuration::minutes(2));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, later);
    }

    #[test]
    fn test_fire_policy_leaves_overdue_alarms_armed() {
        let (mut agenda, _) = agenda_with_past_item();
        let monitor = AlarmMonitor::default();

        assert_eq!(monitor.apply_catch_up(&mut agenda, Utc::now()), 0);
        assert_eq!(monitor.check(&mut agenda, Utc::now()).len(), 1);
    }

    #[test]
    fn test_catch_up_policy_parse() {
        assert_eq!(CatchUpPolicy::parse("Suppress"), Some(CatchUpPolicy::Suppress));
        assert_eq!(CatchUpPolicy::parse(" fire "), Some(CatchUpPolicy::Fire));
        assert_eq!(CatchUpPolicy::parse("later"), None);
    }

    #[test]
    fn test_triggered_alarms_serialize_as_array() {
        let set: TriggeredAlarms = vec!["b".to_string(), "a".to_string()].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b"]"#);
    }
}
