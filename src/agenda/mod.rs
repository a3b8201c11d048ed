// Agenda: the user's scheduled items plus the set of alarms already fired
//
// Both collections live together so every mutation can keep them consistent:
// the triggered set only ever holds ids of items that exist, are alarm-enabled,
// are not completed and are past their scheduled time.

mod alarms;
mod item;

pub use alarms::{AlarmMonitor, CatchUpPolicy, TriggeredAlarms, DEFAULT_ALARM_INTERVAL};
pub use item::{AgendaItem, Category, NewAgendaItem};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// In-memory agenda owned by the UI thread
#[derive(Debug, Clone, Default)]
pub struct Agenda {
    items: Vec<AgendaItem>,
    triggered: TriggeredAlarms,
}

impl Agenda {
    /// Rebuild an agenda from persisted parts, dropping stale triggered ids
    pub fn from_parts(items: Vec<AgendaItem>, triggered: TriggeredAlarms, now: DateTime<Utc>) -> Self {
        let mut agenda = Self { items, triggered };
        let pruned = agenda.reconcile(now);
        if pruned > 0 {
            tracing::debug!("Pruned {} stale triggered alarm id(s)", pruned);
        }
        agenda
    }

    /// Items in insertion order
    pub fn items(&self) -> &[AgendaItem] {
        &self.items
    }

    pub fn triggered(&self) -> &TriggeredAlarms {
        &self.triggered
    }

    pub fn get(&self, id: &str) -> Option<&AgendaItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items ordered by scheduled time (stable for equal times)
    pub fn sorted(&self) -> Vec<&AgendaItem> {
        let mut sorted: Vec<&AgendaItem> = self.items.iter().collect();
        sorted.sort_by_key(|item| item.time);
        sorted
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| !item.completed).count()
    }

    /// Insert a new item with a fresh id; alarms start enabled
    pub fn add(&mut self, new_item: NewAgendaItem) -> String {
        let id = Uuid::new_v4().to_string();
        self.items.push(AgendaItem {
            id: id.clone(),
            title: new_item.title,
            description: new_item.description,
            time: new_item.time,
            alarm_enabled: true,
            completed: false,
            category: new_item.category,
        });
        id
    }

    /// Flip the alarm flag and re-arm the item; false if the id is unknown
    pub fn toggle_alarm(&mut self, id: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.alarm_enabled = !item.alarm_enabled;
        self.triggered.clear(id);
        true
    }

    /// Flip the completed flag; false if the id is unknown
    ///
    /// Completing an item drops it from the triggered set. Re-opening an
    /// overdue item therefore lets its alarm fire again.
    pub fn toggle_complete(&mut self, id: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.completed = !item.completed;
        if item.completed {
            self.triggered.clear(id);
        }
        true
    }

    /// Remove an item and its triggered entry; returns the removed item
    pub fn remove(&mut self, id: &str) -> Option<AgendaItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        self.triggered.clear(id);
        Some(self.items.remove(index))
    }

    /// Mark every due, not-yet-triggered item as triggered and return them
    pub fn collect_due(&mut self, now: DateTime<Utc>) -> Vec<AgendaItem> {
        let mut fired = Vec::new();
        for item in &self.items {
            if item.is_due(now) && self.triggered.insert(item.id.clone()) {
                fired.push(item.clone());
            }
        }
        fired
    }

    /// Drop triggered ids that no longer refer to a due item
    pub fn reconcile(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.triggered.len();
        let items = &self.items;
        self.triggered.retain(|id| {
            items
                .iter()
                .any(|item| &item.id == id && item.is_due(now))
        });
        before - self.triggered.len()
    }
}
