use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agenda category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Work,
    Personal,
    Health,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Health => "health",
            Category::Other => "other",
        }
    }
}

/// A user-scheduled task with an optional alarm
///
/// Field names follow the persisted JSON layout (`alarmEnabled`), so stored
/// agendas survive across versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub time: DateTime<Utc>,
    pub alarm_enabled: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: Category,
}

impl AgendaItem {
    /// Alarm is armed and the scheduled time has been reached
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.alarm_enabled && !self.completed && self.time <= now
    }
}

/// User input for a new agenda item; the id is assigned on insertion
#[derive(Debug, Clone)]
pub struct NewAgendaItem {
    pub title: String,
    pub description: String,
    pub time: DateTime<Utc>,
    pub category: Category,
}

impl NewAgendaItem {
    pub fn new(title: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            time,
            category: Category::Work,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
}
