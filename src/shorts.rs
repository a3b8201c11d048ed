// Shorts feed: clip entries plus the AI-backed "discovery" search
//
// Discovery asks the search model about the query, then fabricates a feed
// entry with placeholder media. The model's answer is only logged.

use crate::error::Result;
use crate::genai::GenAiAdapter;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Placeholder video used for every discovered entry
pub const DISCOVERY_VIDEO_ID: &str = "M7lc1UVf-VE";

/// Clip identifier; stored feeds mix strings and integers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClipId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipId::Number(n) => write!(f, "{}", n),
            ClipId::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    /// `src` is a direct video URL
    Video,
    /// `src` is a YouTube video id
    Youtube,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipData {
    pub id: ClipId,
    #[serde(rename = "type")]
    pub kind: ClipKind,
    pub src: String,
    pub avatar: String,
    pub user: String,
    pub description: String,
    pub likes: u64,
    pub shares: u64,
}

impl ClipData {
    /// Link to play the clip outside the app
    pub fn watch_url(&self) -> String {
        match self.kind {
            ClipKind::Youtube => format!("https://www.youtube.com/shorts/{}", self.src),
            ClipKind::Video => self.src.clone(),
        }
    }
}

/// The feed shown on first launch and after a reset
pub fn default_clips() -> Vec<ClipData> {
    vec![
        ClipData {
            id: ClipId::Text("yt1".to_string()),
            kind: ClipKind::Youtube,
            src: "M7lc1UVf-VE".to_string(),
            avatar: "https://i.pravatar.cc/150?img=12".to_string(),
            user: "@google".to_string(),
            description: "Welcome to the future of AI with Gemini. #AI #Google #Shorts".to_string(),
            likes: 85_000,
            shares: 12_000,
        },
        ClipData {
            id: ClipId::Number(1),
            kind: ClipKind::Video,
            src: "https://videos.pexels.com/video-files/4434246/4434246-hd_960_1920_25fps.mp4"
                .to_string(),
            avatar: "https://i.pravatar.cc/150?img=1".to_string(),
            user: "@naturelover".to_string(),
            description: "Beautiful waterfall in the middle of the forest. 🌳 #nature #waterfall #travel"
                .to_string(),
            likes: 12_345,
            shares: 678,
        },
        ClipData {
            id: ClipId::Text("yt2".to_string()),
            kind: ClipKind::Youtube,
            src: "dQw4w9WgXcQ".to_string(),
            avatar: "https://i.pravatar.cc/150?img=8".to_string(),
            user: "@retro_vibes".to_string(),
            description: "Never gonna give you up! Classical hits. #music #legends".to_string(),
            likes: 1_000_000,
            shares: 500_000,
        },
        ClipData {
            id: ClipId::Number(2),
            kind: ClipKind::Video,
            src: "https://videos.pexels.com/video-files/8310332/8310332-hd_960_1920_25fps.mp4"
                .to_string(),
            avatar: "https://i.pravatar.cc/150?img=2".to_string(),
            user: "@cityscapes".to_string(),
            description: "Night time in the city that never sleeps. ✨ #city #nightlife #vibes"
                .to_string(),
            likes: 23_456,
            shares: 1_234,
        },
    ]
}

/// Compact counter: 1.2K, 3.4M
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

pub fn discovery_prompt(query: &str) -> String {
    format!(
        "Find me 3 popular YouTube Shorts or viral videos about: {}. \
         Return a list of details including video title, a hypothetical username, \
         and a likely YouTube Video ID if you can find one, otherwise suggest a placeholder.",
        query
    )
}

/// Feed entry fabricated for a successful discovery search
pub fn discovered_clip<R: Rng>(query: &str, now_millis: i64, rng: &mut R) -> ClipData {
    let handle: String = query
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    ClipData {
        id: ClipId::Text(format!("yt-discover-{}", now_millis)),
        kind: ClipKind::Youtube,
        src: DISCOVERY_VIDEO_ID.to_string(),
        avatar: format!("https://i.pravatar.cc/150?u={}", query),
        user: format!("@{}_creator", handle),
        description: format!(
            "Discovery: {}. Retrieved via Gemini Intelligent Search. 🎬 #Viral #NewDiscovery",
            query
        ),
        likes: rng.gen_range(0..95_000),
        shares: rng.gen_range(0..15_000),
    }
}

/// Background discovery search driven by the shorts panel
pub struct DiscoverySearch {
    adapter: Arc<dyn GenAiAdapter>,
    runtime: Handle,
    pub query: String,
    is_searching: bool,
    error: Option<String>,
    tx: mpsc::UnboundedSender<(String, Result<String>)>,
    rx: mpsc::UnboundedReceiver<(String, Result<String>)>,
}

impl DiscoverySearch {
    pub fn new(adapter: Arc<dyn GenAiAdapter>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            adapter,
            runtime,
            query: String::new(),
            is_searching: false,
            error: None,
            tx,
            rx,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a search for the current query; blank queries are ignored
    pub fn submit(&mut self) -> bool {
        if self.is_searching || self.query.trim().is_empty() {
            return false;
        }
        self.is_searching = true;
        self.error = None;

        let adapter = Arc::clone(&self.adapter);
        let query = self.query.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = adapter.search_text(&discovery_prompt(&query)).await;
            let _ = tx.send((query, result));
        });
        true
    }

    /// Returns the new feed entry once a search succeeds
    pub fn update(&mut self) -> Option<ClipData> {
        let (query, result) = self.rx.try_recv().ok()?;
        self.is_searching = false;
        match result {
            Ok(answer) => {
                tracing::debug!("Discovery answer for '{}': {}", query, answer);
                self.query.clear();
                let now = chrono::Utc::now().timestamp_millis();
                Some(discovered_clip(&query, now, &mut rand::thread_rng()))
            }
            Err(e) => {
                tracing::error!("Discovery search failed: {}", e);
                self.error = Some(e.to_string());
                None
            }
        }
    }
}
