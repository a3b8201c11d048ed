// Video lab: long-running text-to-video jobs
//
// A job owns two tasks on the runtime: the poll loop (start, poll until
// done, download, write the file) and a rotation task that cycles the
// progress message through a watch channel. Both are aborted on reset and
// on drop.

use crate::error::{Result, SmartPlanError};
use crate::genai::{AspectRatio, GenAiAdapter, Resolution, VideoRequest};
use crate::services::FileSystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub const PROGRESS_MESSAGES: [&str; 7] = [
    "Dreaming up your sequence...",
    "Painting motion into reality...",
    "Assembling the cinematic frames...",
    "Fine-tuning the animation path...",
    "Applying digital magic...",
    "Almost there! Just a few more seconds...",
    "Polishing the final output...",
];

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const MESSAGE_ROTATION_INTERVAL: Duration = Duration::from_secs(8);
pub const BILLING_URL: &str = "https://ai.google.dev/gemini-api/docs/billing";

const MISSING_LINK: &str = "Video generation failed to return a link.";

struct Finished {
    generation: u64,
    result: Result<PathBuf>,
}

pub struct VideoLab {
    adapter: Arc<dyn GenAiAdapter>,
    fs: Arc<dyn FileSystem>,
    runtime: Handle,
    videos_dir: PathBuf,
    poll_interval: Duration,
    rotation_interval: Duration,

    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,

    has_credential: bool,
    is_loading: bool,
    error: Option<String>,
    video_path: Option<PathBuf>,

    generation: u64,
    progress: watch::Receiver<usize>,
    job_task: Option<JoinHandle<()>>,
    rotation_task: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Finished>,
    rx: mpsc::UnboundedReceiver<Finished>,
}

impl VideoLab {
    /// Finished videos are written under `videos_dir`
    pub fn new(
        adapter: Arc<dyn GenAiAdapter>,
        fs: Arc<dyn FileSystem>,
        runtime: Handle,
        videos_dir: PathBuf,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (_, progress) = watch::channel(0);
        let has_credential = adapter.has_api_key();
        Self {
            adapter,
            fs,
            runtime,
            videos_dir,
            poll_interval: POLL_INTERVAL,
            rotation_interval: MESSAGE_ROTATION_INTERVAL,
            prompt: String::new(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
            has_credential,
            is_loading: false,
            error: None,
            video_path: None,
            generation: 0,
            progress,
            job_task: None,
            rotation_task: None,
            tx,
            rx,
        }
    }

    pub fn with_intervals(mut self, poll: Duration, rotation: Duration) -> Self {
        self.poll_interval = poll;
        self.rotation_interval = rotation;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.has_credential
    }

    /// Install a pasted key; blank input is ignored
    pub fn select_credential(&mut self, api_key: &str) -> bool {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return false;
        }
        self.adapter.set_api_key(api_key.to_string());
        self.has_credential = true;
        self.error = None;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn video_path(&self) -> Option<&Path> {
        self.video_path.as_deref()
    }

    pub fn progress_message(&self) -> &'static str {
        PROGRESS_MESSAGES[*self.progress.borrow() % PROGRESS_MESSAGES.len()]
    }

    pub fn can_submit(&self) -> bool {
        self.has_credential && !self.is_loading && !self.prompt.trim().is_empty()
    }

    /// Start a job; returns false when there is nothing to do
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.abort_tasks();

        self.is_loading = true;
        self.error = None;
        self.video_path = None;

        let (progress_tx, progress_rx) = watch::channel(0);
        self.progress = progress_rx;
        let rotation = self.rotation_interval;
        self.rotation_task = Some(self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(rotation);
            ticker.tick().await;
            let mut index = 0;
            loop {
                ticker.tick().await;
                index = (index + 1) % PROGRESS_MESSAGES.len();
                if progress_tx.send(index).is_err() {
                    break;
                }
            }
        }));

        let job = VideoJob {
            adapter: Arc::clone(&self.adapter),
            fs: Arc::clone(&self.fs),
            videos_dir: self.videos_dir.clone(),
            poll_interval: self.poll_interval,
            request: VideoRequest {
                prompt: self.prompt.trim().to_string(),
                aspect_ratio: self.aspect_ratio,
                resolution: self.resolution,
            },
        };
        let generation = self.generation;
        let tx = self.tx.clone();
        self.job_task = Some(self.runtime.spawn(async move {
            let result = job.run().await;
            let _ = tx.send(Finished { generation, result });
        }));
        true
    }

    /// Open the finished video with the system player
    pub fn open_video(&mut self) {
        let Some(path) = &self.video_path else {
            return;
        };
        if let Err(e) = open::that(path) {
            tracing::warn!("Failed to open {:?}: {}", path, e);
            self.error = Some(format!("Could not open the video: {}", e));
        }
    }

    /// Cancel any running job and clear the panel
    pub fn reset(&mut self) {
        self.abort_tasks();
        self.generation += 1;
        self.prompt.clear();
        self.error = None;
        self.video_path = None;
        self.is_loading = false;
        let (_, progress) = watch::channel(0);
        self.progress = progress;
    }

    /// Process a finished job; call once per frame
    pub fn update(&mut self) -> bool {
        let mut changed = false;
        while let Ok(Finished { generation, result }) = self.rx.try_recv() {
            if generation != self.generation {
                continue;
            }
            self.is_loading = false;
            self.job_task = None;
            if let Some(task) = self.rotation_task.take() {
                task.abort();
            }
            match result {
                Ok(path) => {
                    tracing::info!("Video saved to {:?}", path);
                    self.video_path = Some(path);
                }
                Err(e) => {
                    if e.is_credential_failure() {
                        tracing::warn!("Credential rejected, asking for a new key");
                        self.has_credential = false;
                    }
                    self.error = Some(e.to_string());
                }
            }
            changed = true;
        }
        changed
    }

    fn abort_tasks(&mut self) {
        if let Some(task) = self.job_task.take() {
            task.abort();
        }
        if let Some(task) = self.rotation_task.take() {
            task.abort();
        }
    }
}

impl Drop for VideoLab {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

/// Everything the poll loop needs, moved into its task
struct VideoJob {
    adapter: Arc<dyn GenAiAdapter>,
    fs: Arc<dyn FileSystem>,
    videos_dir: PathBuf,
    poll_interval: Duration,
    request: VideoRequest,
}

impl VideoJob {
    async fn run(self) -> Result<PathBuf> {
        let mut operation = self.adapter.start_video(&self.request).await?;
        while !operation.done {
            tokio::time::sleep(self.poll_interval).await;
            operation = self.adapter.poll_video(&operation).await?;
        }

        if let Some(message) = operation.error {
            return Err(SmartPlanError::AiError(message));
        }
        let uri = operation
            .video_uri
            .ok_or_else(|| SmartPlanError::AiError(MISSING_LINK.to_string()))?;

        let bytes = self.adapter.download_video(&uri).await?;

        if !self.fs.exists(&self.videos_dir).await {
            self.fs.create_dir_all(&self.videos_dir).await?;
        }
        let path = self.videos_dir.join(format!(
            "veo-video-{}.mp4",
            chrono::Utc::now().timestamp_millis()
        ));
        self.fs.write_bytes(&path, &bytes).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::{MockGenAiAdapter, VideoOperation};
    use crate::services::mocks::test_helpers::create_mock_filesystem;

    const FAST: Duration = Duration::from_millis(2);

    fn adapter_with_key() -> MockGenAiAdapter {
        let mut adapter = MockGenAiAdapter::new();
        adapter.expect_has_api_key().return_const(true);
        adapter
    }

    fn lab_with(adapter: MockGenAiAdapter) -> VideoLab {
        VideoLab::new(
            Arc::new(adapter),
            Arc::new(create_mock_filesystem()),
            Handle::current(),
            PathBuf::from("data/videos"),
        )
        .with_intervals(FAST, FAST)
    }

    async fn settle(lab: &mut VideoLab) {
        for _ in 0..200 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            lab.update();
            if !lab.is_loading() {
                return;
            }
        }
        panic!("video job never finished");
    }

    #[tokio::test]
    async fn test_job_polls_until_done_and_saves() {
        let mut adapter = adapter_with_key();
        adapter
            .expect_start_video()
            .withf(|req| req.prompt == "waves" && req.aspect_ratio == AspectRatio::Portrait)
            .times(1)
            .returning(|_| Ok(VideoOperation::pending("op/1")));
        let mut polls = 0;
        adapter.expect_poll_video().times(2).returning(move |op| {
            polls += 1;
            Ok(VideoOperation {
                name: op.name.clone(),
                done: polls == 2,
                video_uri: (polls == 2).then(|| "https://files/v1".to_string()),
                error: None,
            })
        });
        adapter
            .expect_download_video()
            .withf(|uri| uri == "https://files/v1")
            .returning(|_| Ok(vec![0, 0, 0, 24]));

        let mut lab = lab_with(adapter);
        lab.prompt = "waves".to_string();
        lab.aspect_ratio = AspectRatio::Portrait;
        assert!(lab.submit());
        assert_eq!(lab.progress_message(), PROGRESS_MESSAGES[0]);

        settle(&mut lab).await;
        assert_eq!(lab.error(), None);
        let path = lab.video_path().unwrap();
        assert!(path.starts_with("data/videos"));
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("veo-video-") && name.ends_with(".mp4"));
    }

    #[tokio::test]
    async fn test_missing_link_is_an_error() {
        let mut adapter = adapter_with_key();
        adapter.expect_start_video().returning(|_| {
            Ok(VideoOperation {
                name: "op/2".to_string(),
                done: true,
                ..Default::default()
            })
        });

        let mut lab = lab_with(adapter);
        lab.prompt = "city".to_string();
        lab.submit();
        settle(&mut lab).await;

        assert_eq!(lab.error(), Some(MISSING_LINK));
        assert!(lab.has_credential());
    }

    #[tokio::test]
    async fn test_not_found_download_drops_credential() {
        let mut adapter = adapter_with_key();
        adapter.expect_start_video().returning(|_| {
            Ok(VideoOperation {
                name: "op/3".to_string(),
                done: true,
                video_uri: Some("https://files/v3".to_string()),
                error: None,
            })
        });
        adapter
            .expect_download_video()
            .returning(|_| Err(SmartPlanError::CredentialNotFound));
        adapter.expect_set_api_key().times(1).return_const(());

        let mut lab = lab_with(adapter);
        lab.prompt = "forest".to_string();
        lab.submit();
        settle(&mut lab).await;

        assert!(!lab.has_credential());
        assert!(lab.error().unwrap().contains("Requested entity was not found"));
        assert!(!lab.submit());

        assert!(!lab.select_credential("   "));
        assert!(lab.select_credential("sk-new"));
        assert!(lab.has_credential());
    }

    #[tokio::test]
    async fn test_no_credential_blocks_submit() {
        let mut adapter = MockGenAiAdapter::new();
        adapter.expect_has_api_key().return_const(false);

        let mut lab = lab_with(adapter);
        lab.prompt = "anything".to_string();
        assert!(!lab.has_credential());
        assert!(!lab.submit());
    }

    #[tokio::test]
    async fn test_progress_rotates_and_reset_aborts() {
        let mut adapter = adapter_with_key();
        adapter
            .expect_start_video()
            .returning(|_| Ok(VideoOperation::pending("op/4")));
        adapter
            .expect_poll_video()
            .returning(|op| Ok(VideoOperation::pending(op.name.clone())));

        let mut lab = VideoLab::new(
            Arc::new(adapter),
            Arc::new(create_mock_filesystem()),
            Handle::current(),
            PathBuf::from("videos"),
        )
        .with_intervals(Duration::from_secs(3600), FAST);
        lab.prompt = "slow".to_string();
        lab.submit();

        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if lab.progress_message() != PROGRESS_MESSAGES[0] {
                break;
            }
        }
        assert_ne!(lab.progress_message(), PROGRESS_MESSAGES[0]);
        assert!(lab.is_loading());

        lab.reset();
        assert!(!lab.is_loading());
        assert!(lab.prompt.is_empty());
        assert_eq!(lab.progress_message(), PROGRESS_MESSAGES[0]);
        assert!(lab.job_task.is_none() && lab.rotation_task.is_none());
    }
}
