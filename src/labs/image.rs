// Image lab: text-to-image generation and instruction-based editing
//
// Requests run on the tokio runtime; results come back over an mpsc channel
// drained by `update()` once per frame. Every reset bumps `generation` so a
// result that arrives after the user moved on is discarded.

use crate::error::{Result, SmartPlanError};
use crate::genai::{GenAiAdapter, ImageData};
use crate::services::FileSystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    #[default]
    Generate,
    Edit,
}

impl ImageMode {
    pub fn label(&self) -> &'static str {
        match self {
            ImageMode::Generate => "Generate",
            ImageMode::Edit => "Edit",
        }
    }
}

enum LabMessage {
    Finished { generation: u64, result: Result<ImageData> },
    Saved(Result<PathBuf>),
}

pub struct ImageLab {
    adapter: Arc<dyn GenAiAdapter>,
    fs: Arc<dyn FileSystem>,
    runtime: Handle,
    save_dir: PathBuf,

    mode: ImageMode,
    pub prompt: String,
    source: Option<ImageData>,
    result: Option<ImageData>,
    error: Option<String>,
    is_loading: bool,
    saved_to: Option<PathBuf>,

    generation: u64,
    task: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<LabMessage>,
    rx: mpsc::UnboundedReceiver<LabMessage>,
}

impl ImageLab {
    /// `save_dir` is where "Save" writes results (usually the downloads folder)
    pub fn new(
        adapter: Arc<dyn GenAiAdapter>,
        fs: Arc<dyn FileSystem>,
        runtime: Handle,
        save_dir: PathBuf,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            adapter,
            fs,
            runtime,
            save_dir,
            mode: ImageMode::default(),
            prompt: String::new(),
            source: None,
            result: None,
            error: None,
            is_loading: false,
            saved_to: None,
            generation: 0,
            task: None,
            tx,
            rx,
        }
    }

    pub fn mode(&self) -> ImageMode {
        self.mode
    }

    /// Switching modes starts from a clean slate
    pub fn set_mode(&mut self, mode: ImageMode) {
        if self.mode != mode {
            self.mode = mode;
            self.reset();
        }
    }

    pub fn source(&self) -> Option<&ImageData> {
        self.source.as_ref()
    }

    pub fn result(&self) -> Option<&ImageData> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn saved_to(&self) -> Option<&Path> {
        self.saved_to.as_deref()
    }

    /// Use the given file contents as the edit source
    pub fn load_source(&mut self, bytes: Vec<u8>) -> Result<()> {
        match ImageData::from_file_bytes(bytes) {
            Ok(image) => {
                tracing::debug!("Loaded {} source image ({} bytes)", image.mime_type, image.bytes.len());
                self.source = Some(image);
                self.result = None;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn can_submit(&self) -> bool {
        if self.is_loading || self.prompt.trim().is_empty() {
            return false;
        }
        self.mode == ImageMode::Generate || self.source.is_some()
    }

    /// Start a generation or edit; returns false when there is nothing to do
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }

        self.is_loading = true;
        self.error = None;
        self.result = None;
        self.saved_to = None;

        let adapter = Arc::clone(&self.adapter);
        let prompt = self.prompt.trim().to_string();
        let source = match self.mode {
            ImageMode::Generate => None,
            ImageMode::Edit => self.source.clone(),
        };
        let generation = self.generation;
        let tx = self.tx.clone();

        self.task = Some(self.runtime.spawn(async move {
            let result = match source {
                Some(source) => adapter.edit_image(&source, &prompt).await,
                None => adapter.generate_image(&prompt).await,
            };
            if let Err(e) = &result {
                tracing::error!("Image request failed: {}", e);
            }
            let _ = tx.send(LabMessage::Finished { generation, result });
        }));
        true
    }

    /// Write the current result into the save directory
    pub fn save_result(&mut self) -> bool {
        let Some(image) = self.result.clone() else {
            return false;
        };
        let fs = Arc::clone(&self.fs);
        let dir = self.save_dir.clone();
        let path = dir.join(format!(
            "smartplan-image-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            image.extension()
        ));
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                if !fs.exists(&dir).await {
                    fs.create_dir_all(&dir).await?;
                }
                fs.write_bytes(&path, &image.bytes).await?;
                Ok::<_, SmartPlanError>(path)
            }
            .await;
            let _ = tx.send(LabMessage::Saved(result));
        });
        true
    }

    /// Drop prompt, source, result and error; in-flight work is abandoned
    pub fn reset(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        self.prompt.clear();
        self.source = None;
        self.result = None;
        self.error = None;
        self.saved_to = None;
        self.is_loading = false;
    }

    /// Process finished requests; call once per frame
    pub fn update(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.rx.try_recv() {
            match message {
                LabMessage::Finished { generation, result } => {
                    if generation != self.generation {
                        continue;
                    }
                    self.is_loading = false;
                    self.task = None;
                    match result {
                        Ok(image) => self.result = Some(image),
                        Err(e) => self.error = Some(e.to_string()),
                    }
                }
                LabMessage::Saved(Ok(path)) => {
                    tracing::info!("Saved image to {:?}", path);
                    self.saved_to = Some(path);
                }
                LabMessage::Saved(Err(e)) => {
                    self.error = Some(format!("Failed to save image: {}", e));
                }
            }
            changed = true;
        }
        changed
    }
}

impl Drop for ImageLab {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
