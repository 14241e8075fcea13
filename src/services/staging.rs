use rand::RngCore;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt, BufWriter};

/// Longest original extension carried into a staged name, in bytes. Anything longer is
/// dropped so the name stays well below filesystem limits.
pub const MAX_EXTENSION_LEN: usize = 32;

/// Removes a staged path when dropped unless disarmed first. Covers request futures
/// that are cancelled between creating a file and the explicit cleanup.
#[derive(Debug)]
pub struct RemoveOnDrop {
    path: Option<PathBuf>,
}

impl RemoveOnDrop {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Hands the path back without removing it.
    pub fn disarm(mut self) -> Option<PathBuf> {
        self.path.take()
    }
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    remove_quietly(&path).await;
                });
            }
            Err(_) => {
                if let Err(e) = std::fs::remove_file(&path) {
                    if e.kind() != io::ErrorKind::NotFound {
                        tracing::warn!("Failed to remove staged file {}: {}", path.display(), e);
                    }
                }
            }
        }
    }
}

async fn remove_quietly(path: &Path) -> bool {
    match fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!("Failed to remove staged file {}: {}", path.display(), e);
            false
        }
    }
}

/// Local holding area for uploads that only live as long as one request.
#[derive(Debug, Clone)]
pub struct StagingStore {
    root: PathBuf,
    entropy_bytes: usize,
}

impl StagingStore {
    pub fn new(root: impl Into<PathBuf>, entropy_bytes: usize) -> Self {
        Self {
            root: root.into(),
            entropy_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Random hex identifier followed by the extension of `original_name`
    /// (`photo.JPG` -> `<hex>.JPG`, `README` -> `<hex>`). Extensions longer than
    /// `MAX_EXTENSION_LEN` bytes are dropped.
    pub fn generate_name(&self, original_name: &str) -> String {
        let mut bytes = vec![0u8; self.entropy_bytes];
        rand::thread_rng().fill_bytes(&mut bytes);

        let extension = Path::new(original_name)
            .extension()
            .map(|ext| ext.to_string_lossy())
            .filter(|ext| ext.len() <= MAX_EXTENSION_LEN)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        format!("{}{}", hex::encode(bytes), extension)
    }

    /// Creates the staging directory if needed. Safe to race.
    pub async fn ensure_directory(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Streams `reader` into `<root>/<filename>` and returns the absolute path once the
    /// data is flushed. A partially written file is removed before the error is returned.
    pub async fn write<R>(&self, filename: &str, mut reader: R) -> io::Result<PathBuf>
    where
        R: AsyncRead + Unpin,
    {
        self.ensure_directory().await?;
        let path = std::path::absolute(self.root.join(filename))?;
        let guard = RemoveOnDrop::new(&path);

        let written = async {
            let file = fs::File::create(&path).await?;
            let mut writer = BufWriter::new(file);
            let size = tokio::io::copy(&mut reader, &mut writer).await?;
            writer.flush().await?;
            writer.into_inner().sync_all().await?;
            Ok::<u64, io::Error>(size)
        }
        .await;

        match written {
            Ok(size) => {
                guard.disarm();
                tracing::debug!("Staged {} ({} bytes)", path.display(), size);
                Ok(path)
            }
            Err(e) => {
                self.remove(&path).await;
                guard.disarm();
                Err(e)
            }
        }
    }

    /// Best-effort delete. A missing file is not an error and other failures are
    /// only logged. Returns whether a file was actually removed.
    pub async fn remove(&self, path: &Path) -> bool {
        remove_quietly(path).await
    }
}
