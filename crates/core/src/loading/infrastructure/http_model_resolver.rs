use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::loading::domain::model_resolver::{ModelResolveError, ModelResolver};

/// Progress callback: `(file_name, bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(&str, u64, u64) + Send>;

/// Resolves model files from disk caches, downloading on a miss.
///
/// Resolution order:
/// 1. Cache directory (platform-specific unless overridden)
/// 2. Bundled directory (for development / pre-packaged installs)
/// 3. Download from `<base_url>/<file>` into the cache
pub struct HttpModelResolver {
    base_url: String,
    bundled_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    progress: Option<ProgressFn>,
}

impl HttpModelResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bundled_dir: None,
            cache_dir: None,
            progress: None,
        }
    }

    pub fn with_bundled_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.bundled_dir = dir;
        self
    }

    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    fn url_for(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.base_url.trim_end_matches('/'))
    }

    fn cache_dir(&self) -> Result<PathBuf, ModelResolveError> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => model_cache_dir(),
        }
    }
}

impl ModelResolver for HttpModelResolver {
    fn resolve(&self, file_name: &str) -> Result<PathBuf, ModelResolveError> {
        let cache_dir = self.cache_dir()?;
        let cached_path = cache_dir.join(file_name);
        if cached_path.exists() {
            return Ok(cached_path);
        }

        if let Some(dir) = &self.bundled_dir {
            let bundled_path = dir.join(file_name);
            if bundled_path.exists() {
                return Ok(bundled_path);
            }
        }

        fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
        log::info!("Downloading model file {file_name}");
        let progress = self.progress.as_ref().map(|cb| {
            move |downloaded: u64, total: u64| cb(file_name, downloaded, total)
        });
        download(&self.url_for(file_name), &cached_path, progress)?;
        Ok(cached_path)
    }
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Facescope/models/`
/// - Linux: `$XDG_CACHE_HOME/Facescope/models/` or `~/.cache/Facescope/models/`
/// - Windows: `%LOCALAPPDATA%/Facescope/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("Facescope").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("Facescope").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(
    url: &str,
    dest: &Path,
    progress: Option<impl Fn(u64, u64)>,
) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url).map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;
    if !response.status().is_success() {
        return Err(ModelResolveError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    // Write to a temp file first, then rename, so a failed download never
    // leaves a truncated model in the cache.
    let temp_path = dest.with_extension("part");
    let write_err = |source: std::io::Error| ModelResolveError::Write {
        path: temp_path.clone(),
        source,
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;

    let mut downloaded: u64 = 0;
    for chunk in bytes.chunks(1024 * 1024) {
        file.write_all(chunk).map_err(write_err)?;
        downloaded += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|source| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source,
    })
}
