use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tracing::{info, warn};

use crate::images::upgrade_image_url;
use crate::model::ColorImage;
use crate::net::HttpClient;

/// Anything that can hand back the bytes behind an image URL.
pub trait ImageSource {
    fn get_image(&self, url: &str) -> Result<Vec<u8>, String>;
}

impl ImageSource for HttpClient {
    fn get_image(&self, url: &str) -> Result<Vec<u8>, String> {
        let resp = self.get_bytes(url)?;
        if !resp.is_success() {
            return Err(format!("status code {}", resp.status));
        }
        Ok(resp.body)
    }
}

/// `GRL-S3225`, `黑色的（ブラック）`, 1 -> `GRL-S3225_黑色的_ブラック__01.jpg`.
pub fn image_filename(product_code: &str, color: &str, index: usize, extension: &str) -> String {
    let clean: String = color
        .chars()
        .map(|c| match c {
            '（' | '）' | '(' | ')' | ' ' => '_',
            other => other,
        })
        .collect();
    format!("{}_{}_{:02}.{}", product_code, clean, index, extension)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    pub size: u64,
    pub skipped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorDownload {
    pub color: String,
    pub original_url: String,
    pub high_quality_url: String,
    pub local_path: PathBuf,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadReport {
    pub product_code: String,
    pub total_colors: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub details: Vec<ColorDownload>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub deleted_files: usize,
    pub freed_bytes: u64,
}

/// Local copies of high-quality color images, `{cache}/{code}/{file}`.
pub struct ImageCache<'a> {
    source: &'a dyn ImageSource,
    cache_dir: PathBuf,
    backup_dir: PathBuf,
}

impl<'a> ImageCache<'a> {
    pub fn new(source: &'a dyn ImageSource, cache_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            cache_dir: cache_dir.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Existing files are kept unless `force` is set.
    pub fn download_image(&self, url: &str, path: &Path, force: bool) -> Result<DownloadOutcome, String> {
        if !force {
            if let Ok(meta) = fs::metadata(path) {
                return Ok(DownloadOutcome {
                    path: path.to_path_buf(),
                    size: meta.len(),
                    skipped: true,
                });
            }
        }

        let bytes = self.source.get_image(url)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(path, &bytes).map_err(|e| e.to_string())?;
        Ok(DownloadOutcome {
            path: path.to_path_buf(),
            size: bytes.len() as u64,
            skipped: false,
        })
    }

    pub fn download_product_images(
        &self,
        product_code: &str,
        colors: &[ColorImage],
        backup: bool,
    ) -> DownloadReport {
        let mut report = DownloadReport {
            product_code: product_code.to_string(),
            total_colors: colors.len(),
            ..DownloadReport::default()
        };

        for (idx, color) in colors.iter().enumerate() {
            let hq_url = upgrade_image_url(&color.image_url);
            let filename = image_filename(product_code, &color.color_label, idx + 1, "jpg");
            let cache_path = self.cache_dir.join(product_code).join(&filename);

            let (success, message) = match self.download_image(&hq_url, &cache_path, false) {
                Ok(outcome) => {
                    if backup {
                        self.copy_to_backup(product_code, &filename, &cache_path);
                    }
                    let kb = outcome.size as f64 / 1024.0;
                    if outcome.skipped {
                        (true, format!("already cached ({:.1} KB)", kb))
                    } else {
                        (true, format!("downloaded ({:.1} KB)", kb))
                    }
                }
                Err(e) => (false, format!("download failed: {}", e)),
            };

            if success {
                info!("{} {}: {}", product_code, color.color_label, message);
                report.downloaded += 1;
            } else {
                warn!("{} {}: {}", product_code, color.color_label, message);
                report.failed += 1;
            }
            report.details.push(ColorDownload {
                color: color.color_label.clone(),
                original_url: color.image_url.clone(),
                high_quality_url: hq_url,
                local_path: cache_path,
                success,
                message,
            });
        }

        report
    }

    fn copy_to_backup(&self, product_code: &str, filename: &str, cached: &Path) {
        let target = self.backup_dir.join(product_code).join(filename);
        if target.exists() {
            return;
        }
        let copied = target
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| fs::copy(cached, &target));
        if let Err(e) = copied {
            warn!("backup copy failed for {}: {}", target.display(), e);
        }
    }

    pub fn local_image_path(&self, product_code: &str, color: &str, index: usize) -> Option<PathBuf> {
        let path = self
            .cache_dir
            .join(product_code)
            .join(image_filename(product_code, color, index, "jpg"));
        path.exists().then_some(path)
    }

    /// Deletes cached `.jpg` files last modified more than `days` ago.
    pub fn cleanup_old_cache(&self, days: u64) -> io::Result<CleanupReport> {
        let max_age = Duration::from_secs(days.saturating_mul(86_400));
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut report = CleanupReport::default();
        if self.cache_dir.is_dir() {
            remove_older_than(&self.cache_dir, cutoff, &mut report)?;
        }
        Ok(report)
    }
}

fn remove_older_than(dir: &Path, cutoff: SystemTime, report: &mut CleanupReport) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let meta = entry.metadata()?;
        if meta.is_dir() {
            remove_older_than(&path, cutoff, report)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("jpg") {
            continue;
        }
        if meta.modified()? < cutoff {
            fs::remove_file(&path)?;
            info!("removed stale cache file {}", path.display());
            report.deleted_files += 1;
            report.freed_bytes += meta.len();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeSource {
        requested: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl ImageSource for FakeSource {
        fn get_image(&self, url: &str) -> Result<Vec<u8>, String> {
            self.requested.borrow_mut().push(url.to_string());
            if url.contains("missing") {
                return Err("status code 404".to_string());
            }
            Ok(vec![0xff; 2048])
        }
    }

    fn color(label: &str, url: &str) -> ColorImage {
        ColorImage {
            color_label: label.to_string(),
            image_url: url.to_string(),
        }
    }

    #[test]
    fn filename_sanitizes_parentheses_and_spaces() {
        assert_eq!(
            image_filename("dk988", "黑色的（ブラック）", 1, "jpg"),
            "dk988_黑色的_ブラック__01.jpg"
        );
        assert_eq!(image_filename("dk988", "off white (x)", 12, "png"), "dk988_off_white__x__12.png");
    }

    #[test]
    fn downloads_each_color_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::new();
        let cache = ImageCache::new(&source, dir.path().join("cache"), dir.path().join("backup"));
        let colors = vec![
            color("黑色的（ブラック）", "https://cdn.grail.bz/images/goods/t/dk988/dk988_col_11_150x150.jpg"),
            color("紅色的（レッド）", "https://cdn.grail.bz/images/goods/d/missing/x_col_13.jpg"),
        ];

        let report = cache.download_product_images("dk988", &colors, true);
        assert_eq!((report.total_colors, report.downloaded, report.failed), (2, 1, 1));
        assert_eq!(
            source.requested.borrow()[0],
            "https://cdn.grail.bz/images/goods/d/dk988/dk988_col_11.jpg"
        );
        assert!(report.details[0].success);
        assert!(!report.details[1].success);

        let cached = cache.local_image_path("dk988", "黑色的（ブラック）", 1).unwrap();
        assert_eq!(fs::metadata(&cached).unwrap().len(), 2048);
        assert!(dir
            .path()
            .join("backup/dk988/dk988_黑色的_ブラック__01.jpg")
            .exists());
        assert!(cache.local_image_path("dk988", "紅色的（レッド）", 2).is_none());
    }

    #[test]
    fn existing_file_is_not_refetched_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::new();
        let cache = ImageCache::new(&source, dir.path(), dir.path());
        let path = dir.path().join("a.jpg");
        fs::write(&path, b"old").unwrap();

        let outcome = cache.download_image("https://x/a.jpg", &path, false).unwrap();
        assert!(outcome.skipped);
        assert_eq!(outcome.size, 3);
        assert!(source.requested.borrow().is_empty());

        let outcome = cache.download_image("https://x/a.jpg", &path, true).unwrap();
        assert!(!outcome.skipped);
        assert_eq!(outcome.size, 2048);
    }

    #[test]
    fn cleanup_only_touches_old_jpgs() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::new();
        let cache = ImageCache::new(&source, dir.path().join("cache"), dir.path().join("backup"));
        let sub = dir.path().join("cache/dk988");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("a.jpg"), [0u8; 10]).unwrap();
        fs::write(sub.join("b.png"), [0u8; 10]).unwrap();

        assert_eq!(cache.cleanup_old_cache(30).unwrap(), CleanupReport::default());

        let report = cache.cleanup_old_cache(0).unwrap();
        assert_eq!(report.deleted_files, 1);
        assert_eq!(report.freed_bytes, 10);
        assert!(sub.join("b.png").exists());
    }

    #[test]
    fn cleanup_accepts_huge_day_counts() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::new();
        let cache = ImageCache::new(&source, dir.path().join("cache"), dir.path());
        let sub = dir.path().join("cache/dk988");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("a.jpg"), [0u8; 10]).unwrap();

        assert_eq!(cache.cleanup_old_cache(u64::MAX).unwrap(), CleanupReport::default());
        assert!(sub.join("a.jpg").exists());
    }

    #[test]
    fn cleanup_of_missing_cache_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::new();
        let cache = ImageCache::new(&source, dir.path().join("nothing"), dir.path());
        assert_eq!(cache.cleanup_old_cache(1).unwrap(), CleanupReport::default());
    }
}
