//! Frame-overlay compositing
//!
//! Before upload, still images may get a decorative frame overlaid: the
//! active frame configuration matching the photo's orientation names a remote
//! asset, which is fetched, centered over the photo, and written to a derived
//! sibling file carrying the processed marker. Downstream steps then operate
//! on the derivative instead of the original.
//!
//! Skipping is normal (no active configuration, empty asset reference, or a
//! non-decodable format); failing to fetch or composite a selected frame is a
//! hard failure of the whole upload attempt for that file. There is no silent
//! fallback to uploading the unframed original.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{imageops, DynamicImage};
use tracing::{debug, info};

use shuttersync_core::domain::identity::select_frame_asset;
use shuttersync_core::domain::{media, Identity, Orientation, UploadError};
use shuttersync_core::ports::IRemoteSyncClient;

/// Applies orientation-matched frame overlays to still images
pub struct FrameCompositor {
    /// Remote client used to fetch frame asset bytes
    remote: Arc<dyn IRemoteSyncClient>,
}

impl FrameCompositor {
    /// Creates a compositor that fetches frame assets through `remote`
    pub fn new(remote: Arc<dyn IRemoteSyncClient>) -> Self {
        Self { remote }
    }

    /// Composites the configured frame onto `source`, if one applies
    ///
    /// Returns `Ok(Some(derived_path))` when a frame was applied and the
    /// derivative written, `Ok(None)` when compositing does not apply to this
    /// file, and an error when a selected frame could not be fetched or
    /// composited.
    pub async fn apply(
        &self,
        source: &Path,
        identity: &Identity,
    ) -> Result<Option<PathBuf>, UploadError> {
        if !media::is_compositable(source) {
            debug!(path = %source.display(), "Not a compositable still image, skipping frame");
            return Ok(None);
        }

        // Decode on a blocking thread; image codecs are CPU-bound.
        let photo_path = source.to_path_buf();
        let photo = tokio::task::spawn_blocking(move || image::open(&photo_path))
            .await
            .map_err(|err| UploadError::CompositeFailed(format!("decode task: {err}")))?
            .map_err(|err| UploadError::CompositeFailed(format!("decode source: {err}")))?;

        let orientation = Orientation::of(photo.width(), photo.height());
        let Some(asset_ref) = select_frame_asset(&identity.frame_configurations, orientation)
        else {
            debug!(path = %source.display(), ?orientation, "No active frame configuration, skipping");
            return Ok(None);
        };

        let frame_bytes = self
            .remote
            .fetch_asset(asset_ref)
            .await
            .map_err(|err| UploadError::AssetFetchFailure(err.to_string()))?;

        let derived = media::derived_path(source);
        let source_path = source.to_path_buf();
        let derived_path = derived.clone();
        tokio::task::spawn_blocking(move || {
            let frame = image::load_from_memory(&frame_bytes)
                .map_err(|err| UploadError::CompositeFailed(format!("decode frame: {err}")))?;
            let composited = overlay_centered(&photo, &frame);
            write_derived(&composited, &source_path, &derived_path)
        })
        .await
        .map_err(|err| UploadError::CompositeFailed(format!("composite task: {err}")))??;

        info!(
            source = %source.display(),
            derived = %derived.display(),
            asset_ref,
            "Frame composited"
        );
        Ok(Some(derived))
    }
}

/// Overlays `frame` centered onto `photo`, clipping any overhang
fn overlay_centered(photo: &DynamicImage, frame: &DynamicImage) -> image::RgbaImage {
    let mut canvas = photo.to_rgba8();
    let frame = frame.to_rgba8();

    let x = (canvas.width() as i64 - frame.width() as i64) / 2;
    let y = (canvas.height() as i64 - frame.height() as i64) / 2;
    imageops::overlay(&mut canvas, &frame, x, y);

    canvas
}

/// Encodes the composited canvas to the derived path
///
/// The derivative keeps the source extension, so the encoder is chosen by
/// the target name. JPEG carries no alpha channel, so the canvas is flattened
/// to RGB for it.
fn write_derived(
    canvas: &image::RgbaImage,
    source: &Path,
    derived: &Path,
) -> Result<(), UploadError> {
    let is_jpeg = source
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false);

    let result = if is_jpeg {
        DynamicImage::ImageRgba8(canvas.clone()).to_rgb8().save(derived)
    } else {
        canvas.save(derived)
    };

    result.map_err(|err| UploadError::CompositeFailed(format!("write derivative: {err}")))
}
