//! Session identity and frame-overlay configuration
//!
//! The identity carries everything an upload must attach: the user, the
//! selected event and company, and the permission the API checks. It also
//! carries the ordered frame configurations the compositor consults before
//! each still-image upload.

use serde::{Deserialize, Serialize};

// ============================================================================
// Identity
// ============================================================================

/// The fully configured identity required for uploads and deletions
///
/// Produced by the session provider once the user has logged in and selected
/// an event and company. The pipeline treats an incomplete identity as
/// "not configured" and refuses network calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Authenticated user identifier
    pub user_id: String,
    /// Currently selected event
    pub event_id: String,
    /// Currently selected company
    pub company_id: String,
    /// Permission the API validates via the `X-Permission-Id` header
    pub permission_id: String,
    /// Ordered frame configurations for the selected event/company
    #[serde(default)]
    pub frame_configurations: Vec<FrameConfiguration>,
}

impl Identity {
    /// Returns true if every field required for a network call is non-empty
    pub fn is_complete(&self) -> bool {
        !self.user_id.is_empty() && !self.event_id.is_empty() && !self.company_id.is_empty()
    }
}

// ============================================================================
// Frame configuration
// ============================================================================

/// A single frame-overlay configuration entry
///
/// Each entry carries one asset reference per orientation. An empty reference
/// means "no frame for that orientation" even when the entry is active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameConfiguration {
    /// Asset reference for landscape photos (empty = none)
    #[serde(default)]
    pub horizontal_asset: String,
    /// Asset reference for portrait photos (empty = none)
    #[serde(default)]
    pub vertical_asset: String,
    /// Whether this entry participates in frame selection
    #[serde(default)]
    pub active: bool,
}

impl FrameConfiguration {
    /// Returns the asset reference for the given orientation, if present
    fn asset_for(&self, orientation: Orientation) -> Option<&str> {
        let asset = match orientation {
            Orientation::Horizontal => &self.horizontal_asset,
            Orientation::Vertical => &self.vertical_asset,
        };
        if asset.is_empty() {
            None
        } else {
            Some(asset)
        }
    }
}

/// Image orientation used for frame selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Width strictly greater than height
    Horizontal,
    /// Everything else, squares included
    Vertical,
}

impl Orientation {
    /// Classifies an image by its pixel dimensions
    pub fn of(width: u32, height: u32) -> Self {
        if width > height {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// Selects the frame asset to composite for the given orientation
///
/// Walks the ordered configurations and returns the first active entry with a
/// non-empty asset reference for that orientation. `None` means the upload
/// proceeds without compositing.
pub fn select_frame_asset(
    configurations: &[FrameConfiguration],
    orientation: Orientation,
) -> Option<&str> {
    configurations
        .iter()
        .filter(|config| config.active)
        .find_map(|config| config.asset_for(orientation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(horizontal: &str, vertical: &str, active: bool) -> FrameConfiguration {
        FrameConfiguration {
            horizontal_asset: horizontal.to_string(),
            vertical_asset: vertical.to_string(),
            active,
        }
    }

    #[test]
    fn test_orientation_classification() {
        assert_eq!(Orientation::of(4000, 3000), Orientation::Horizontal);
        assert_eq!(Orientation::of(3000, 4000), Orientation::Vertical);
        // Squares count as vertical
        assert_eq!(Orientation::of(2048, 2048), Orientation::Vertical);
    }

    #[test]
    fn test_selects_first_active_matching_entry() {
        let configs = vec![
            config("h1.png", "v1.png", false),
            config("h2.png", "v2.png", true),
            config("h3.png", "v3.png", true),
        ];

        assert_eq!(
            select_frame_asset(&configs, Orientation::Horizontal),
            Some("h2.png")
        );
        assert_eq!(
            select_frame_asset(&configs, Orientation::Vertical),
            Some("v2.png")
        );
    }

    #[test]
    fn test_empty_asset_reference_is_skipped() {
        let configs = vec![config("", "v1.png", true), config("h2.png", "", true)];

        // First active entry has no horizontal asset, so the second wins
        assert_eq!(
            select_frame_asset(&configs, Orientation::Horizontal),
            Some("h2.png")
        );
        assert_eq!(
            select_frame_asset(&configs, Orientation::Vertical),
            Some("v1.png")
        );
    }

    #[test]
    fn test_no_active_entry_means_no_compositing() {
        let configs = vec![config("h1.png", "v1.png", false)];
        assert_eq!(select_frame_asset(&configs, Orientation::Horizontal), None);
        assert_eq!(select_frame_asset(&[], Orientation::Vertical), None);
    }

    #[test]
    fn test_identity_completeness() {
        let identity = Identity {
            user_id: "user-1".into(),
            event_id: "event-1".into(),
            company_id: "company-1".into(),
            permission_id: "perm-1".into(),
            frame_configurations: Vec::new(),
        };
        assert!(identity.is_complete());

        let incomplete = Identity {
            event_id: String::new(),
            ..identity
        };
        assert!(!incomplete.is_complete());
    }
}
