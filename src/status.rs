//! Raw status tokens and the occupancy normalization table.

/// Raw status extracted from a lot's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStatus {
    /// The filename stem of the status image, e.g. "male".
    Token(String),
    /// Page parsed fine but carried no interpretable status.
    Unknown,
}

impl RawStatus {
    /// Extract the status token from an image source path. The token is
    /// the filename stem, e.g. `/pics/ParkingIcons/male.png` -> `male`.
    pub fn from_image_src(src: &str) -> Self {
        let stem = src
            .rsplit('/')
            .next()
            .unwrap_or("")
            .split('.')
            .next()
            .unwrap_or("");
        if stem.is_empty() {
            RawStatus::Unknown
        } else {
            RawStatus::Token(stem.to_string())
        }
    }
}

/// The closed token -> occupancy table. Tokens are the site's own image
/// names: panui = free, meat = few spots left, male = full.
pub const STATUS_LEVELS: [(&str, f64); 3] = [("panui", 0.0), ("meat", 0.7), ("male", 1.0)];

/// Map a raw status to its numeric occupancy level in [0, 1].
///
/// Tokens outside the table (and `Unknown`) return `None` and are
/// excluded from the dataset, never defaulted to a level.
pub fn occupancy_level(status: &RawStatus) -> Option<f64> {
    let token = match status {
        RawStatus::Token(t) => t.as_str(),
        RawStatus::Unknown => return None,
    };
    STATUS_LEVELS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, level)| *level)
}
