//! Origin/variant tags parsed from image file names

use std::path::Path;

use serde::Serialize;
use tracing::debug;

/// Placeholder for tags that could not be parsed
pub const UNKNOWN_TAG: &str = "unknown";

/// Tags encoded in a file name such as `saga_simple_003.png`
///
/// The first two underscore-separated tokens of the stem are the origin
/// category code and the variant (prompt type). They are positional only and
/// are not checked against the configured categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemTags {
    pub region: String,
    pub prompt_type: String,
}

impl ItemTags {
    pub fn parse(file_name: &str) -> Self {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);

        let mut tokens = stem.split('_');
        match (tokens.next(), tokens.next()) {
            (Some(region), Some(prompt_type)) if !region.is_empty() && !prompt_type.is_empty() => Self {
                region: region.to_string(),
                prompt_type: prompt_type.to_string(),
            },
            _ => {
                debug!(%file_name, "ItemTags::parse: fewer than two tags, using unknown");
                Self::unknown()
            }
        }
    }

    pub fn unknown() -> Self {
        Self {
            region: UNKNOWN_TAG.to_string(),
            prompt_type: UNKNOWN_TAG.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.region == UNKNOWN_TAG && self.prompt_type == UNKNOWN_TAG
    }
}
