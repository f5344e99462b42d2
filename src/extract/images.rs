//! Image URL recovery from the gallery script
//!
//! Listing pages embed their gallery as a script-local array literal:
//!
//! ```text
//! var imgList = [{"shortid":"abc","url":"https://images.example/1.jpg"}, ...];
//! ```
//!
//! This is not parsed as JSON. The array body is split on commas, each
//! fragment is split on its first colon, and every value whose key is the
//! literal `"url"` is kept. A URL containing a comma is therefore truncated.

use crate::extract::ExtractError;

/// Token identifying the gallery script
pub const IMAGE_LIST_MARKER: &str = "imgList";

/// Extracts image URLs from the text of an `imgList` script
pub fn parse_image_list(script: &str) -> Result<Vec<String>, ExtractError> {
    let start = script
        .find(IMAGE_LIST_MARKER)
        .ok_or(ExtractError::MissingElement("imgList script"))?;
    let rest = &script[start..];

    let open = rest
        .find('[')
        .ok_or_else(|| ExtractError::Malformed("imgList has no opening bracket".to_string()))?;
    let close = rest
        .rfind(']')
        .filter(|close| *close > open)
        .ok_or_else(|| ExtractError::Malformed("imgList has no closing bracket".to_string()))?;

    let urls = rest[open + 1..close]
        .split(',')
        .filter_map(|fragment| fragment.split_once(':'))
        .filter(|(key, _)| key.trim().trim_start_matches(['{', '[']).trim() == "\"url\"")
        .map(|(_, value)| {
            value
                .trim()
                .trim_end_matches(['}', ']'])
                .replace('"', "")
                .trim()
                .to_string()
        })
        .filter(|url| !url.is_empty())
        .collect();

    Ok(urls)
}
