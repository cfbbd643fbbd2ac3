//! Answers fixed questions about a frame or a crop of it.
//!
//! Every function here is a pure function of its input image.

use anyhow::Result;
use image::RgbaImage;
use pixbot_config::Thresholds;
use pixbot_state::PotionKind;
use tracing::trace;

use crate::color::{channel_means, mean_brightness, mean_value};
use crate::template_finder::{SearchRequest, TemplateMatcher};

/// True if any of the alternative templates is found.
///
/// Used for controls that have several skins (active / inactive) or several
/// renderings of the same message.
pub fn classify_presence(
    frame: &RgbaImage,
    matcher: &dyn TemplateMatcher,
    alternatives: &[SearchRequest],
) -> Result<bool> {
    for request in alternatives {
        if matcher.search(request, frame)?.is_found() {
            trace!("{} present", request.template_id);
            return Ok(true);
        }
    }
    Ok(false)
}

/// Classify a belt slot crop.
///
/// The brightness gate runs first: a dim cell is empty no matter how tinted
/// it is. Only then does the dominant of red and blue decide.
pub fn classify_potion(crop: &RgbaImage, thresholds: &Thresholds) -> PotionKind {
    if mean_brightness(crop) < thresholds.potion_empty_brightness {
        return PotionKind::Empty;
    }
    let [red, _, blue] = channel_means(crop);
    if red > blue && red > thresholds.potion_min_channel {
        PotionKind::Health
    } else if blue > red && blue > thresholds.potion_min_channel {
        PotionKind::Mana
    } else {
        PotionKind::Empty
    }
}

/// Whether an inventory cell (already shrunk past its border) holds an item.
pub fn slot_has_item(crop: &RgbaImage, thresholds: &Thresholds) -> bool {
    mean_value(crop) > thresholds.slot_item_value
}

/// Skill icons are drawn darkened while the skill cannot be cast.
pub fn skill_is_available(crop: &RgbaImage, thresholds: &Thresholds) -> bool {
    mean_brightness(crop) > thresholds.skill_available_brightness
}
