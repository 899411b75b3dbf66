//! Template composition: renders a nickname onto the branded templates.
//!
//! The [`Composer`] owns the brand font and knows, per [`ArtifactKind`],
//! which template to load, which [`RatioProfile`]/[`PositionProfile`]
//! constants apply and where the text line is anchored (avatar: centered;
//! primary cover: right-aligned near the top; secondary cover:
//! right-aligned near the bottom). Output is always a freshly encoded PNG
//! buffer; a failed composition never returns partial output.
//!
//! Styling constants (color, letter spacing, margins) are fixed per
//! system, not per request. The sizing and placement constants are tuned
//! empirically; change the templates before changing the numbers.

use crate::typography::{
    resolve_font_size, resolve_text_position, PositionProfile, RatioProfile,
};
use image::{DynamicImage, ImageBuffer, Rgba};
use rusttype::{point, Font, Scale};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The three artifact kinds of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Avatar,
    CoverPrimary,
    CoverSecondary,
}

/// One complete bundle: three encoded PNG buffers for a single nickname.
/// Immutable once built; dropped when distribution completes or fails.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub avatar: Vec<u8>,
    pub cover_primary: Vec<u8>,
    pub cover_secondary: Vec<u8>,
}

#[derive(Debug)]
pub enum ComposeError {
    /// Template asset missing or unreadable.
    TemplateLoad {
        path: PathBuf,
        source: image::ImageError,
    },
    /// Font file missing, unreadable or not a parseable TTF.
    FontLoad { path: PathBuf, reason: String },
    /// PNG encoding of the composited canvas failed.
    Encode(image::ImageError),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::TemplateLoad { path, source } => {
                write!(f, "failed to load template {}: {source}", path.display())
            }
            ComposeError::FontLoad { path, reason } => {
                write!(f, "failed to load font {}: {reason}", path.display())
            }
            ComposeError::Encode(e) => write!(f, "failed to encode composited image: {e}"),
        }
    }
}

impl std::error::Error for ComposeError {}

/// Overlay text color.
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Extra advance between glyphs, in pixels.
const LETTER_SPACING: f32 = 1.5;
/// Right margin for the cover anchors.
const COVER_RIGHT_MARGIN: u32 = 64;

const AVATAR_RATIOS: RatioProfile = RatioProfile {
    base_font_ratio: 0.28,
    min_font_ratio: 0.064,
};
const COVER_PRIMARY_RATIOS: RatioProfile = RatioProfile {
    base_font_ratio: 0.075,
    min_font_ratio: 0.02,
};
const COVER_SECONDARY_RATIOS: RatioProfile = RatioProfile {
    base_font_ratio: 0.07,
    min_font_ratio: 0.018,
};

// Anchor font sizes match base/min of the 1590- and 1920-wide templates.
const COVER_PRIMARY_POSITION: PositionProfile = PositionProfile {
    max_y: 120,
    min_y: 58,
    max_font_size: 119,
    min_font_size: 32,
};
const COVER_SECONDARY_POSITION: PositionProfile = PositionProfile {
    max_y: 600,
    min_y: 560,
    max_font_size: 134,
    min_font_size: 35,
};

impl ArtifactKind {
    pub fn ratios(&self) -> &'static RatioProfile {
        match self {
            ArtifactKind::Avatar => &AVATAR_RATIOS,
            ArtifactKind::CoverPrimary => &COVER_PRIMARY_RATIOS,
            ArtifactKind::CoverSecondary => &COVER_SECONDARY_RATIOS,
        }
    }

    /// Vertical placement profile; the avatar is centered instead.
    pub fn position(&self) -> Option<&'static PositionProfile> {
        match self {
            ArtifactKind::Avatar => None,
            ArtifactKind::CoverPrimary => Some(&COVER_PRIMARY_POSITION),
            ArtifactKind::CoverSecondary => Some(&COVER_SECONDARY_POSITION),
        }
    }
}

/// Renders nicknames onto the branded templates.
///
/// Construction reads and parses the font once; templates are read per
/// composition so a swapped asset takes effect without a restart.
#[derive(Debug)]
pub struct Composer {
    font: Font<'static>,
    assets: crate::config::AssetConfig,
}

impl Composer {
    pub fn new(assets: crate::config::AssetConfig) -> Result<Self, ComposeError> {
        let font_path = assets.font.clone();
        let data = std::fs::read(&font_path).map_err(|e| ComposeError::FontLoad {
            path: font_path.clone(),
            reason: e.to_string(),
        })?;
        let font = Font::try_from_vec(data).ok_or_else(|| ComposeError::FontLoad {
            path: font_path.clone(),
            reason: "not a parseable TTF".to_string(),
        })?;
        info!(font = %font_path.display(), "Composer initialised");
        Ok(Composer { font, assets })
    }

    fn template_path(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Avatar => &self.assets.avatar_template,
            ArtifactKind::CoverPrimary => &self.assets.cover_primary_template,
            ArtifactKind::CoverSecondary => &self.assets.cover_secondary_template,
        }
    }

    /// Compose one artifact: load the kind's template, size and place the
    /// nickname, rasterize it, and return the encoded PNG.
    pub fn compose(&self, nickname: &str, kind: ArtifactKind) -> Result<Vec<u8>, ComposeError> {
        let path = self.template_path(kind);
        let template = image::open(path).map_err(|e| ComposeError::TemplateLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut canvas = template.to_rgba8();

        let font_size = resolve_font_size(nickname, canvas.width(), kind.ratios());
        let px = font_size as f32;
        let width = text_width(&self.font, px, nickname, LETTER_SPACING);

        let (x, y) = match kind.position() {
            // Covers: right-aligned at the interpolated height.
            Some(profile) => {
                let y = resolve_text_position(font_size, profile);
                let x = (canvas.width() as f32 - COVER_RIGHT_MARGIN as f32 - width).round() as i32;
                (x, y)
            }
            // Avatar: centered on both axes.
            None => {
                let x = ((canvas.width() as f32 - width) / 2.0).round() as i32;
                let y = ((canvas.height() as f32 - px) / 2.0).round() as i32;
                (x, y)
            }
        };

        debug!(
            ?kind,
            nickname,
            font_size,
            x,
            y,
            "Composing nickname onto template"
        );
        draw_line(&mut canvas, &self.font, px, x, y, TEXT_COLOR, nickname);

        let mut encoded = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
            .map_err(ComposeError::Encode)?;
        Ok(encoded)
    }

    /// Build the full three-image bundle for one nickname. Fail-fast: the
    /// first composition error aborts the whole bundle.
    pub fn build_bundle(&self, nickname: &str) -> Result<Bundle, ComposeError> {
        info!(nickname, "Building bundle");
        let avatar = self.compose(nickname, ArtifactKind::Avatar)?;
        let cover_primary = self.compose(nickname, ArtifactKind::CoverPrimary)?;
        let cover_secondary = self.compose(nickname, ArtifactKind::CoverSecondary)?;
        info!(
            nickname,
            avatar_bytes = avatar.len(),
            cover_primary_bytes = cover_primary.len(),
            cover_secondary_bytes = cover_secondary.len(),
            "Bundle built"
        );
        Ok(Bundle {
            avatar,
            cover_primary,
            cover_secondary,
        })
    }
}

/// Pixel width of a laid-out line, including letter spacing.
fn text_width(font: &Font<'_>, px: f32, text: &str, letter_spacing: f32) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let scale = Scale::uniform(px);
    let mut width = 0.0f32;
    let mut glyph_count = 0usize;
    for ch in text.chars() {
        let glyph = font.glyph(ch).scaled(scale);
        width += glyph.h_metrics().advance_width;
        glyph_count += 1;
    }
    if glyph_count > 1 {
        width += letter_spacing * (glyph_count - 1) as f32;
    }
    width
}

/// Rasterize one line of text with alpha blending onto the canvas.
/// Glyph fragments outside the canvas are skipped, not an error.
fn draw_line(
    canvas: &mut ImageBuffer<Rgba<u8>, Vec<u8>>,
    font: &Font<'_>,
    px: f32,
    x: i32,
    y: i32,
    color: Rgba<u8>,
    text: &str,
) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let mut caret_x = x as f32;
    let baseline_y = y as f32 + v_metrics.ascent;

    for ch in text.chars() {
        let glyph = font
            .glyph(ch)
            .scaled(scale)
            .positioned(point(caret_x, baseline_y));
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px_x = gx as i32 + bb.min.x;
                let px_y = gy as i32 + bb.min.y;
                if px_x < 0 || px_y < 0 {
                    return;
                }
                let (px_x, px_y) = (px_x as u32, px_y as u32);
                if px_x >= canvas.width() || px_y >= canvas.height() {
                    return;
                }
                let alpha = v.clamp(0.0, 1.0);
                if alpha <= 0.0 {
                    return;
                }
                let dst = canvas.get_pixel_mut(px_x, px_y);
                let inv = 1.0 - alpha;
                dst.0[0] = (color.0[0] as f32 * alpha + dst.0[0] as f32 * inv) as u8;
                dst.0[1] = (color.0[1] as f32 * alpha + dst.0[1] as f32 * inv) as u8;
                dst.0[2] = (color.0[2] as f32 * alpha + dst.0[2] as f32 * inv) as u8;
                dst.0[3] = 255;
            });
        }
        caret_x += glyph.unpositioned().h_metrics().advance_width + LETTER_SPACING;
    }
}
