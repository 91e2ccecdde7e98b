// SPDX-License-Identifier: MPL-2.0
//! Text annotation rasterisation.
//!
//! Each annotation is expressed as a one-element SVG document sized to the
//! target surface and rendered with `resvg`, which handles font lookup, shaping
//! and anti-aliasing.

use crate::config::defaults::DEFAULT_FONT_FAMILY;
use crate::domain::editing::TextAnnotation;
use crate::error::{Error, Result};
use resvg::usvg;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tiny_skia::{Pixmap, Transform};

/// Distance from the top of the em box to the baseline, as a fraction of the font size.
const BASELINE_RATIO: f32 = 0.8;

static SYSTEM_FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

fn system_fonts() -> Arc<usvg::fontdb::Database> {
    Arc::clone(SYSTEM_FONTS.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        log::debug!("Loaded {} system font faces", db.len());
        Arc::new(db)
    }))
}

/// Draws text annotations with a configured font.
#[derive(Clone)]
pub struct TextRenderer {
    fonts: Arc<usvg::fontdb::Database>,
    family: String,
}

impl TextRenderer {
    /// Renderer using the system fonts plus an optional extra font file.
    ///
    /// A font file that cannot be read is logged and ignored.
    #[must_use]
    pub fn new(family: &str, font_file: Option<&Path>) -> Self {
        let fonts = match font_file {
            Some(path) => {
                let mut db = (*system_fonts()).clone();
                if let Err(err) = db.load_font_file(path) {
                    log::warn!("Failed to load font {}: {err}", path.display());
                }
                Arc::new(db)
            }
            None => system_fonts(),
        };
        let family = if family.trim().is_empty() {
            DEFAULT_FONT_FAMILY.to_string()
        } else {
            family.to_string()
        };
        Self { fonts, family }
    }

    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Draws every annotation in order onto `pixmap`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Composite`] if an annotation cannot be turned into a
    /// renderable document.
    pub fn draw_all(&self, pixmap: &mut Pixmap, texts: &[TextAnnotation]) -> Result<()> {
        texts.iter().try_for_each(|text| self.draw(pixmap, text))
    }

    /// Draws one annotation. Empty text is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Composite`] if the generated document fails to parse.
    pub fn draw(&self, pixmap: &mut Pixmap, text: &TextAnnotation) -> Result<()> {
        if text.text.is_empty() {
            return Ok(());
        }
        let svg = text_svg(text, pixmap.width(), pixmap.height(), &self.family);
        let options = usvg::Options {
            font_family: self.family.clone(),
            fontdb: Arc::clone(&self.fonts),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|e| Error::Composite(format!("failed to lay out text: {e}")))?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
        Ok(())
    }
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("family", &self.family)
            .field("faces", &self.fonts.len())
            .finish()
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_FAMILY, None)
    }
}

/// SVG document placing `text` on a `width`×`height` canvas.
///
/// The anchor is the top-left of the text box, so the baseline sits
/// [`BASELINE_RATIO`] of the font size below it.
#[allow(clippy::cast_precision_loss)]
fn text_svg(text: &TextAnnotation, width: u32, height: u32, family: &str) -> String {
    let size = text.font_size_for(width as f32);
    let (x, y) = text.anchor.to_pixels(width, height);
    let baseline = y + size * BASELINE_RATIO;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(
        svg,
        r#"<text x="{x}" y="{baseline}" font-family="{}" font-size="{size}" fill="{}" fill-opacity="{}" xml:space="preserve">{}</text></svg>"#,
        escape_xml(family),
        text.color.to_hex(),
        text.color.opacity(),
        escape_xml(&text.text),
    );
    svg
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
