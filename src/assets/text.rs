use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::fonts::ResolvedFace;
use crate::foundation::error::{ReelforgeError, ReelforgeResult};
use crate::foundation::math::Fnv1a64;

/// Shaped layouts kept before the cache is flushed.
const LAYOUT_CACHE_LIMIT: usize = 512;

/// A single shaped line ready for glyph rasterization.
#[derive(Clone)]
pub(crate) struct ShapedLine {
    pub(crate) layout: Arc<parley::Layout<()>>,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

/// Parley contexts plus the set of faces already registered with them.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    families: HashMap<u32, String>,
    layouts: HashMap<u64, ShapedLine>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
            layouts: HashMap::new(),
        }
    }

    /// Shape one line of text in `face` at `size_px`.
    pub(crate) fn layout_line(
        &mut self,
        face: &ResolvedFace,
        text: &str,
        size_px: f32,
    ) -> ReelforgeResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelforgeError::render("text size must be finite and > 0"));
        }

        let mut h = Fnv1a64::new_default();
        h.write_u32(face.key);
        h.write_u32(size_px.to_bits());
        h.write_str(text);
        let key = h.finish();
        if let Some(hit) = self.layouts.get(&key) {
            return Ok(hit.clone());
        }

        let family_name = self.register(face)?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let shaped = ShapedLine {
            width: layout.width(),
            height: layout.height(),
            layout: Arc::new(layout),
        };
        if self.layouts.len() >= LAYOUT_CACHE_LIMIT {
            self.layouts.clear();
        }
        self.layouts.insert(key, shaped.clone());
        Ok(shaped)
    }

    fn register(&mut self, face: &ResolvedFace) -> ReelforgeResult<String> {
        if let Some(name) = self.families.get(&face.key) {
            return Ok(name.clone());
        }

        let registered = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.data.as_ref().clone()),
            None,
        );
        let mut names = Vec::with_capacity(registered.len());
        for (id, _) in &registered {
            if let Some(name) = self.font_ctx.collection.family_name(*id) {
                names.push(name.to_string());
            }
        }
        let name = names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(&face.family))
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| ReelforgeError::render("registered font has no family name"))?;

        self.families.insert(face.key, name.clone());
        Ok(name)
    }
}
