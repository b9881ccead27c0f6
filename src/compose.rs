use std::{io::Cursor, sync::Arc};

use crate::{
    decode,
    error::{CoverforgeError, CoverforgeResult},
    fonts::{FontRegistry, TextBrushRgba8, TextLayoutEngine},
    model::{CoverData, TextElement, parse_hex_color},
    templates::TemplateDetails,
};

/// Finished export: encoded PNG plus the download file name.
#[derive(Clone, Debug)]
pub struct ExportedPng {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Pixel-space anchor for one text element on one template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelAnchor {
    pub center_x: f32,
    pub baseline_y: f32,
}

/// Resolve a text element's percentage placement against a template's pixel
/// dimensions. This is the single authority for text anchoring: any preview
/// and the exporter must both go through it, so the two can never disagree.
///
/// Overlay text is always horizontally centered; `left`/`width` describe the
/// element's editing box but do not move the glyph anchor.
pub fn resolve_position(element: &TextElement, template: &TemplateDetails) -> PixelAnchor {
    PixelAnchor {
        center_x: template.width as f32 / 2.0,
        baseline_y: element.top / 100.0 * template.height as f32 + element.font_size / 2.0,
    }
}

/// Download name for an exported cover: whitespace runs in the title collapse
/// to single hyphens, suffixed `-cover.png`.
pub fn export_file_name(title: &str) -> String {
    let words: Vec<&str> = title.split_whitespace().collect();
    if words.is_empty() {
        "untitled-cover.png".to_string()
    } else {
        format!("{}-cover.png", words.join("-"))
    }
}

/// Rasterize a cover at its template's native pixel dimensions and encode it
/// as a PNG.
///
/// Returns `Ok(None)` when the cover has no background image yet (export is
/// a guarded no-op, not an error). A background that is present but
/// undecodable surfaces as an `Export` error.
#[tracing::instrument(skip(cover, fonts), fields(template = %cover.template_key))]
pub fn export_cover(
    cover: &CoverData,
    fonts: &mut FontRegistry,
) -> CoverforgeResult<Option<ExportedPng>> {
    let Some(uri) = cover.background_image.as_deref() else {
        return Ok(None);
    };
    cover.validate()?;

    let template = cover.template_key.details();
    let background = decode::decode_data_uri(uri)?;

    let width_u16: u16 = template
        .width
        .try_into()
        .map_err(|_| CoverforgeError::export("template width exceeds u16"))?;
    let height_u16: u16 = template
        .height
        .try_into()
        .map_err(|_| CoverforgeError::export("template height exceeds u16"))?;

    let mut surface = vello_cpu::Pixmap::new(width_u16, height_u16);
    let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);

    draw_background(&mut ctx, &background, template)?;

    // Title first, author second; a later paint may overlap an earlier one.
    let mut engine = TextLayoutEngine::new();
    draw_text_element(&mut ctx, &cover.title, template, fonts, &mut engine)?;
    draw_text_element(&mut ctx, &cover.author, template, fonts, &mut engine)?;

    ctx.flush();
    ctx.render_to_pixmap(&mut surface);

    // The stretched background covers the full surface with opaque pixels, so
    // the premultiplied buffer is already straight-alpha for PNG purposes.
    let data = surface.data_as_u8_slice().to_vec();
    let img = image::RgbaImage::from_raw(template.width, template.height, data)
        .ok_or_else(|| CoverforgeError::export("surface byte length mismatch"))?;
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| CoverforgeError::export(format!("encode png: {e}")))?;

    Ok(Some(ExportedPng {
        file_name: export_file_name(&cover.title.text),
        width: template.width,
        height: template.height,
        png,
    }))
}

/// Stretch the background to fill the surface exactly, ignoring its native
/// aspect ratio.
fn draw_background(
    ctx: &mut vello_cpu::RenderContext,
    background: &decode::PreparedImage,
    template: &TemplateDetails,
) -> CoverforgeResult<()> {
    let pixmap = image_premul_bytes_to_pixmap(
        background.rgba8_premul.as_slice(),
        background.width,
        background.height,
    )?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };

    let sx = f64::from(template.width) / f64::from(background.width);
    let sy = f64::from(template.height) / f64::from(background.height);

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(background.width),
        f64::from(background.height),
    ));
    Ok(())
}

fn draw_text_element(
    ctx: &mut vello_cpu::RenderContext,
    element: &TextElement,
    template: &TemplateDetails,
    fonts: &mut FontRegistry,
    engine: &mut TextLayoutEngine,
) -> CoverforgeResult<()> {
    if element.text.is_empty() {
        return Ok(());
    }

    let [r, g, b] = parse_hex_color(&element.color)?;
    let font_bytes = fonts.bytes(element.font_family)?;
    let layout = engine.layout_plain(
        &element.text,
        font_bytes.as_slice(),
        element.font_size,
        TextBrushRgba8 { r, g, b, a: 255 },
    )?;

    let anchor = resolve_position(element, template);
    let x = anchor.center_x - layout.full_width() / 2.0;
    let first_baseline = layout
        .lines()
        .next()
        .map(|line| line.metrics().baseline)
        .unwrap_or(0.0);
    let y = anchor.baseline_y - first_baseline;

    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
        0,
    );

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        f64::from(x),
        f64::from(y),
    )));

    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }

    Ok(())
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CoverforgeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CoverforgeError::export("background width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CoverforgeError::export("background height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CoverforgeError::export(
            "prepared background byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}
