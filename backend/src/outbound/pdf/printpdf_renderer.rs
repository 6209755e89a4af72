//! [`DocumentRenderer`] producing A4 PDFs with `printpdf`.
//!
//! Commands are laid out top to bottom with the built-in Helvetica fonts;
//! a new page starts whenever the next block would cross the bottom
//! margin. Rendering is CPU bound and runs on the blocking pool.

use async_trait::async_trait;
use printpdf::image_crate::{self, DynamicImage};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};

use crate::domain::DrawCommand;
use crate::domain::ports::{DocumentRenderer, RenderError};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const IMAGE_DPI: f32 = 300.0;
const MAX_IMAGE_WIDTH: f32 = 80.0;
const MM_PER_INCH: f32 = 25.4;

#[derive(Debug, Clone, Copy, Default)]
pub struct PrintPdfRenderer;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct Cursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl Cursor {
    /// Reserve `height` millimetres, breaking the page when they do not fit.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= height;
    }

    fn text(&mut self, text: &str, size: f32, line_height: f32, font: &IndirectFontRef) {
        self.reserve(line_height);
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), font);
    }

    fn image(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        let decoded = image_crate::load_from_memory(bytes)
            .map_err(|err| RenderError::image(err.to_string()))?;
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
        let (width_mm, height_mm) = natural_size_mm(rgb.width(), rgb.height());
        let scale = (MAX_IMAGE_WIDTH / width_mm).min(1.0);
        self.reserve(height_mm * scale);
        Image::from_dynamic_image(&rgb).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(self.y)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..ImageTransform::default()
            },
        );
        Ok(())
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "pixel dimensions of signature images are far below f32 precision limits"
)]
fn natural_size_mm(width_px: u32, height_px: u32) -> (f32, f32) {
    let to_mm = |px: u32| (px as f32) / IMAGE_DPI * MM_PER_INCH;
    (to_mm(width_px).max(1.0), to_mm(height_px).max(1.0))
}

fn render_blocking(title: &str, commands: &[DrawCommand]) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| RenderError::layout(err.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| RenderError::layout(err.to_string()))?,
    };
    let first_layer = doc.get_page(page).get_layer(layer);
    let mut cursor = Cursor {
        doc,
        layer: first_layer,
        y: PAGE_HEIGHT - MARGIN,
    };

    for command in commands {
        match command {
            DrawCommand::Title(text) => cursor.text(text, 18.0, 10.0, &fonts.bold),
            DrawCommand::Heading(text) => cursor.text(text, 13.0, 8.0, &fonts.bold),
            DrawCommand::Text(text) => cursor.text(text, 11.0, 6.0, &fonts.regular),
            DrawCommand::Spacer => cursor.reserve(6.0),
            DrawCommand::Image(bytes) => cursor.image(bytes)?,
        }
    }

    cursor
        .doc
        .save_to_bytes()
        .map_err(|err| RenderError::encode(err.to_string()))
}

#[async_trait]
impl DocumentRenderer for PrintPdfRenderer {
    async fn render(
        &self,
        title: &str,
        commands: Vec<DrawCommand>,
    ) -> Result<Vec<u8>, RenderError> {
        let title = title.to_owned();
        tokio::task::spawn_blocking(move || render_blocking(&title, &commands))
            .await
            .map_err(|err| RenderError::layout(format!("render task: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printpdf::image_crate::{ImageFormat, Rgb, RgbImage};
    use rstest::rstest;
    use std::io::Cursor as IoCursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut IoCursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[tokio::test]
    async fn renders_text_and_signature_image() {
        let commands = vec![
            DrawCommand::Title("Delivery note".to_owned()),
            DrawCommand::Text("Client: Acme".to_owned()),
            DrawCommand::Heading("Signed:".to_owned()),
            DrawCommand::Image(png(120, 40)),
        ];
        let bytes = PrintPdfRenderer
            .render("Delivery note", commands)
            .await
            .expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[rstest]
    fn long_documents_flow_onto_new_pages() {
        let commands: Vec<_> = (0..200)
            .map(|n| DrawCommand::Text(format!("Material: item {n}")))
            .collect();
        let bytes = render_blocking("Long note", &commands).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[rstest]
    fn undecodable_image_is_an_image_error() {
        let err = render_blocking("Broken", &[DrawCommand::Image(vec![0, 1, 2, 3])])
            .expect_err("bad image");
        assert!(matches!(err, RenderError::Image { .. }));
    }

    #[rstest]
    #[case(300, 300, 25.4)]
    #[case(0, 0, 1.0)]
    fn natural_size_follows_dpi(#[case] width: u32, #[case] height: u32, #[case] expected: f32) {
        let (w, h) = natural_size_mm(width, height);
        assert!((w - expected).abs() < 0.01);
        assert!((h - expected).abs() < 0.01);
    }
}
