//! G-code thumbnails on the display
//!
//! The display picture component takes raw RGB565 pixel data as hex text.
//! Images are flattened onto the page background, scaled to the component
//! size and streamed in bounded `write` instructions.

use crate::context::PageContext;
use crate::error::{UiError, UiResult};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use printhmi_communication::TouchDisplay;

/// Hex characters per `write` instruction
pub const CHUNK_CHARS: usize = 1024;

/// Parse an `rrggbb` colour
pub fn parse_color(hex: &str) -> UiResult<Rgb<u8>> {
    let hex = hex.trim_start_matches('#');
    let invalid = || UiError::InvalidInput {
        input: hex.to_string(),
    };
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// Composite an image with transparency onto a solid background
pub fn flatten(image: &DynamicImage, background: Rgb<u8>) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |fg: u8, bg: u8| {
            ((u16::from(fg) * alpha + u16::from(bg) * (255 - alpha)) / 255) as u8
        };
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

/// Pack one pixel as RGB565
pub fn rgb565(pixel: Rgb<u8>) -> u16 {
    let [r, g, b] = pixel.0;
    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
}

/// Flatten, scale to `size`×`size` and hex-encode as RGB565
pub fn encode_rgb565(image: &DynamicImage, size: u32, background: Rgb<u8>) -> String {
    let flat = flatten(image, background);
    let scaled = imageops::resize(&flat, size, size, FilterType::Triangle);
    let mut hex = String::with_capacity((size * size * 4) as usize);
    for pixel in scaled.pixels() {
        hex.push_str(&format!("{:04X}", rgb565(*pixel)));
    }
    hex
}

/// Stream encoded pixel data into `component`
pub async fn upload(display: &dyn TouchDisplay, component: &str, hex: &str) -> UiResult<()> {
    display.command(&format!("{component}.close()")).await?;
    // hex is pure ASCII, so byte chunks are valid strings
    for chunk in hex.as_bytes().chunks(CHUNK_CHARS) {
        let chunk = String::from_utf8_lossy(chunk);
        display
            .command(&format!("{component}.write(\"{chunk}\")"))
            .await?;
    }
    Ok(())
}

/// Thumbnail of the file being printed, re-fetched only when the file changes
#[derive(Debug, Clone)]
pub struct ThumbnailSlot {
    component: &'static str,
    size: u32,
    background: &'static str,
    filename: String,
}

impl ThumbnailSlot {
    pub fn new(component: &'static str, size: u32, background: &'static str) -> Self {
        Self {
            component,
            size,
            background,
            filename: String::new(),
        }
    }

    /// Filename last rendered
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Show the thumbnail of `filename`, or hide the component when empty
    ///
    /// A failed fetch is logged and the component is still shown.
    pub async fn render(&mut self, ctx: &PageContext, filename: &str) -> UiResult<()> {
        if filename.is_empty() {
            self.filename.clear();
            ctx.display
                .command(&format!("vis {},0", self.component))
                .await?;
            return Ok(());
        }
        if filename == self.filename {
            return Ok(());
        }

        self.filename = filename.to_string();
        if let Err(e) = self.fetch_and_upload(ctx, filename).await {
            tracing::warn!("Thumbnail for {} unavailable: {}", filename, e);
        }
        ctx.display
            .command(&format!("vis {},1", self.component))
            .await?;
        Ok(())
    }

    async fn fetch_and_upload(&self, ctx: &PageContext, filename: &str) -> UiResult<()> {
        let image = ctx.printer.thumbnail(self.size, filename).await?;
        let hex = encode_rgb565(&image, self.size, parse_color(self.background)?);
        tracing::debug!(
            "Uploading {} thumbnail bytes for {} to {}",
            hex.len() / 2,
            filename,
            self.component
        );
        upload(ctx.display.as_ref(), self.component, &hex).await
    }
}
