//! PDF variant of the shopping list. All geometry and assets come from
//! [`RenderConfig`] built once at startup; nothing is registered globally.

#![allow(clippy::cast_precision_loss)]

use std::io::Cursor;
use std::path::PathBuf;

use color_eyre::eyre::Context;
use db::cart::CartRecipe;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};

use super::text::capitalize;
use super::{AggregatedLine, RenderError};

const TITLE_SIZE: f64 = 18.0;
const ROW_SIZE: f64 = 12.0;
const FOOTER_SIZE: f64 = 9.0;

/// Vertical space reserved under the title before the first row, in mm.
const HEADER_SPACE: f64 = 18.0;
const ROW_HEIGHT: f64 = 8.0;
const FOOTER_Y: f64 = 10.0;
const LOGO_WIDTH: f64 = 30.0;

/// Rough glyph advance for right-alignment with unhinted metrics.
const PT_TO_MM: f64 = 0.352_778;

#[derive(Debug, Clone)]
pub enum FontSource {
    /// Builtin Helvetica. Enough for tests and Latin-only catalogs;
    /// Cyrillic output needs an embedded TTF via [`FontSource::File`].
    Builtin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub rows_per_page: usize,
    pub font: FontSource,
    /// Up to two PNG logos, drawn in the top corners of every page.
    pub logos: Vec<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            // A4 portrait
            page_width: 210.0,
            page_height: 297.0,
            margin: 20.0,
            rows_per_page: 20,
            font: FontSource::Builtin,
            logos: Vec::new(),
        }
    }
}

impl RenderConfig {
    pub fn from_env() -> color_eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(font) = std::env::var("SHOPPING_PDF_FONT") {
            config.font = FontSource::File(font.into());
        }
        if let Ok(logos) = std::env::var("SHOPPING_PDF_LOGOS") {
            config.logos = logos
                .split(',')
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        if let Ok(rows) = std::env::var("SHOPPING_ROWS_PER_PAGE") {
            config.rows_per_page = rows
                .parse()
                .wrap_err("Invalid SHOPPING_ROWS_PER_PAGE not parsable")?;
        }

        Ok(config)
    }
}

/// Fixed-size pages of ingredient rows.
pub(crate) fn paginate<T>(items: &[T], rows_per_page: usize) -> Vec<&[T]> {
    items.chunks(rows_per_page.max(1)).collect()
}

/// Renders the multi-page PDF document. Ingredient rows are paginated at
/// `rows_per_page`; the recipe list participates only in the empty-cart
/// policy so the page count is a function of the rows alone.
pub fn render_pdf(
    config: &RenderConfig,
    lines: &[AggregatedLine],
    recipes: &[CartRecipe],
) -> Result<Vec<u8>, RenderError> {
    if lines.is_empty() && recipes.is_empty() {
        return Err(RenderError::EmptyDocument);
    }

    let logos = load_logo_bytes(&config.logos)?;

    let pages = paginate(lines, config.rows_per_page);
    let total_pages = pages.len().max(1);

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Список покупок",
        Mm(config.page_width as f32),
        Mm(config.page_height as f32),
        "page 1",
    );

    let font = match &config.font {
        FontSource::Builtin => doc.add_builtin_font(BuiltinFont::Helvetica)?,
        FontSource::File(path) => {
            let data = std::fs::read(path).map_err(|source| RenderError::Asset {
                path: path.clone(),
                source,
            })?;
            doc.add_external_font(data.as_slice())?
        }
    };

    let mut layers: Vec<PdfLayerReference> =
        vec![doc.get_page(first_page).get_layer(first_layer)];
    for n in 1..total_pages {
        let (page, layer) = doc.add_page(
            Mm(config.page_width as f32),
            Mm(config.page_height as f32),
            format!("page {}", n + 1),
        );
        layers.push(doc.get_page(page).get_layer(layer));
    }

    for (page_index, layer) in layers.iter().enumerate() {
        let rows = pages.get(page_index).copied().unwrap_or(&[]);
        draw_page(config, layer, &font, &logos, rows, page_index, total_pages)?;
    }

    Ok(doc.save_to_bytes()?)
}

fn load_logo_bytes(paths: &[PathBuf]) -> Result<Vec<(PathBuf, Vec<u8>)>, RenderError> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path).map_err(|source| RenderError::Asset {
                path: path.clone(),
                source,
            })?;
            Ok((path.clone(), bytes))
        })
        .collect()
}

fn draw_page(
    config: &RenderConfig,
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    logos: &[(PathBuf, Vec<u8>)],
    rows: &[AggregatedLine],
    page_index: usize,
    total_pages: usize,
) -> Result<(), RenderError> {
    place_logos(config, layer, logos)?;

    layer.use_text(
        "Список покупок",
        TITLE_SIZE as f32,
        Mm(config.margin as f32),
        Mm((config.page_height - config.margin) as f32),
        font,
    );

    let top = config.page_height - config.margin - HEADER_SPACE;
    for (row_index, line) in rows.iter().enumerate() {
        let y = top - ROW_HEIGHT * row_index as f64;

        layer.use_text(
            format!("• {}", capitalize(&line.name)),
            ROW_SIZE as f32,
            Mm(config.margin as f32),
            Mm(y as f32),
            font,
        );

        let amount = format!("{}{}", line.amount, line.measurement_unit);
        let x = config.page_width - config.margin - estimated_width(&amount, ROW_SIZE);
        layer.use_text(amount, ROW_SIZE as f32, Mm(x as f32), Mm(y as f32), font);
    }

    let footer = format!("Страница {} из {}", page_index + 1, total_pages);
    let x = (config.page_width - estimated_width(&footer, FOOTER_SIZE)) / 2.0;
    layer.use_text(footer, FOOTER_SIZE as f32, Mm(x as f32), Mm(FOOTER_Y as f32), font);

    Ok(())
}

fn place_logos(
    config: &RenderConfig,
    layer: &PdfLayerReference,
    logos: &[(PathBuf, Vec<u8>)],
) -> Result<(), RenderError> {
    for (slot, (path, bytes)) in logos.iter().enumerate() {
        let decoder =
            PngDecoder::new(Cursor::new(bytes.as_slice())).map_err(|source| RenderError::Logo {
                path: path.clone(),
                source,
            })?;
        let image = Image::try_from(decoder).map_err(|source| RenderError::Logo {
            path: path.clone(),
            source,
        })?;

        let x = if slot == 0 {
            config.margin
        } else {
            config.page_width - config.margin - LOGO_WIDTH
        };

        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x as f32)),
                translate_y: Some(Mm((config.page_height - config.margin + 2.0) as f32)),
                dpi: Some(300.0),
                ..ImageTransform::default()
            },
        );
    }

    Ok(())
}

/// Width estimate for right-aligned and centered text. Half an em per
/// glyph is close enough for digits and short unit strings.
fn estimated_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * 0.5 * PT_TO_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> AggregatedLine {
        AggregatedLine {
            name: format!("ingredient {n}"),
            measurement_unit: "g".to_string(),
            amount: i64::try_from(n).unwrap() + 1,
        }
    }

    fn lines(count: usize) -> Vec<AggregatedLine> {
        (0..count).map(line).collect()
    }

    #[test]
    fn forty_five_rows_make_three_pages_of_twenty() {
        let rows = lines(45);

        let pages = paginate(&rows, 20);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 20);
        assert_eq!(pages[1].len(), 20);
        assert_eq!(pages[2].len(), 5);
    }

    #[test]
    fn paginate_handles_exact_multiples() {
        let rows = lines(40);

        let pages = paginate(&rows, 20);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].len(), 20);
    }

    #[test]
    fn paginate_of_nothing_is_no_pages() {
        let rows = lines(0);

        assert!(paginate(&rows, 20).is_empty());
    }

    #[test]
    fn renders_multi_page_document() {
        let config = RenderConfig::default();

        let bytes = render_pdf(&config, &lines(45), &[]).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_title_only_page_when_cart_has_bare_recipes() {
        let config = RenderConfig::default();
        let recipes = vec![CartRecipe {
            name: "Борщ".to_string(),
            author: "Иван Иванов".to_string(),
        }];

        let bytes = render_pdf(&config, &[], &recipes).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_input_is_refused() {
        let config = RenderConfig::default();

        let err = render_pdf(&config, &[], &[]).unwrap_err();

        assert!(matches!(err, RenderError::EmptyDocument));
    }

    #[test]
    fn missing_font_file_is_fatal() {
        let config = RenderConfig {
            font: FontSource::File("/definitely/not/here.ttf".into()),
            ..RenderConfig::default()
        };

        let err = render_pdf(&config, &lines(1), &[]).unwrap_err();

        assert!(matches!(err, RenderError::Asset { .. }));
    }

    #[test]
    fn missing_logo_file_is_fatal() {
        let config = RenderConfig {
            logos: vec!["/definitely/not/here.png".into()],
            ..RenderConfig::default()
        };

        let err = render_pdf(&config, &lines(1), &[]).unwrap_err();

        assert!(matches!(err, RenderError::Asset { .. }));
    }
}
