//! Encodes a laid-out [`Document`] as PDF bytes.

use anyhow::{Result, anyhow};
use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};

use super::document::{Document, PAGE_HEIGHT, PAGE_WIDTH};

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

pub fn write_pdf(document: &Document) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        document.title.as_str(),
        mm(PAGE_WIDTH),
        mm(PAGE_HEIGHT),
        "Layer 1",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("failed to load Helvetica: {:?}", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("failed to load Helvetica-Bold: {:?}", e))?;

    for (i, page) in document.pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), format!("Layer {}", i + 1))
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in page.lines.iter().chain(page.footer.iter()) {
            let font = if line.bold { &bold } else { &regular };
            layer.use_text(
                line.text.as_str(),
                line.size,
                mm(line.x),
                mm(PAGE_HEIGHT - line.y),
                font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("failed to serialize document: {:?}", e))
}
