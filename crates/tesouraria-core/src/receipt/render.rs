//! Single-page A4 layout written with lopdf.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::debug;

use super::metrics::StandardFont;
use super::signature::{ImagePayload, SignatureImage};
use super::{DocumentNumber, ReceiptKind};
use crate::error::{FieldError, Result, ValidationErrors};
use crate::models::ReceiptConfig;
use crate::taxid::labeled_document;

const TAX_ID_SIZE: f32 = 11.0;
const SIGNATURE_LINE_WIDTH: f32 = 250.0;
const MIN_BODY_SIZE: f32 = 6.0;
const BODY_SIZE_STEP: f32 = 0.5;
const IMAGE_RESOURCE: &str = "Im1";

/// Everything printed on a receipt or reimbursement page.
#[derive(Debug, Clone)]
pub struct ReceiptDocument {
    pub kind: ReceiptKind,
    pub church_name: String,
    /// Church CNPJ, raw or formatted.
    pub church_tax_id: String,
    pub number: DocumentNumber,
    pub body: String,
    pub signature: Option<SignatureImage>,
    pub signer_name: String,
    /// CPF or CNPJ of the signer, raw or formatted.
    pub signer_document: Option<String>,
}

/// A rendered PDF plus the body lines as laid out.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub body_lines: Vec<String>,
}

/// Map text onto WinAnsiEncoding. Characters outside it become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            0x20ac => 0x80,
            0x2026 => 0x85,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201c => 0x93,
            0x201d => 0x94,
            0x2022 => 0x95,
            0x2013 => 0x96,
            0x2014 => 0x97,
            _ => b'?',
        })
        .collect()
}

fn zlib(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

struct PageWriter {
    width: f32,
    ops: Vec<Operation>,
}

impl PageWriter {
    fn text(&mut self, font: StandardFont, size: f32, x: f32, y: f32, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new("Tf", vec![font.resource_name().into(), size.into()]));
        self.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn centered(&mut self, font: StandardFont, size: f32, y: f32, text: &str) {
        let x = (self.width - font.text_width(text, size)) / 2.0;
        self.text(font, size, x.max(0.0), y, text);
    }

    fn line(&mut self, x1: f32, x2: f32, y: f32) {
        self.ops.push(Operation::new("w", vec![0.75_f32.into()]));
        self.ops.push(Operation::new("m", vec![x1.into(), y.into()]));
        self.ops.push(Operation::new("l", vec![x2.into(), y.into()]));
        self.ops.push(Operation::new("S", vec![]));
    }

    fn image(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![w.into(), 0.0_f32.into(), 0.0_f32.into(), h.into(), x.into(), y.into()],
        ));
        self.ops.push(Operation::new("Do", vec![IMAGE_RESOURCE.into()]));
        self.ops.push(Operation::new("Q", vec![]));
    }
}

fn add_font(doc: &mut Document, font: StandardFont) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_name(),
        "Encoding" => "WinAnsiEncoding",
    })
}

fn add_image(doc: &mut Document, image: &SignatureImage) -> Result<ObjectId> {
    let width = i64::from(image.width);
    let height = i64::from(image.height);

    let id = match &image.payload {
        ImagePayload::Jpeg { data, gray } => doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => if *gray { "DeviceGray" } else { "DeviceRGB" },
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            data.clone(),
        )),
        ImagePayload::Raw { pixels, gray, alpha } => {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => if *gray { "DeviceGray" } else { "DeviceRGB" },
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            };
            if let Some(alpha) = alpha {
                let mask_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => width,
                        "Height" => height,
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                        "Filter" => "FlateDecode",
                    },
                    zlib(alpha)?,
                ));
                dict.set("SMask", mask_id);
            }
            doc.add_object(Stream::new(dict, zlib(pixels)?))
        }
    };
    Ok(id)
}

/// Drawn height of the signature image, or the gap left for a handwritten one.
fn signature_drop(document: &ReceiptDocument, config: &ReceiptConfig) -> f32 {
    let (box_w, box_h) = config.signature_box;
    match &document.signature {
        Some(image) => {
            let scale = (box_w / image.width as f32).min(box_h / image.height as f32);
            image.height as f32 * scale + 6.0
        }
        None => box_h / 2.0,
    }
}

/// Distance from the last body baseline down to the lowest footer baseline.
fn footer_height(document: &ReceiptDocument, config: &ReceiptConfig) -> f32 {
    let mut height = 30.0 + signature_drop(document, config) + config.body_size + 4.0;
    if document.signer_document.is_some() {
        height += TAX_ID_SIZE + 4.0;
    }
    height
}

/// Wrap the body at the largest size, down to [`MIN_BODY_SIZE`], whose
/// lines leave room for the footer within `available` points.
fn fit_body(text: &str, config: &ReceiptConfig, available: f32) -> Result<(f32, Vec<String>)> {
    let mut size = config.body_size;
    loop {
        let lines = StandardFont::Helvetica.wrap(text, size, config.content_width());
        let height = lines.len().saturating_sub(1) as f32 * size * 1.5;
        if height <= available {
            if size < config.body_size {
                debug!("Body text shrunk to {}pt to fit {} lines", size, lines.len());
            }
            return Ok((size, lines));
        }
        if size - BODY_SIZE_STEP < MIN_BODY_SIZE {
            let error = FieldError::new("description", "too long to fit on one page");
            return Err(ValidationErrors(vec![error]).into());
        }
        size -= BODY_SIZE_STEP;
    }
}

/// Lay out and serialize a receipt page.
pub fn render(document: &ReceiptDocument, config: &ReceiptConfig) -> Result<RenderedDocument> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = add_font(&mut doc, StandardFont::Helvetica);
    let bold_id = add_font(&mut doc, StandardFont::HelveticaBold);

    let mut page = PageWriter {
        width: config.page_width,
        ops: Vec::new(),
    };
    let margin = config.margin;
    let mut y = config.page_height - margin - config.title_size;

    page.centered(StandardFont::HelveticaBold, config.title_size, y, &document.church_name);
    y -= TAX_ID_SIZE + 8.0;
    page.centered(
        StandardFont::Helvetica,
        TAX_ID_SIZE,
        y,
        &labeled_document(&document.church_tax_id),
    );

    y -= 36.0;
    let heading = format!("{} No. {}", document.kind.label(), document.number);
    page.centered(StandardFont::HelveticaBold, config.number_size, y, &heading);

    y -= 40.0;
    let available = y - margin - footer_height(document, config);
    let (body_size, body_lines) = fit_body(&document.body, config, available)?;
    let line_height = body_size * 1.5;
    for (i, line) in body_lines.iter().enumerate() {
        if i > 0 {
            y -= line_height;
        }
        page.text(StandardFont::Helvetica, body_size, margin, y, line);
    }

    y -= 30.0;
    let mut image_id = None;
    if let Some(image) = &document.signature {
        let (box_w, box_h) = config.signature_box;
        let scale = (box_w / image.width as f32).min(box_h / image.height as f32);
        let (w, h) = (image.width as f32 * scale, image.height as f32 * scale);
        let x = (config.page_width - w) / 2.0;
        page.image(x, y - h, w, h);
        image_id = Some(add_image(&mut doc, image)?);
    }
    y -= signature_drop(document, config);

    let line_x = (config.page_width - SIGNATURE_LINE_WIDTH) / 2.0;
    page.line(line_x, line_x + SIGNATURE_LINE_WIDTH, y);
    y -= config.body_size + 4.0;
    page.centered(StandardFont::HelveticaBold, config.body_size, y, &document.signer_name);
    if let Some(tax_id) = &document.signer_document {
        y -= TAX_ID_SIZE + 4.0;
        page.centered(StandardFont::Helvetica, TAX_ID_SIZE, y, &labeled_document(tax_id));
    }

    let content = Content { operations: page.ops };
    let content_id = doc.add_object(Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        zlib(&content.encode()?)?,
    ));

    let mut resources = dictionary! {
        "Font" => dictionary! {
            StandardFont::Helvetica.resource_name() => regular_id,
            StandardFont::HelveticaBold.resource_name() => bold_id,
        },
    };
    if let Some(id) = image_id {
        resources.set("XObject", dictionary! { IMAGE_RESOURCE => id });
    }

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.0_f32.into(), 0.0_f32.into(), config.page_width.into(), config.page_height.into()],
        "Contents" => content_id,
        "Resources" => resources,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(heading.as_str()),
        "Producer" => Object::string_literal("tesouraria"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    debug!("Rendered {} ({} bytes, {} body lines)", heading, bytes.len(), body_lines.len());

    Ok(RenderedDocument { bytes, body_lines })
}

/// Text shown by a rendered page, one string per text operation.
#[cfg(test)]
pub(crate) fn page_strings(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(raw, _)) => Some(raw.iter().map(|&b| b as char).collect()),
            _ => None,
        })
        .collect()
}

/// Operators used by a rendered page.
#[cfg(test)]
pub(crate) fn page_operators(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    content.operations.into_iter().map(|op| op.operator).collect()
}
