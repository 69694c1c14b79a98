use crate::error::IngestError;
use crate::models::DiagramImage;
use lopdf::{Document, Object, ObjectId};

#[derive(Debug, Clone)]
pub struct PageContent {
    pub number: u32,
    pub text: String,
    pub images: Vec<DiagramImage>,
}

/// Seam for the delegated PDF decoding. Everything downstream of this trait
/// works on plain page text and image payloads.
pub trait PageExtractor {
    fn extract_pages(&self, document_id: &str, bytes: &[u8]) -> Result<Vec<PageContent>, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PageExtractor for LopdfExtractor {
    fn extract_pages(&self, document_id: &str, bytes: &[u8]) -> Result<Vec<PageContent>, IngestError> {
        let document = Document::load_mem(bytes).map_err(|error| IngestError::DocumentDecode {
            document_id: document_id.to_string(),
            details: error.to_string(),
        })?;

        let mut pages = Vec::new();
        for (page_no, page_id) in document.get_pages() {
            // A page whose text extraction fails or comes back blank is
            // skipped; it can never produce a question.
            let text = match document.extract_text(&[page_no]) {
                Ok(text) if !text.trim().is_empty() => text,
                _ => continue,
            };

            pages.push(PageContent {
                number: page_no,
                text,
                images: page_image_payloads(&document, page_id),
            });
        }

        Ok(pages)
    }
}

/// Collects the raster XObject streams referenced by one page. Every region
/// is best-effort: a stream that cannot be resolved is omitted without
/// failing the page.
fn page_image_payloads(document: &Document, page_id: ObjectId) -> Vec<DiagramImage> {
    let (direct_resources, resource_ids) = document.get_page_resources(page_id);

    let mut images = Vec::new();
    if let Some(resources) = direct_resources {
        collect_xobject_images(document, resources, &mut images);
    }
    for resource_id in resource_ids {
        if let Ok(resources) = document.get_object(resource_id).and_then(Object::as_dict) {
            collect_xobject_images(document, resources, &mut images);
        }
    }

    images
}

fn collect_xobject_images(
    document: &Document,
    resources: &lopdf::Dictionary,
    images: &mut Vec<DiagramImage>,
) {
    let Ok(xobjects) = resources.get(b"XObject").and_then(Object::as_dict) else {
        return;
    };

    for (name, object) in xobjects.iter() {
        let stream = match object {
            Object::Reference(id) => match document.get_object(*id).and_then(Object::as_stream) {
                Ok(stream) => stream,
                Err(_) => continue,
            },
            Object::Stream(stream) => stream,
            _ => continue,
        };

        let is_image = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|subtype| subtype == b"Image")
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        images.push(DiagramImage {
            name: String::from_utf8_lossy(name).to_string(),
            data: stream.content.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_bytes_report_a_decode_error() {
        let result = LopdfExtractor.extract_pages("broken.pdf", b"not a pdf at all");

        match result {
            Err(IngestError::DocumentDecode { document_id, .. }) => {
                assert_eq!(document_id, "broken.pdf");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
