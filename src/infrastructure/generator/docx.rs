//! DOCX output generation.
//!
//! Writes a minimal WordprocessingML package: content types, the package relationship
//! and `word/document.xml` with one paragraph per non-blank line of extracted text.

use async_trait::async_trait;
use std::io::{Cursor, Write};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::{
    ports::{BlobStorage, OutputGenerator},
    DomainError,
};
use crate::infrastructure::storage::DOCS_DIR;

pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_XML_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_XML_TAIL: &str = "<w:sectPr/></w:body></w:document>";

pub struct DocxGenerator {
    storage: Arc<dyn BlobStorage>,
}

impl DocxGenerator {
    pub fn new(storage: Arc<dyn BlobStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl OutputGenerator for DocxGenerator {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn generate(&self, text: &str, source_filename: &str) -> Result<String, DomainError> {
        let paragraphs = split_paragraphs(text);
        let bytes = build_docx(&paragraphs)?;
        let path = output_path(source_filename);

        self.storage
            .write(&path, &bytes)
            .await
            .map_err(|e| DomainError::generation(format!("could not store {path}: {e}")))?;

        debug!(path = %path, paragraphs = paragraphs.len(), "docx generated");
        Ok(path)
    }
}

/// Splits on newlines, dropping lines with nothing printable once whitespace and
/// XML-invalid characters are ignored. Kept lines are returned untrimmed, in order.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| {
            line.chars()
                .any(|c| !c.is_whitespace() && !is_xml_invalid(c))
        })
        .collect()
}

/// Control characters other than tab are not representable in XML 1.0.
fn is_xml_invalid(c: char) -> bool {
    c < ' ' && c != '\t'
}

/// `docs/<basename>_<uuid>.docx`, where basename is the source name without its last
/// extension.
pub fn output_path(source_filename: &str) -> String {
    let file_name = source_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source_filename);
    let base = match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    };

    let mut safe: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    safe = safe.replace("..", "_").trim_matches('.').to_string();
    if safe.trim().is_empty() {
        safe = "document".to_string();
    }

    format!("{DOCS_DIR}/{safe}_{}.docx", Uuid::new_v4())
}

pub fn build_docx(paragraphs: &[&str]) -> Result<Vec<u8>, DomainError> {
    let mut body = String::from(DOCUMENT_XML_HEAD);
    for paragraph in paragraphs {
        body.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
        push_escaped(&mut body, paragraph);
        body.push_str("</w:t></w:r></w:p>");
    }
    body.push_str(DOCUMENT_XML_TAIL);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", PACKAGE_RELS_XML),
        ("word/document.xml", body.as_str()),
    ];
    for (name, content) in parts {
        zip.start_file(name, options).map_err(zip_error)?;
        zip.write_all(content.as_bytes())
            .map_err(|e| DomainError::generation(e.to_string()))?;
    }

    let cursor = zip.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}

fn zip_error(e: zip::result::ZipError) -> DomainError {
    DomainError::generation(format!("could not build docx: {e}"))
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_invalid(c) => {}
            c => out.push(c),
        }
    }
}
