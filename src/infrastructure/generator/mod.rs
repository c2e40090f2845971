mod docx;

pub use docx::{build_docx, output_path, split_paragraphs, DocxGenerator, DOCX_MIME_TYPE};
