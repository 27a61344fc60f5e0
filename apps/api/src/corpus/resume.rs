use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::corpus::CorpusError;

/// Reads the résumé PDF at `path`.
pub async fn read_resume_pdf(path: &Path) -> Result<Vec<u8>, CorpusError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(CorpusError::FileNotFound(path.to_path_buf()))
        }
        Err(source) => Err(CorpusError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Extracts plain text from PDF bytes on the blocking pool.
pub async fn extract_pdf_text(pdf: Vec<u8>) -> Result<String, CorpusError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| CorpusError::PdfExtraction(format!("extraction task failed: {e}")))?
        .map_err(|e| CorpusError::PdfExtraction(e.to_string()))?;

    debug!("Extracted {} chars of résumé text", text.len());
    Ok(text)
}

/// Builds a one-page PDF showing `text` in Helvetica, with a valid xref table.
#[cfg(test)]
pub(crate) fn single_page_pdf(text: &str) -> Vec<u8> {
    padded_pdf(text, 0)
}

/// Like `single_page_pdf`, with a comment line of `padding` bytes after the
/// header to inflate the file size.
#[cfg(test)]
pub(crate) fn padded_pdf(text: &str, padding: usize) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    if padding > 0 {
        pdf.push(b'%');
        pdf.extend(std::iter::repeat(b'x').take(padding));
        pdf.push(b'\n');
    }
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{offset:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_pdf_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("CV.pdf");
        let err = read_resume_pdf(&path).await.unwrap_err();
        assert!(matches!(err, CorpusError::FileNotFound(p) if p == path));
    }

    #[tokio::test]
    async fn test_reads_existing_file_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("CV.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        assert_eq!(read_resume_pdf(&path).await.unwrap(), b"%PDF-1.4".to_vec());
    }

    #[tokio::test]
    async fn test_non_pdf_bytes_fail_extraction() {
        let err = extract_pdf_text(b"definitely not a pdf".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusError::PdfExtraction(_)));
    }

    #[tokio::test]
    async fn test_extracts_text_from_single_page_pdf() {
        let text = extract_pdf_text(single_page_pdf("Python Kubernetes"))
            .await
            .unwrap();
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, vec!["Python", "Kubernetes"]);
    }
}
