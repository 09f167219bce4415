use crate::error::AnalysisError;
use crate::models::FilePayload;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use pdf_extract::extract_text_from_mem;

const PDF_DATA_URL_PREFIX: &str = "data:application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

// What the dispatcher sends to the model: extracted text for PDFs, a
// validated data URL for images.
#[derive(Debug, Clone)]
pub enum AnalysisContent {
    Text(String),
    Image(String),
}

// Route an upload to the text- or image-based analysis path. Unsupported
// types are rejected here, before any external call is made.
pub fn classify(file: &FilePayload) -> Result<AnalysisContent, AnalysisError> {
    if file.data.is_empty() {
        return Err(AnalysisError::Input("no file data provided".to_string()));
    }

    if is_pdf(file) {
        return Ok(classify_pdf(file));
    }

    if file.mime_type.starts_with("image/") {
        return classify_image(file);
    }

    Err(AnalysisError::Input(format!(
        "unsupported file type: {}",
        file.mime_type
    )))
}

fn is_pdf(file: &FilePayload) -> bool {
    file.mime_type == "application/pdf" || file.data.starts_with(PDF_DATA_URL_PREFIX)
}

// PDFs go through text extraction; on failure, fall back to image-based
// analysis with the original payload.
fn classify_pdf(file: &FilePayload) -> AnalysisContent {
    match extract_pdf_text(&file.data) {
        Ok(text) => {
            log::info!(
                "PDF text extraction successful for {}: {} characters",
                file.name,
                text.len()
            );
            AnalysisContent::Text(text)
        }
        Err(err) => {
            log::warn!(
                "PDF text extraction failed for {}, falling back to image-based analysis: {}",
                file.name,
                err
            );
            AnalysisContent::Image(file.data.clone())
        }
    }
}

fn extract_pdf_text(data_url: &str) -> anyhow::Result<String> {
    let bytes = decode_data_url(data_url)?;

    if !bytes.starts_with(PDF_MAGIC) {
        anyhow::bail!("payload does not carry a PDF signature");
    }

    let text = extract_text_from_mem(&bytes)?;
    let text = text.trim().to_string();
    if text.is_empty() {
        anyhow::bail!("PDF contained no extractable text");
    }

    Ok(text)
}

fn classify_image(file: &FilePayload) -> Result<AnalysisContent, AnalysisError> {
    if !file.data.starts_with("data:image/") {
        return Err(AnalysisError::Input(
            "image payload is missing a data URL prefix".to_string(),
        ));
    }

    decode_data_url(&file.data)
        .map_err(|e| AnalysisError::Input(format!("image payload is not valid base64: {}", e)))?;

    Ok(AnalysisContent::Image(file.data.clone()))
}

fn decode_data_url(data_url: &str) -> anyhow::Result<Vec<u8>> {
    let body = data_url
        .split_once(',')
        .map(|(_, body)| body)
        .ok_or_else(|| anyhow::anyhow!("payload is not a data URL"))?;

    Ok(BASE64.decode(body.trim())?)
}
