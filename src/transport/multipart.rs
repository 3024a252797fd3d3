use rand::distributions::Alphanumeric;
use rand::Rng;

use super::ImageUpload;

const BOUNDARY_LEN: usize = 32;

/// Encoded `multipart/form-data` request body.
pub(crate) struct MultipartBody {
    pub boundary: String,
    pub bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Body with a single file part under `field`.
pub(crate) fn encode_file(field: &str, upload: &ImageUpload) -> MultipartBody {
    let boundary: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_LEN)
        .map(char::from)
        .collect();
    encode_file_with_boundary(field, upload, boundary)
}

fn encode_file_with_boundary(field: &str, upload: &ImageUpload, boundary: String) -> MultipartBody {
    let mut bytes = Vec::with_capacity(upload.bytes.len() + 256);
    bytes.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    bytes.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            quote_safe(field),
            quote_safe(&upload.file_name)
        )
        .as_bytes(),
    );
    bytes.extend_from_slice(format!("Content-Type: {}\r\n\r\n", upload.content_type).as_bytes());
    bytes.extend_from_slice(&upload.bytes);
    bytes.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    MultipartBody { boundary, bytes }
}

fn quote_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| if c == '"' { '\'' } else { c })
        .collect()
}
