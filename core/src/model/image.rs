use std::path::Path;
use std::sync::Arc;

/// Image picked by the user, held in memory until the next selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    file_name: String,
    bytes: Arc<[u8]>,
}

impl SelectedImage {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content type sent with the upload, guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        mime_for_file_name(&self.file_name)
    }
}

pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(SelectedImage::new("shelf.JPG", vec![1u8]).mime_type(), "image/jpeg");
        assert_eq!(SelectedImage::new("shelf.png", vec![1u8]).mime_type(), "image/png");
        assert_eq!(
            SelectedImage::new("shelf", vec![1u8]).mime_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn clones_share_the_payload() {
        let image = SelectedImage::new("a.jpg", vec![1u8, 2, 3]);
        let copy = image.clone();
        assert_eq!(copy.bytes(), &[1, 2, 3]);
        assert_eq!(copy.len(), 3);
        assert!(!copy.is_empty());
    }
}
