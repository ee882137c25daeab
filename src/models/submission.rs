use garde::Validate;

/// MIME types accepted by the panel's file input.
pub const ACCEPTED_UPLOAD_MIME_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Image picked by the user, held in memory.
#[derive(Debug, Clone, Validate)]
pub struct SourceImage {
    #[garde(length(min = 1, max = 255))]
    pub file_name: String,

    #[garde(custom(accepted_mime))]
    pub mime_type: String,

    #[garde(length(min = 1))]
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn accepted_mime(value: &str, _ctx: &()) -> garde::Result {
    if ACCEPTED_UPLOAD_MIME_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(garde::Error::new(format!("unsupported image type: {}", value)))
    }
}

/// A selfie plus the profession the user wants to see themselves as.
#[derive(Debug, Clone, Validate)]
pub struct Submission {
    #[garde(length(min = 1, max = 100))]
    pub profession: String,

    #[garde(dive)]
    pub image: SourceImage,
}

impl Submission {
    pub fn new(profession: impl Into<String>, image: SourceImage) -> Self {
        Self {
            profession: profession.into(),
            image,
        }
    }
}
