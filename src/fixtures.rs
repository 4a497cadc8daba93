use uuid::Uuid;

/// Upper bound the backend enforces on material uploads.
pub const MAX_UPLOAD_BYTES: usize = 30 * 1024 * 1024;

/// An in-memory file to upload as a material. The content only needs to
/// carry the right magic bytes; the backend sniffs the MIME type.
pub struct FileFixture {
    pub filename: &'static str,
    pub mime: &'static str,
    pub content: &'static [u8],
}

/// Every format the backend accepts for file materials.
pub const SUPPORTED_FORMATS: &[FileFixture] = &[
    FileFixture {
        filename: "sample.txt",
        mime: "text/plain",
        content: b"Text content",
    },
    FileFixture {
        filename: "sample.pdf",
        mime: "application/pdf",
        content: b"%PDF-1.4",
    },
    FileFixture {
        filename: "sample.png",
        mime: "image/png",
        content: &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
    },
    FileFixture {
        filename: "sample.jpg",
        mime: "image/jpeg",
        content: &[0xFF, 0xD8, 0xFF],
    },
    FileFixture {
        filename: "sample.jpeg",
        mime: "image/jpeg",
        content: &[0xFF, 0xD8, 0xFF],
    },
    FileFixture {
        filename: "sample.gif",
        mime: "image/gif",
        content: b"GIF89a",
    },
    FileFixture {
        filename: "sample.mp3",
        mime: "audio/mpeg",
        content: b"ID3",
    },
    FileFixture {
        filename: "sample.mp4",
        mime: "video/mp4",
        content: &[0x00, 0x00, 0x00, 0x18],
    },
    FileFixture {
        filename: "sample.docx",
        mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        content: b"PK",
    },
];

/// A payload the backend must refuse on MIME type alone.
pub const UNSUPPORTED_EXECUTABLE: FileFixture = FileFixture {
    filename: "payload.exe",
    mime: "application/x-msdownload",
    content: b"MZ",
};

/// A blob just past the upload cap.
pub fn oversized_payload() -> Vec<u8> {
    vec![0; MAX_UPLOAD_BYTES + 1024 * 1024]
}

/// The backend assigns v4 UUIDs to every created resource.
pub fn is_uuid_v4(candidate: &str) -> bool {
    Uuid::parse_str(candidate)
        .map(|id| id.get_version_num() == 4)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_v4_uuids() {
        assert!(is_uuid_v4(&Uuid::new_v4().to_string()));
    }

    #[test]
    fn rejects_non_v4_uuids() {
        assert!(!is_uuid_v4(&Uuid::nil().to_string()));
        assert!(!is_uuid_v4("not-a-uuid"));
        assert!(!is_uuid_v4(""));
    }

    #[test]
    fn oversized_payload_exceeds_cap() {
        assert!(oversized_payload().len() > MAX_UPLOAD_BYTES);
    }

    #[test]
    fn fixture_filenames_are_unique() {
        let mut names: Vec<_> = SUPPORTED_FORMATS.iter().map(|f| f.filename).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SUPPORTED_FORMATS.len());
    }
}
