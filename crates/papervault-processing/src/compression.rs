//! Size optimization of accepted payloads.
//!
//! One [`Compressor`] per file kind. [`PayloadCompressor`] dispatches on kind
//! and enforces the keep-smaller rule: the stored payload is whichever of the
//! original and the re-encoded bytes is shorter, so compression never grows a
//! file. A payload that cannot be decoded is kept as submitted.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use papervault_core::FileKind;

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("Failed to decode payload: {0}")]
    Decode(String),

    #[error("Failed to encode payload: {0}")]
    Encode(String),

    #[error("Compression task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Output of a single compressor run, before the size comparison.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub data: Bytes,
    /// Set when the payload changed format
    pub content_type: Option<&'static str>,
    pub extension: Option<&'static str>,
}

#[async_trait]
pub trait Compressor: Send + Sync {
    fn kind(&self) -> FileKind;

    async fn compress(&self, data: Bytes) -> Result<Encoded, CompressionError>;
}

/// What the pipeline stores.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub data: Bytes,
    pub original_size: usize,
    /// True when the re-encoded payload replaced the original.
    pub compressed: bool,
    pub content_type: Option<&'static str>,
    pub extension: Option<&'static str>,
}

impl CompressionOutcome {
    fn unchanged(data: Bytes) -> Self {
        Self {
            original_size: data.len(),
            data,
            compressed: false,
            content_type: None,
            extension: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct PayloadCompressor {
    compressors: Vec<Arc<dyn Compressor>>,
}

impl PayloadCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compressor, replacing any earlier one for the same kind.
    pub fn with(mut self, compressor: impl Compressor + 'static) -> Self {
        let kind = compressor.kind();
        self.compressors.retain(|c| c.kind() != kind);
        self.compressors.push(Arc::new(compressor));
        self
    }

    /// Compressors for every kind compiled in.
    #[allow(unused_mut, unused_variables)]
    pub fn from_settings(max_width: u32, jpeg_quality: u8, pdf_enabled: bool) -> Self {
        let mut compressor = Self::new();
        #[cfg(feature = "image")]
        {
            compressor = compressor.with(ImageCompressor::new(max_width, jpeg_quality));
        }
        #[cfg(feature = "pdf")]
        {
            if pdf_enabled {
                compressor = compressor.with(PdfCompressor);
            }
        }
        compressor
    }

    pub async fn compress(&self, data: Bytes, kind: FileKind) -> CompressionOutcome {
        let Some(compressor) = self.compressors.iter().find(|c| c.kind() == kind) else {
            return CompressionOutcome::unchanged(data);
        };

        let original_size = data.len();
        let start = std::time::Instant::now();

        match compressor.compress(data.clone()).await {
            Ok(encoded) if encoded.data.len() < original_size => {
                tracing::debug!(
                    kind = %kind,
                    original_size,
                    compressed_size = encoded.data.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Payload compressed"
                );
                CompressionOutcome {
                    data: encoded.data,
                    original_size,
                    compressed: true,
                    content_type: encoded.content_type,
                    extension: encoded.extension,
                }
            }
            Ok(encoded) => {
                tracing::debug!(
                    kind = %kind,
                    original_size,
                    compressed_size = encoded.data.len(),
                    "Compressed payload not smaller, keeping original"
                );
                CompressionOutcome::unchanged(data)
            }
            Err(e) => {
                tracing::warn!(
                    kind = %kind,
                    original_size,
                    error = %e,
                    "Compression failed, keeping original"
                );
                CompressionOutcome::unchanged(data)
            }
        }
    }
}

#[cfg(feature = "image")]
pub use image_compressor::ImageCompressor;

#[cfg(feature = "image")]
mod image_compressor {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::imageops::FilterType;

    /// Downscale to a maximum width and re-encode as JPEG.
    #[derive(Debug, Clone, Copy)]
    pub struct ImageCompressor {
        max_width: u32,
        quality: u8,
    }

    impl ImageCompressor {
        pub fn new(max_width: u32, quality: u8) -> Self {
            Self {
                max_width: max_width.max(1),
                quality: quality.clamp(1, 100),
            }
        }

        fn reencode(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
            let img = image::load_from_memory(data)
                .map_err(|e| CompressionError::Decode(e.to_string()))?;

            // Never upscale; keep the aspect ratio
            let img = if img.width() > self.max_width {
                let height = (u64::from(img.height()) * u64::from(self.max_width)
                    / u64::from(img.width()))
                .max(1) as u32;
                img.resize_exact(self.max_width, height, FilterType::Lanczos3)
            } else {
                img
            };

            let rgb = img.to_rgb8();
            let mut out = Vec::new();
            let mut encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
            encoder
                .encode_image(&rgb)
                .map_err(|e| CompressionError::Encode(e.to_string()))?;
            Ok(out)
        }
    }

    #[async_trait]
    impl Compressor for ImageCompressor {
        fn kind(&self) -> FileKind {
            FileKind::Image
        }

        async fn compress(&self, data: Bytes) -> Result<Encoded, CompressionError> {
            let this = *self;
            // Decode and encode are CPU-bound
            let out = tokio::task::spawn_blocking(move || this.reencode(&data)).await??;
            Ok(Encoded {
                data: Bytes::from(out),
                content_type: Some("image/jpeg"),
                extension: Some("jpg"),
            })
        }
    }
}

#[cfg(feature = "pdf")]
pub use pdf_compressor::PdfCompressor;

#[cfg(feature = "pdf")]
mod pdf_compressor {
    use super::*;
    use lopdf::{dictionary, Document, Object, ObjectId};

    /// Attributes a page may inherit from its ancestors in the page tree.
    const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
    const MAX_TREE_DEPTH: usize = 64;

    /// Copies every page into a fresh page tree and catalog, drops whatever the
    /// new tree no longer references, and re-serializes with compressed streams.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PdfCompressor;

    fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
        let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
        let Ok(page) = doc.get_dictionary(page_id) else {
            return found;
        };

        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;
        while let Some(parent_id) = parent {
            if depth >= MAX_TREE_DEPTH {
                break;
            }
            let Ok(node) = doc.get_dictionary(parent_id) else {
                break;
            };
            for key in INHERITABLE {
                let missing = page.get(key).is_err() && !found.iter().any(|(k, _)| k == key);
                if missing {
                    if let Ok(value) = node.get(key) {
                        found.push((key.to_vec(), value.clone()));
                    }
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
        found
    }

    pub(super) fn copy_pages(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let mut doc =
            Document::load_mem(data).map_err(|e| CompressionError::Decode(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(CompressionError::Decode("encrypted PDF".to_string()));
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(CompressionError::Decode("PDF has no pages".to_string()));
        }

        let pages_id = doc.new_object_id();

        for &page_id in &page_ids {
            let inherited = inherited_attributes(&doc, page_id);
            let page = doc
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| CompressionError::Decode(e.to_string()))?;
            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", pages_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc.prune_objects();
        doc.renumber_objects();
        doc.compress();

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| CompressionError::Encode(e.to_string()))?;
        Ok(out)
    }

    #[async_trait]
    impl Compressor for PdfCompressor {
        fn kind(&self) -> FileKind {
            FileKind::Pdf
        }

        async fn compress(&self, data: Bytes) -> Result<Encoded, CompressionError> {
            let out = tokio::task::spawn_blocking(move || copy_pages(&data)).await??;
            Ok(Encoded {
                data: Bytes::from(out),
                content_type: None,
                extension: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct GrowingCompressor;

    #[async_trait]
    impl Compressor for GrowingCompressor {
        fn kind(&self) -> FileKind {
            FileKind::Other
        }

        async fn compress(&self, data: Bytes) -> Result<Encoded, CompressionError> {
            let mut grown = data.to_vec();
            grown.extend_from_slice(b"padding");
            Ok(Encoded {
                data: Bytes::from(grown),
                content_type: Some("application/octet-stream"),
                extension: None,
            })
        }
    }

    #[tokio::test]
    async fn test_larger_result_is_discarded() {
        let compressor = PayloadCompressor::new().with(GrowingCompressor);
        let original = Bytes::from_static(b"some payload");

        let outcome = compressor.compress(original.clone(), FileKind::Other).await;

        assert!(!outcome.compressed);
        assert_eq!(outcome.data, original);
        assert_eq!(outcome.content_type, None);
    }

    #[tokio::test]
    async fn test_kind_without_compressor_passes_through() {
        let compressor = PayloadCompressor::new();
        let original = Bytes::from_static(b"docx bytes");

        let outcome = compressor.compress(original.clone(), FileKind::Other).await;

        assert!(!outcome.compressed);
        assert_eq!(outcome.data, original);
        assert_eq!(outcome.original_size, original.len());
    }

    #[cfg(feature = "image")]
    mod image_tests {
        use super::*;
        use image::{DynamicImage, ImageFormat, RgbImage};
        use std::io::Cursor;

        fn noisy_png(width: u32, height: u32) -> Vec<u8> {
            let mut state: u32 = 0x1234_5678;
            let img = RgbImage::from_fn(width, height, |_, _| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                image::Rgb([state as u8, (state >> 8) as u8, (state >> 16) as u8])
            });
            let mut buf = Vec::new();
            DynamicImage::ImageRgb8(img)
                .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .unwrap();
            buf
        }

        #[tokio::test]
        async fn test_wide_image_is_resized_and_reencoded() {
            let png = noisy_png(1800, 1200);
            let compressor = PayloadCompressor::new().with(ImageCompressor::new(1200, 70));

            let outcome = compressor
                .compress(Bytes::from(png.clone()), FileKind::Image)
                .await;

            assert!(outcome.compressed);
            assert!(outcome.data.len() < png.len());
            assert_eq!(outcome.content_type, Some("image/jpeg"));
            assert_eq!(outcome.extension, Some("jpg"));

            let decoded = image::load_from_memory(&outcome.data).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (1200, 800));
        }

        #[tokio::test]
        async fn test_never_larger_than_original() {
            // A tiny low-quality JPEG only grows when re-encoded at quality 70
            let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([200, 10, 10])));
            let mut small = Vec::new();
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut small, 5);
            encoder.encode_image(&img.to_rgb8()).unwrap();

            let compressor = PayloadCompressor::new().with(ImageCompressor::new(1200, 70));
            let outcome = compressor
                .compress(Bytes::from(small.clone()), FileKind::Image)
                .await;

            assert!(outcome.data.len() <= small.len());
            if !outcome.compressed {
                assert_eq!(outcome.data.as_ref(), small.as_slice());
            }
        }

        #[tokio::test]
        async fn test_undecodable_image_is_kept() {
            let compressor = PayloadCompressor::new().with(ImageCompressor::new(1200, 70));
            let garbage = Bytes::from_static(b"definitely not an image");

            let outcome = compressor.compress(garbage.clone(), FileKind::Image).await;

            assert!(!outcome.compressed);
            assert_eq!(outcome.data, garbage);
        }
    }

    #[cfg(feature = "pdf")]
    mod pdf_tests {
        use super::*;
        use lopdf::content::{Content, Operation};
        use crate::compression::pdf_compressor::copy_pages;
        use lopdf::{dictionary, Document, Object, Stream};

        /// One page whose MediaBox and Resources live on the page tree root,
        /// with an uncompressed, repetitive content stream.
        fn sample_pdf(lines: usize) -> Vec<u8> {
            let mut doc = Document::with_version("1.5");
            let pages_id = doc.new_object_id();
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Courier",
            });
            let resources_id = doc.add_object(dictionary! {
                "Font" => dictionary! {
                    "F1" => font_id,
                },
            });

            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 800.into()]),
            ];
            for _ in 0..lines {
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal("Question 1: prove the lemma.")],
                ));
                operations.push(Operation::new("Td", vec![0.into(), (-1).into()]));
            }
            operations.push(Operation::new("ET", vec![]));
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            let pages = dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            };
            doc.objects.insert(pages_id, Object::Dictionary(pages));
            let catalog_id = doc.add_object(dictionary! {
                "Type" => "Catalog",
                "Pages" => pages_id,
            });
            doc.trailer.set("Root", catalog_id);

            let mut buf = Vec::new();
            doc.save_to(&mut buf).unwrap();
            buf
        }

        #[test]
        fn test_copy_pages_keeps_pages_and_inherited_attributes() {
            let out = copy_pages(&sample_pdf(5)).unwrap();

            let doc = Document::load_mem(&out).unwrap();
            let pages = doc.get_pages();
            assert_eq!(pages.len(), 1);

            let page_id = *pages.values().next().unwrap();
            let page = doc.get_dictionary(page_id).unwrap();
            assert!(page.get(b"MediaBox").is_ok());
            assert!(page.get(b"Resources").is_ok());
        }

        #[tokio::test]
        async fn test_pdf_pass_shrinks_uncompressed_streams() {
            let original = sample_pdf(400);
            let compressor = PayloadCompressor::new().with(PdfCompressor);

            let outcome = compressor
                .compress(Bytes::from(original.clone()), FileKind::Pdf)
                .await;

            assert!(outcome.compressed);
            assert!(outcome.data.len() < original.len());
            assert_eq!(outcome.content_type, None);
            assert_eq!(Document::load_mem(&outcome.data).unwrap().get_pages().len(), 1);
        }

        #[tokio::test]
        async fn test_corrupt_pdf_is_kept() {
            let compressor = PayloadCompressor::new().with(PdfCompressor);
            let broken = Bytes::from_static(b"%PDF-1.4\nthis is not really a pdf");

            let outcome = compressor.compress(broken.clone(), FileKind::Pdf).await;

            assert!(!outcome.compressed);
            assert_eq!(outcome.data, broken);
        }
    }
}
