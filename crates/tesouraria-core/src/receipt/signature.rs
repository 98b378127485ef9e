//! Signature images: where they come from and how they are decoded for
//! embedding.
//!
//! Sources are tried in order and the first one that yields decodable
//! bytes wins. Any failure along the way only skips that source.

use std::sync::Arc;

use async_trait::async_trait;
use image::{ColorType, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::ObjectStorage;

/// Where a signature image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureSource {
    /// The beneficiary's own stored signature.
    Beneficiary,
    /// Drawn on a signature pad for this document.
    Drawn,
    /// Uploaded as an image file for this document.
    Uploaded,
    /// The church's stored default signature.
    Church,
}

/// Signature images supplied with a generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureInput {
    #[serde(default)]
    pub drawn: Option<Vec<u8>>,
    #[serde(default)]
    pub uploaded: Option<Vec<u8>>,
}

/// Decoded pixel data ready to become an image XObject.
#[derive(Debug, Clone)]
pub(crate) enum ImagePayload {
    /// Uncompressed 8-bit samples, compressed with Flate on write.
    Raw {
        pixels: Vec<u8>,
        gray: bool,
        alpha: Option<Vec<u8>>,
    },
    /// Original JPEG bytes, embedded with DCTDecode.
    Jpeg { data: Vec<u8>, gray: bool },
}

/// A signature image that can be placed on a page.
#[derive(Debug, Clone)]
pub struct SignatureImage {
    pub width: u32,
    pub height: u32,
    pub(crate) payload: ImagePayload,
}

impl SignatureImage {
    /// Decode as PNG, then as JPEG. `None` if neither works.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match Self::from_png(bytes) {
            Ok(image) => Some(image),
            Err(png_err) => match Self::from_jpeg(bytes) {
                Ok(image) => Some(image),
                Err(jpeg_err) => {
                    debug!("Signature not decodable (png: {}, jpeg: {})", png_err, jpeg_err);
                    None
                }
            },
        }
    }

    fn from_png(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        let (width, height) = img.dimensions();

        let payload = match img.color() {
            ColorType::L8 | ColorType::L16 => ImagePayload::Raw {
                pixels: img.to_luma8().into_raw(),
                gray: true,
                alpha: None,
            },
            ColorType::La8 | ColorType::La16 => {
                let la = img.to_luma_alpha8();
                let mut pixels = Vec::with_capacity((width * height) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for p in la.pixels() {
                    pixels.push(p.0[0]);
                    alpha.push(p.0[1]);
                }
                ImagePayload::Raw {
                    pixels,
                    gray: true,
                    alpha: Some(alpha),
                }
            }
            color if color.has_alpha() => {
                let rgba = img.to_rgba8();
                let mut pixels = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for p in rgba.pixels() {
                    pixels.extend_from_slice(&p.0[..3]);
                    alpha.push(p.0[3]);
                }
                ImagePayload::Raw {
                    pixels,
                    gray: false,
                    alpha: Some(alpha),
                }
            }
            _ => ImagePayload::Raw {
                pixels: img.to_rgb8().into_raw(),
                gray: false,
                alpha: None,
            },
        };

        Ok(Self {
            width,
            height,
            payload,
        })
    }

    fn from_jpeg(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
        let (width, height) = img.dimensions();
        let gray = matches!(img.color(), ColorType::L8 | ColorType::L16);
        Ok(Self {
            width,
            height,
            payload: ImagePayload::Jpeg {
                data: bytes.to_vec(),
                gray,
            },
        })
    }

    /// Whether the image will be written as a JPEG.
    pub fn is_jpeg(&self) -> bool {
        matches!(self.payload, ImagePayload::Jpeg { .. })
    }
}

/// One place a signature might come from.
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    fn source(&self) -> SignatureSource;

    /// Image bytes, or `None` when this source has nothing.
    async fn try_resolve(&self) -> Option<Vec<u8>>;
}

/// Bytes supplied directly with the request.
pub struct InlineSignature {
    source: SignatureSource,
    bytes: Option<Vec<u8>>,
}

impl InlineSignature {
    pub fn new(source: SignatureSource, bytes: Option<Vec<u8>>) -> Self {
        Self { source, bytes }
    }
}

#[async_trait]
impl SignatureProvider for InlineSignature {
    fn source(&self) -> SignatureSource {
        self.source
    }

    async fn try_resolve(&self) -> Option<Vec<u8>> {
        self.bytes.clone().filter(|b| !b.is_empty())
    }
}

/// A signature stored at a known path.
pub struct StoredSignature {
    source: SignatureSource,
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
    path: Option<String>,
}

impl StoredSignature {
    pub fn new(
        source: SignatureSource,
        storage: Arc<dyn ObjectStorage>,
        bucket: impl Into<String>,
        path: Option<String>,
    ) -> Self {
        Self {
            source,
            storage,
            bucket: bucket.into(),
            path,
        }
    }
}

#[async_trait]
impl SignatureProvider for StoredSignature {
    fn source(&self) -> SignatureSource {
        self.source
    }

    async fn try_resolve(&self) -> Option<Vec<u8>> {
        let path = self.path.as_deref().filter(|p| !p.trim().is_empty())?;
        match self.storage.download(&self.bucket, path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Could not fetch signature {}: {}", path, e);
                None
            }
        }
    }
}

/// Folder holding a given owner's beneficiary signatures.
pub fn beneficiary_signature_folder(owner_id: &str) -> String {
    format!("assinaturas/{}/beneficiarios", owner_id)
}

/// A beneficiary's signature: the recorded path, else the newest upload
/// named after the beneficiary in the owner's signature folder.
pub struct BeneficiarySignature {
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
    owner_id: String,
    beneficiary_id: String,
    signature_path: Option<String>,
}

impl BeneficiarySignature {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        bucket: impl Into<String>,
        owner_id: impl Into<String>,
        beneficiary_id: impl Into<String>,
        signature_path: Option<String>,
    ) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
            owner_id: owner_id.into(),
            beneficiary_id: beneficiary_id.into(),
            signature_path,
        }
    }

    /// Path of the signature to use, if any.
    pub async fn locate(&self) -> Option<String> {
        if let Some(path) = self.signature_path.as_deref().filter(|p| !p.trim().is_empty()) {
            return Some(path.to_string());
        }

        let folder = beneficiary_signature_folder(&self.owner_id);
        let prefix = format!("{}-", self.beneficiary_id);
        let objects = match self.storage.list(&self.bucket, &folder).await {
            Ok(objects) => objects,
            Err(e) => {
                warn!("Could not list {}: {}", folder, e);
                return None;
            }
        };
        objects
            .into_iter()
            .find(|o| o.name.starts_with(&prefix))
            .map(|o| format!("{}/{}", folder, o.name))
    }
}

#[async_trait]
impl SignatureProvider for BeneficiarySignature {
    fn source(&self) -> SignatureSource {
        SignatureSource::Beneficiary
    }

    async fn try_resolve(&self) -> Option<Vec<u8>> {
        let path = self.locate().await?;
        match self.storage.download(&self.bucket, &path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Could not fetch beneficiary signature {}: {}", path, e);
                None
            }
        }
    }
}

/// Try each provider in order; the first decodable image wins.
pub async fn resolve_signature(
    providers: &[Box<dyn SignatureProvider>],
) -> Option<(SignatureSource, SignatureImage)> {
    for provider in providers {
        let Some(bytes) = provider.try_resolve().await else {
            continue;
        };
        match SignatureImage::decode(&bytes) {
            Some(image) => {
                debug!("Using {:?} signature ({}x{})", provider.source(), image.width, image.height);
                return Some((provider.source(), image));
            }
            None => warn!("Skipping {:?} signature: not a PNG or JPEG", provider.source()),
        }
    }
    None
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::store::MemoryStorage;

    #[test]
    fn test_decode_png_keeps_alpha() {
        let image = SignatureImage::decode(&png_rgba(4, 2)).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        match image.payload {
            ImagePayload::Raw { pixels, gray, alpha } => {
                assert!(!gray);
                assert_eq!(pixels.len(), 4 * 2 * 3);
                assert_eq!(alpha.unwrap(), vec![255, 0, 255, 0, 255, 0, 255, 0]);
            }
            ImagePayload::Jpeg { .. } => panic!("expected raw payload"),
        }
    }

    #[test]
    fn test_decode_falls_back_to_jpeg() {
        let image = SignatureImage::decode(&jpeg_gray(8, 8)).unwrap();
        assert!(image.is_jpeg());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(SignatureImage::decode(b"not an image").is_none());
    }

    #[tokio::test]
    async fn test_first_decodable_provider_wins() {
        let providers: Vec<Box<dyn SignatureProvider>> = vec![
            Box::new(InlineSignature::new(SignatureSource::Drawn, None)),
            Box::new(InlineSignature::new(SignatureSource::Uploaded, Some(b"garbage".to_vec()))),
            Box::new(InlineSignature::new(SignatureSource::Church, Some(png_rgba(2, 2)))),
        ];
        let (source, _) = resolve_signature(&providers).await.unwrap();
        assert_eq!(source, SignatureSource::Church);
    }

    #[tokio::test]
    async fn test_nothing_resolves() {
        let storage = Arc::new(MemoryStorage::default());
        let providers: Vec<Box<dyn SignatureProvider>> = vec![
            Box::new(InlineSignature::new(SignatureSource::Drawn, Some(Vec::new()))),
            Box::new(StoredSignature::new(SignatureSource::Church, storage, "Assinaturas", Some("missing.png".into()))),
        ];
        assert!(resolve_signature(&providers).await.is_none());
    }

    #[tokio::test]
    async fn test_beneficiary_lookup_by_prefix() {
        let storage = Arc::new(MemoryStorage::default());
        let folder = beneficiary_signature_folder("owner-1");
        storage.put("Assinaturas", &format!("{}/b1-100.png", folder), vec![1], "image/png");
        storage.put("Assinaturas", &format!("{}/b2-200.png", folder), vec![2], "image/png");
        storage.put("Assinaturas", &format!("{}/b1-300.png", folder), vec![3], "image/png");

        let lookup = BeneficiarySignature::new(storage.clone(), "Assinaturas", "owner-1", "b1", None);
        assert_eq!(lookup.locate().await, Some(format!("{}/b1-300.png", folder)));
        assert_eq!(lookup.try_resolve().await, Some(vec![3]));

        let explicit = BeneficiarySignature::new(storage, "Assinaturas", "owner-1", "b1", Some("x/y.png".into()));
        assert_eq!(explicit.locate().await.as_deref(), Some("x/y.png"));
    }
}
