//! Token artwork: `tokenURI` → metadata JSON → SVG → JPEG.

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use jpeg_encoder::{ColorType, Encoder};
use resvg::{tiny_skia, usvg};
use serde::Deserialize;

use crate::{
    chain::Chain,
    error::RenderError,
    interface::ContractHandle,
    types::{ImageBuffer, TokenId},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, id: TokenId) -> Result<ImageBuffer, RenderError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, svg: &[u8]) -> Result<Vec<u8>, RenderError>;
}

pub struct TokenRenderer {
    chain: Arc<dyn Chain>,
    token: ContractHandle,
    rasterizer: Arc<dyn Rasterizer>,
}

impl TokenRenderer {
    const TOKEN_URI: &'static str = "tokenURI";

    pub fn new(chain: Arc<dyn Chain>, token: ContractHandle, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            chain,
            token,
            rasterizer,
        }
    }
}

#[async_trait]
impl Renderer for TokenRenderer {
    async fn render(&self, id: TokenId) -> Result<ImageBuffer, RenderError> {
        let output = self
            .token
            .call(
                self.chain.as_ref(),
                Self::TOKEN_URI,
                &[DynSolValue::Uint(id.as_u256(), 256)],
            )
            .await?;
        let uri = output
            .first()
            .and_then(DynSolValue::as_str)
            .ok_or(RenderError::MissingUri(id))?;

        let svg = decode_token_uri(uri)?;
        Ok(self.rasterizer.rasterize(&svg)?.into())
    }
}

#[derive(Deserialize)]
struct Metadata {
    image: String,
}

/// Extracts the SVG markup from an on-chain metadata URI.
pub fn decode_token_uri(uri: &str) -> Result<Vec<u8>, RenderError> {
    let json = decode_data_uri(uri)?;
    let metadata: Metadata = serde_json::from_slice(&json)?;
    decode_data_uri(&metadata.image)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, RenderError> {
    let malformed = || RenderError::MalformedUri(uri.chars().take(48).collect());

    let rest = uri.strip_prefix("data:").ok_or_else(malformed)?;
    let (media_type, payload) = rest.split_once(',').ok_or_else(malformed)?;

    if media_type.ends_with(";base64") {
        Ok(BASE64.decode(payload.trim())?)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// resvg rasterizer producing a JPEG at the SVG's intrinsic size.
#[derive(Clone, Debug)]
pub struct SvgRasterizer {
    quality: u8,
}

impl SvgRasterizer {
    pub const DEFAULT_QUALITY: u8 = 100;

    pub fn new(quality: u8) -> Self {
        Self { quality }
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUALITY)
    }
}

impl Rasterizer for SvgRasterizer {
    fn rasterize(&self, svg: &[u8]) -> Result<Vec<u8>, RenderError> {
        let tree = usvg::Tree::from_data(svg, &usvg::Options::default())?;
        let size = tree.size().to_int_size();
        let unsupported = || RenderError::Size {
            width: size.width(),
            height: size.height(),
        };

        let width = u16::try_from(size.width()).map_err(|_| unsupported())?;
        let height = u16::try_from(size.height()).map_err(|_| unsupported())?;
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(unsupported)?;

        // JPEG has no alpha; flatten onto white.
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        let mut jpeg = Vec::new();
        Encoder::new(&mut jpeg, self.quality).encode(pixmap.data(), width, height, ColorType::Rgba)?;
        Ok(jpeg)
    }
}
