use image::ImageError;
use qr_core::error::{QrDecodeError, QrEncodeError};
use thiserror::Error;

/// Failure modes for PNG rendering, loading and the `fix` façade.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QrPngError {
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    #[error("encode error: {0}")]
    Encode(#[from] QrEncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] QrDecodeError),

    #[error("no QR Code symbol could be located in the image")]
    NoSymbolFound,
}
