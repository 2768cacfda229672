use alloy::primitives::Bytes;

use crate::error::{PublishAction, PublishError};

/// Encoded JPEG ready for upload.
pub type ImageBuffer = Bytes;

#[derive(Clone, Debug)]
pub struct PublishPayload {
    pub image: ImageBuffer,
    pub caption: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishStatus(String);

impl PublishStatus {
    pub const OK: &'static str = "ok";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn ok() -> Self {
        Self::new(Self::OK)
    }

    pub fn is_ok(&self) -> bool {
        self.0 == Self::OK
    }

    pub fn into_result(self, action: PublishAction) -> Result<(), PublishError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(PublishError::Rejected {
                action,
                status: self.0,
            })
        }
    }
}
