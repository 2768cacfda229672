pub mod http;

use async_trait::async_trait;

use crate::{
    error::{PublishAction, PublishError},
    types::{ImageBuffer, PublishPayload, PublishStatus},
};

pub use http::{Credentials, HttpSession};

/// An authenticated account session. Implementations are shared between the
/// reconciliation loop and the mint listener and must tolerate interleaved calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish_photo(
        &self,
        image: &ImageBuffer,
        caption: &str,
    ) -> Result<PublishStatus, PublishError>;

    async fn change_profile_picture(&self, image: &ImageBuffer) -> Result<PublishStatus, PublishError>;

    async fn publish_story(
        &self,
        image: &ImageBuffer,
        caption: &str,
    ) -> Result<PublishStatus, PublishError>;
}

pub async fn publish_photo(
    publisher: &dyn Publisher,
    payload: &PublishPayload,
) -> Result<(), PublishError> {
    publisher
        .publish_photo(&payload.image, &payload.caption)
        .await?
        .into_result(PublishAction::Photo)
}

pub async fn change_profile_picture(
    publisher: &dyn Publisher,
    image: &ImageBuffer,
) -> Result<(), PublishError> {
    publisher
        .change_profile_picture(image)
        .await?
        .into_result(PublishAction::ProfilePicture)
}

pub async fn publish_story(
    publisher: &dyn Publisher,
    payload: &PublishPayload,
) -> Result<(), PublishError> {
    publisher
        .publish_story(&payload.image, &payload.caption)
        .await?
        .into_result(PublishAction::Story)
}
