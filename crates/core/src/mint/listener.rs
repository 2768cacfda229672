use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinSet};
use tracing::{error, info};

use crate::{
    error::{PublishError, RenderError},
    orchestrator::Captions,
    publish::{self, Publisher},
    render::Renderer,
    types::{PublishPayload, TokenId},
};

/// Results of the two independent posts made for one mint.
#[derive(Debug)]
pub struct MintOutcome {
    pub profile_picture: Result<(), PublishError>,
    pub story: Result<(), PublishError>,
}

pub struct MintListener {
    renderer: Arc<dyn Renderer>,
    publisher: Arc<dyn Publisher>,
    captions: Captions,
}

impl MintListener {
    pub fn new(renderer: Arc<dyn Renderer>, publisher: Arc<dyn Publisher>, captions: Captions) -> Self {
        Self {
            renderer,
            publisher,
            captions,
        }
    }

    /// Handles every notification concurrently. Returns once the channel is
    /// closed and all handlers have finished.
    pub async fn run(self, mut mints: mpsc::Receiver<TokenId>) {
        let listener = Arc::new(self);
        let mut handlers = JoinSet::new();

        loop {
            tokio::select! {
                Some(id) = mints.recv() => {
                    let listener = Arc::clone(&listener);
                    handlers.spawn(async move { listener.react(id).await });
                }
                Some(joined) = handlers.join_next() => {
                    if let Err(err) = joined {
                        error!(%err, "mint handler aborted");
                    }
                }
                else => break,
            }
        }
        info!("mint listener stopped");
    }

    pub async fn handle(&self, id: TokenId) -> Result<MintOutcome, RenderError> {
        let image = self.renderer.render(id).await?;

        let profile_picture = publish::change_profile_picture(self.publisher.as_ref(), &image).await;
        match &profile_picture {
            Ok(()) => info!(%id, "profile picture changed"),
            Err(err) => error!(%id, %err, "profile picture not changed"),
        }

        let payload = PublishPayload {
            image,
            caption: self.captions.story(id),
        };
        let story = publish::publish_story(self.publisher.as_ref(), &payload).await;
        match &story {
            Ok(()) => info!(%id, "story posted"),
            Err(err) => error!(%id, %err, "story not posted"),
        }

        Ok(MintOutcome {
            profile_picture,
            story,
        })
    }

    async fn react(&self, id: TokenId) {
        if let Err(err) = self.handle(id).await {
            error!(%id, %err, "minted token could not be rendered");
        }
    }
}
