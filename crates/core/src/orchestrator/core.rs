use std::{convert::Infallible, num::NonZeroU64, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    error::{Error, FatalError},
    orchestrator::{Captions, Iteration, Phase},
    publish::{self, Publisher},
    render::Renderer,
    settlement::SettlementLocator,
    types::{PublishPayload, Settlement, TokenId},
};

#[derive(Clone, Copy, Debug)]
pub struct Schedule {
    pub interval: Duration,
    /// Ids divisible by this were minted directly rather than auctioned.
    pub reserved_modulus: Option<NonZeroU64>,
}

/// Walks auction ids in order and posts each settlement exactly once.
pub struct Orchestrator {
    locator: Arc<dyn SettlementLocator>,
    renderer: Arc<dyn Renderer>,
    publisher: Arc<dyn Publisher>,
    captions: Captions,
    schedule: Schedule,
    cursor: TokenId,
    phase: Phase,
}

impl Orchestrator {
    pub fn new(
        locator: Arc<dyn SettlementLocator>,
        renderer: Arc<dyn Renderer>,
        publisher: Arc<dyn Publisher>,
        captions: Captions,
        schedule: Schedule,
        start: TokenId,
    ) -> Self {
        Self {
            locator,
            renderer,
            publisher,
            captions,
            schedule,
            cursor: start,
            phase: Phase::Idle,
        }
    }

    pub fn cursor(&self) -> TokenId {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs until a locator or renderer failure.
    pub async fn run(mut self) -> Result<Infallible, FatalError> {
        info!(start = %self.cursor, interval = ?self.schedule.interval, "reconciliation started");
        loop {
            self.step().await?;
            self.enter(Phase::Waiting);
            sleep(self.schedule.interval).await;
            self.enter(Phase::Idle);
        }
    }

    /// One reconciliation of the id under the cursor, without the trailing sleep.
    pub async fn step(&mut self) -> Result<Iteration, FatalError> {
        let id = self.cursor;
        self.enter(Phase::Reconciling);

        let caption = if self.is_reserved(id) {
            self.captions.direct_mint(id)
        } else {
            let settlement = self
                .locator
                .find_settlement(id)
                .await
                .map_err(|err| FatalError {
                    id,
                    source: err.into(),
                })?;
            match settlement {
                Settlement::Settled(record) => self.captions.settled(&record),
                Settlement::NotYetOccurred => {
                    info!(%id, "polled");
                    return Ok(Iteration::Pending { id });
                }
            }
        };

        self.enter(Phase::Publishing);
        let image = self.renderer.render(id).await.map_err(|err| FatalError {
            id,
            source: err.into(),
        })?;
        let payload = PublishPayload { image, caption };

        let iteration = match publish::publish_photo(self.publisher.as_ref(), &payload).await {
            Ok(()) => {
                info!(%id, caption = %payload.caption, "posted");
                Iteration::Published {
                    id,
                    caption: payload.caption,
                }
            }
            Err(error) => {
                warn!(%id, %error, "post failed, moving on");
                Iteration::PublishFailed { id, error }
            }
        };

        self.cursor = id.next().ok_or(FatalError {
            id,
            source: Error::CursorExhausted,
        })?;
        Ok(iteration)
    }

    fn is_reserved(&self, id: TokenId) -> bool {
        self.schedule
            .reserved_modulus
            .is_some_and(|modulus| id.is_multiple_of(modulus))
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, cursor = %self.cursor, "phase");
        self.phase = phase;
    }
}
