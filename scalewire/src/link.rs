//! One open scale link and the read cycles it runs

use tokio::time::{sleep, Instant};
use tracing::{debug, trace, warn};

use scalewire_core::constants::{SETTLE_TIME, STABLE_WAIT};
use scalewire_core::{Protocol, Weight};
use scalewire_transport::Transport;
use scalewire_types::Reading;

use crate::error::Result;

/// Open transport paired with the protocol that decodes it
///
/// Also remembers the last raw response and weight, which are what a
/// read cycle reports once it finishes.
pub(crate) struct Link {
    transport: Box<dyn Transport>,
    protocol: Protocol,
    last_response: String,
    last_weight: Weight,
}

impl Link {
    pub fn new(transport: Box<dyn Transport>, protocol: Protocol) -> Self {
        Self {
            transport,
            protocol,
            last_response: String::new(),
            last_weight: Weight::ZERO,
        }
    }

    pub fn last_weight(&self) -> Weight {
        self.last_weight
    }

    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    pub fn remote_addr(&self) -> String {
        self.transport.remote_addr()
    }

    /// Drop stale input and send the weight request
    pub async fn request_weight(&mut self) -> Result<()> {
        trace!("{} weight request to {}", self.protocol, self.transport.remote_addr());

        self.transport.clear_input().await?;
        self.transport.write(self.protocol.request()).await?;

        Ok(())
    }

    /// Read whatever the scale sent and decode it
    ///
    /// Resets the last response and weight first. Any failure leaves the
    /// weight at [`Weight::READ_FAILED`].
    pub async fn read_frame(&mut self) -> Result<Weight> {
        self.last_response.clear();
        self.last_weight = Weight::ZERO;

        match self.read_and_decode().await {
            Ok(weight) => {
                self.last_weight = weight;
                Ok(weight)
            }
            Err(e) => {
                self.last_weight = Weight::READ_FAILED;
                Err(e)
            }
        }
    }

    async fn read_and_decode(&mut self) -> Result<Weight> {
        let bytes = self.transport.read().await?;
        self.last_response = String::from_utf8_lossy(&bytes).into_owned();

        let weight = self.protocol.decode(&self.last_response)?;
        debug!("Received {:?} -> {}", self.last_response, weight);

        Ok(weight)
    }

    /// Request, wait for the scale to answer, read once
    pub async fn read_simple(&mut self) -> Result<Weight> {
        self.request_weight().await?;
        sleep(SETTLE_TIME).await;
        self.read_frame().await
    }

    /// Keep reading until the scale reports something other than unstable
    ///
    /// Gives up after [`STABLE_WAIT`] and returns the unstable sentinel. With
    /// `resend` each attempt re-requests and waits [`SETTLE_TIME`]; without it
    /// the loop just reads again.
    pub async fn await_stable_weight(&mut self, resend: bool) -> Result<Weight> {
        let deadline = Instant::now() + STABLE_WAIT;
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            if resend {
                self.request_weight().await?;
                sleep(SETTLE_TIME).await;
            } else {
                tokio::task::yield_now().await;
            }

            let weight = self.read_frame().await?;
            if !weight.is_unstable() {
                if attempts > 1 {
                    debug!("Scale settled after {} attempts", attempts);
                }
                return Ok(weight);
            }

            if Instant::now() >= deadline {
                warn!(
                    "Scale still unstable after {:?} ({} attempts)",
                    STABLE_WAIT, attempts
                );
                return Ok(weight);
            }
        }
    }

    /// Manual read, driven the way the protocol needs
    pub async fn read_weight(&mut self) -> Result<Weight> {
        if self.protocol.waits_for_stable() {
            self.await_stable_weight(true).await
        } else {
            self.read_simple().await
        }
    }

    /// Package the outcome of a cycle for subscribers
    pub fn reading(&self, outcome: &Result<Weight>) -> Reading {
        match outcome {
            Ok(weight) => Reading::weight(self.last_response.clone(), *weight),
            Err(e) => Reading::error(self.last_response.clone(), e.to_read_error()),
        }
    }

    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await?;
        Ok(())
    }
}
