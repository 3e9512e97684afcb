//! High-level scale interface

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use scalewire_core::{Protocol, Weight};
use scalewire_transport::Transport;
use scalewire_types::{ConnectionConfig, Reading, TransportConfig};

use crate::error::{Error, Result};
use crate::link::Link;
use crate::monitor::{MonitorHandle, PollState, Poller};

/// Readings buffered per subscriber before the oldest are dropped
const EVENT_CAPACITY: usize = 64;

/// Electronic weighing scale
///
/// Owns one link to the scale. While connected, a background task polls the
/// scale whenever monitoring is on; [`Scale::read_once`] takes a manual
/// reading. Every result, polled or manual, is published to subscribers
/// (see [`Scale::subscribe`]).
///
/// # Examples
///
/// ```no_run
/// use scalewire::{Protocol, Scale, TransportConfig};
///
/// #[tokio::main]
/// async fn main() -> scalewire::Result<()> {
///     let mut scale = Scale::new(TransportConfig::tcp("192.168.1.40", 9100))
///         .with_protocol(Protocol::Filizola);
///
///     scale.connect().await?;
///
///     let weight = scale.read_once().await?;
///     println!("Weight: {} kg", weight);
///
///     scale.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Scale {
    config: ConnectionConfig,
    monitor: MonitorHandle,
    events: broadcast::Sender<Reading>,
    connection: Option<Connection>,
}

/// Everything that exists only while connected
struct Connection {
    link: Arc<Mutex<Link>>,
    cancel: CancellationToken,
    poller: JoinHandle<()>,
}

impl Scale {
    /// Create a disconnected scale with default settings
    pub fn new(transport: TransportConfig) -> Self {
        Self::from_config(ConnectionConfig::new(transport))
    }

    pub fn from_config(config: ConnectionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let monitor = MonitorHandle::new(config.monitoring, config.monitor_delay());

        Self {
            config,
            monitor,
            events,
            connection: None,
        }
    }

    /// Set protocol (builder form of [`Scale::set_protocol`])
    ///
    /// Meant for setup. On a connected scale the protocol is left unchanged
    /// and a warning is logged.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        if let Err(e) = self.set_protocol(protocol) {
            warn!("Ignoring protocol change: {}", e);
        }
        self
    }

    /// Enable or disable monitoring
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.set_monitoring(enabled);
        self
    }

    /// Set delay between polls
    pub fn with_monitor_delay(mut self, delay: Duration) -> Self {
        self.set_monitor_delay(delay);
        self
    }

    /// Current settings
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn protocol(&self) -> Protocol {
        self.config.protocol
    }

    /// Change protocol
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolLocked`] while connected, even when `protocol`
    /// is the one already in use.
    pub fn set_protocol(&mut self, protocol: Protocol) -> Result<()> {
        if self.is_connected() {
            return Err(Error::ProtocolLocked {
                current: self.config.protocol,
                requested: protocol,
            });
        }

        self.config.protocol = protocol;
        Ok(())
    }

    /// Replace link settings, used by the next [`Scale::connect`]
    pub fn set_transport(&mut self, transport: TransportConfig) {
        self.config.transport = transport;
    }

    /// Check if monitoring is on
    ///
    /// Reads false while a manual read is in progress.
    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_monitoring()
    }

    /// Enable or disable monitoring; allowed at any time
    pub fn set_monitoring(&mut self, enabled: bool) {
        self.config.monitoring = enabled;
        self.monitor.set_monitoring(enabled);
    }

    pub fn monitor_delay(&self) -> Duration {
        self.monitor.delay()
    }

    pub fn set_monitor_delay(&mut self, delay: Duration) {
        self.config.monitor_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.monitor.set_delay(delay);
    }

    /// Shared monitoring controls, usable from other tasks
    pub fn monitor(&self) -> MonitorHandle {
        self.monitor.clone()
    }

    /// Get poll task state
    pub fn poll_state(&self) -> PollState {
        self.monitor.state()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Receive every reading from now on
    ///
    /// A subscriber that falls behind by more than 64 readings loses the oldest
    /// ones and sees [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Reading> {
        self.events.subscribe()
    }

    /// Weight from the most recent read cycle, `None` when disconnected
    pub async fn last_weight(&self) -> Option<Weight> {
        let connection = self.connection.as_ref()?;
        let link = connection.link.lock().await;
        Some(link.last_weight())
    }

    /// Raw response from the most recent read cycle, `None` when disconnected
    pub async fn last_response(&self) -> Option<String> {
        let connection = self.connection.as_ref()?;
        let link = connection.link.lock().await;
        Some(link.last_response().to_string())
    }

    /// Connect using the configured link settings
    ///
    /// Serial port handshake is always switched off before opening.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyConnected`] if connected
    /// - [`Error::Types`] if the link settings are invalid
    /// - [`Error::Transport`] if the port or socket cannot be opened
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        self.config.transport.disable_port_control();
        self.config.transport.validate()?;

        let transport = scalewire_transport::from_config(&self.config.transport);
        self.connect_with(transport).await
    }

    /// Connect over a caller-supplied transport
    ///
    /// Opens the transport and starts the poll task. Must be called inside a
    /// Tokio runtime.
    pub async fn connect_with(&mut self, mut transport: Box<dyn Transport>) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        info!(
            "Connecting to {} ({} protocol)...",
            transport.remote_addr(),
            self.config.protocol
        );

        if !transport.is_connected() {
            transport.open().await?;
        }

        let link = Arc::new(Mutex::new(Link::new(transport, self.config.protocol)));
        let cancel = CancellationToken::new();

        self.monitor.set_state(PollState::Polling);
        let poller = Poller {
            link: Arc::clone(&link),
            monitor: self.monitor.clone(),
            events: self.events.clone(),
            cancel: cancel.clone(),
        }
        .spawn();

        self.connection = Some(Connection {
            link,
            cancel,
            poller,
        });

        info!("Connected (monitoring: {})", self.is_monitoring());
        Ok(())
    }

    /// Stop the poll task and close the link
    ///
    /// Waits for a read already in progress to finish. The scale counts as
    /// disconnected even if closing the transport fails.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if not connected
    /// - [`Error::Transport`] if closing the link fails
    pub async fn disconnect(&mut self) -> Result<()> {
        let connection = self.connection.take().ok_or(Error::NotConnected)?;

        debug!("Stopping poll task...");
        self.monitor.set_state(PollState::Cancelling);
        connection.cancel.cancel();

        let result = {
            let mut link = connection.link.lock().await;
            info!("Disconnecting from {}...", link.remote_addr());
            link.close().await
        };

        if let Err(e) = connection.poller.await {
            warn!("Poll task ended abnormally: {}", e);
        }
        self.monitor.set_state(PollState::Idle);

        result?;
        info!("Disconnected");
        Ok(())
    }

    /// Take one manual reading
    ///
    /// Monitoring is paused for the duration and restored afterwards, whatever
    /// the outcome. Toledo scales are read once; Filizola scales are re-read
    /// until stable, for up to 3 seconds. The reading is also published to
    /// subscribers.
    ///
    /// A failed read is not an error here: it returns [`Weight::READ_FAILED`]
    /// and publishes an error reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if not connected.
    pub async fn read_once(&self) -> Result<Weight> {
        let connection = self.connection.as_ref().ok_or(Error::NotConnected)?;

        let _pause = self.monitor.pause();
        let mut link = connection.link.lock().await;

        let outcome = link.read_weight().await;
        if let Err(e) = &outcome {
            warn!("Manual read from {} failed: {}", link.remote_addr(), e);
        }

        let reading = link.reading(&outcome);
        let weight = link.last_weight();
        drop(link);

        debug!("{}", reading);
        // No subscribers is fine
        let _ = self.events.send(reading);

        Ok(weight)
    }
}

impl Drop for Scale {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        connection.cancel.cancel();
        self.monitor.set_state(PollState::Cancelling);

        // Close in the background when a runtime is still around
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let link = connection.link;
                runtime.spawn(async move {
                    if let Err(e) = link.lock().await.close().await {
                        debug!("Close on drop failed: {}", e);
                    }
                });
            }
            Err(_) => warn!("Scale dropped while connected outside a runtime"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_new() {
        let scale = Scale::new(TransportConfig::serial("/dev/ttyUSB0"));

        assert!(!scale.is_connected());
        assert_eq!(scale.protocol(), Protocol::Toledo);
        assert_eq!(scale.poll_state(), PollState::Idle);
    }

    #[test]
    fn test_builder_settings() {
        let scale = Scale::new(TransportConfig::tcp("10.0.0.40", 9100))
            .with_protocol(Protocol::Filizola)
            .with_monitoring(false)
            .with_monitor_delay(Duration::from_millis(50));

        assert_eq!(scale.protocol(), Protocol::Filizola);
        assert!(!scale.is_monitoring());
        assert!(!scale.config().monitoring);
        assert_eq!(scale.monitor_delay(), Duration::from_millis(50));
        assert_eq!(scale.config().monitor_delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_protocol_changes_while_disconnected() {
        let mut scale = Scale::new(TransportConfig::serial("COM1"));

        scale.set_protocol(Protocol::Filizola).unwrap();
        assert_eq!(scale.protocol(), Protocol::Filizola);
    }

    #[tokio::test]
    async fn test_disconnected_operations() {
        let mut scale = Scale::new(TransportConfig::serial("COM1"));

        assert!(matches!(scale.read_once().await, Err(Error::NotConnected)));
        assert!(matches!(scale.disconnect().await, Err(Error::NotConnected)));
        assert_eq!(scale.last_weight().await, None);
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_settings() {
        let mut scale = Scale::new(TransportConfig::serial(""));

        let result = scale.connect().await;
        assert!(matches!(result, Err(Error::Types(_))));
        assert!(!scale.is_connected());
    }
}
