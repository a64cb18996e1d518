// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session lifecycle management.
//!
//! Owns the connection state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Starting -> Active -> Closing -> Disconnected
//! ```
//!
//! Per established connection there are two background tasks sharing the
//! serialized writer: the reader (sole parser of inbound bytes, feeds the
//! dispatcher) and the keepalive timer (emits `KeepAlive` every interval,
//! sweeps request deadlines, detects stalled connections). A supervisor
//! task reacts to transport loss and, when configured, reconnects with
//! exponential backoff and re-installs the PDO subscription set before the
//! session goes Active again.

use crate::config::BridgeConfig;
use crate::dispatch::{AlarmHandler, Correlator, Dispatcher, SessionEvent};
use crate::error::{Error, GatewayError, RequestError, SessionError};
use crate::frame::Frame;
use crate::pdo::{Consumer, PdoRegistry, PdoType};
use crate::proto::{
    CloseSessionRequest, CnRpdoRequest, DeregisterAppRequest, KeepAlive, OperationPayload,
    OperationType, RegisterAppRequest, StartSessionRequest,
};
use crate::transport::{self, Connection};
use crate::util::Uuid;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Subscription lease meaning "forever".
const RPDO_TIMEOUT_FOREVER: u32 = u32::MAX;

/// Subscription lease meaning "cancel".
const RPDO_TIMEOUT_CANCEL: u32 = 0;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Starting,
    Active,
    Closing,
}

/// One logical session with a bridge.
pub struct Session {
    core: Arc<Core>,
}

struct Core {
    host: String,
    bridge_uuid: Uuid,
    local_uuid: Uuid,
    config: BridgeConfig,

    state: Mutex<SessionState>,
    correlator: Arc<Correlator>,
    registry: Arc<PdoRegistry>,
    conn: Mutex<Option<Arc<Connection>>>,
    last_rx: Mutex<Instant>,
    alarm_handler: Mutex<Option<AlarmHandler>>,

    /// True while a user-initiated disconnect is in progress; suppresses
    /// the reconnect policy.
    closing: AtomicBool,

    /// Reader + keepalive handles for the current connection.
    tasks: Mutex<Vec<JoinHandle<()>>>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a session bound to one bridge instance.
    pub fn new(
        host: impl Into<String>,
        bridge_uuid: Uuid,
        local_uuid: Uuid,
        config: BridgeConfig,
    ) -> Result<Self, Error> {
        config
            .validate()
            .map_err(SessionError::Protocol)?;

        Ok(Self {
            core: Arc::new(Core {
                host: host.into(),
                bridge_uuid,
                local_uuid,
                config,
                state: Mutex::new(SessionState::Disconnected),
                correlator: Correlator::new(),
                registry: Arc::new(PdoRegistry::new()),
                conn: Mutex::new(None),
                last_rx: Mutex::new(Instant::now()),
                alarm_handler: Mutex::new(None),
                closing: AtomicBool::new(false),
                tasks: Mutex::new(Vec::new()),
                supervisor: Mutex::new(None),
            }),
        })
    }

    pub fn state(&self) -> SessionState {
        self.core.state()
    }

    pub fn is_connected(&self) -> bool {
        self.core.state() == SessionState::Active
    }

    pub fn host(&self) -> &str {
        &self.core.host
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.core.config
    }

    pub fn bridge_uuid(&self) -> Uuid {
        self.core.bridge_uuid
    }

    pub fn local_uuid(&self) -> Uuid {
        self.core.local_uuid
    }

    /// Install the alarm notification handler.
    pub fn set_alarm_handler(&self, handler: Option<AlarmHandler>) {
        *self
            .core
            .alarm_handler
            .lock()
            .expect("alarm handler poisoned") = handler;
    }

    /// Number of requests currently in flight.
    pub fn in_flight(&self) -> usize {
        self.core.correlator.in_flight()
    }

    /// Open the connection and start the session.
    ///
    /// With `take_over`, an existing session held by another app is
    /// displaced. Fails with [`SessionError::NotRegistered`] when the
    /// bridge does not know our UUID. If the returned future is dropped
    /// mid-handshake, call [`Session::disconnect`] to release the socket.
    pub async fn connect(&self, take_over: bool) -> Result<(), Error> {
        if self.core.state() != SessionState::Disconnected {
            return Err(SessionError::Protocol("already connected".into()).into());
        }
        self.core.closing.store(false, Ordering::SeqCst);

        let events = self.core.establish(take_over).await?;

        let core = Arc::clone(&self.core);
        let supervisor = tokio::spawn(supervise(core, events, take_over));
        *self
            .core
            .supervisor
            .lock()
            .expect("supervisor slot poisoned") = Some(supervisor);

        Ok(())
    }

    /// Close the session and tear down the connection.
    pub async fn disconnect(&self) {
        self.core.closing.store(true, Ordering::SeqCst);

        if let Some(supervisor) = self
            .core
            .supervisor
            .lock()
            .expect("supervisor slot poisoned")
            .take()
        {
            supervisor.abort();
        }

        if self.core.state() == SessionState::Active {
            self.core.set_state(SessionState::Closing);
            let _ = self
                .core
                .send_no_reply(
                    OperationType::CloseSessionRequest,
                    OperationPayload::CloseSessionRequest(CloseSessionRequest {}),
                )
                .await;
        }

        self.core.abort_tasks();
        self.core.drop_connection().await;
        self.core
            .correlator
            .fail_all(|| RequestError::SessionClosed.into());
        self.core.set_state(SessionState::Disconnected);
        debug!(host = %self.core.host, "disconnected");
    }

    /// Send a request and await its confirm.
    pub async fn request(
        &self,
        op: OperationType,
        payload: OperationPayload,
    ) -> Result<Frame, Error> {
        self.core.ensure_active()?;
        self.core.request(op, payload).await
    }

    /// Send a fire-and-forget operation (keepalive, close-session).
    pub async fn send_no_reply(
        &self,
        op: OperationType,
        payload: OperationPayload,
    ) -> Result<(), Error> {
        self.core.ensure_active()?;
        self.core.send_no_reply(op, payload).await
    }

    /// Register this app's UUID with the bridge.
    ///
    /// Runs over its own short-lived connection, so it works while the
    /// session is Disconnected (the usual case: `connect` just failed
    /// with [`SessionError::NotRegistered`]). `Confirm(ok)` and
    /// `Confirm(already-registered)` both count as success; a wrong PIN
    /// surfaces as [`GatewayError::NotAllowed`].
    pub async fn register_app(&self, device_name: &str, pin: u32) -> Result<(), Error> {
        if self.core.state() != SessionState::Disconnected {
            return Err(SessionError::Protocol("already connected".into()).into());
        }

        self.core.set_state(SessionState::Connecting);
        let result = match self.core.open_transport().await {
            Ok(_) => {
                self.core
                    .request(
                        OperationType::RegisterAppRequest,
                        OperationPayload::RegisterAppRequest(RegisterAppRequest {
                            uuid: Some(self.core.local_uuid.to_vec()),
                            pin: Some(pin),
                            devicename: Some(device_name.to_string()),
                        }),
                    )
                    .await
                    .map(drop)
            }
            Err(e) => Err(e),
        };

        self.core.abort_tasks();
        self.core.drop_connection().await;
        self.core
            .correlator
            .fail_all(|| RequestError::SessionClosed.into());
        self.core.set_state(SessionState::Disconnected);
        result
    }

    /// Remove an app registration by exact UUID match.
    pub async fn deregister_app(&self, app_uuid: Uuid) -> Result<(), Error> {
        if app_uuid == self.core.local_uuid {
            return Err(RequestError::Invalid("refusing to deregister ourselves".into()).into());
        }
        self.request(
            OperationType::DeregisterAppRequest,
            OperationPayload::DeregisterAppRequest(DeregisterAppRequest {
                uuid: Some(app_uuid.to_vec()),
            }),
        )
        .await
        .map(drop)
    }

    /// Subscribe to a PDO stream.
    ///
    /// A subscription that already exists for `pdid` is replaced. The
    /// consumer runs on the reader task and must not block; enable `dedup`
    /// to suppress consecutive identical values.
    pub async fn subscribe(
        &self,
        pdid: u32,
        pdo_type: PdoType,
        dedup: bool,
        consumer: Consumer,
    ) -> Result<(), Error> {
        self.core.ensure_active()?;
        self.core.rpdo_request(pdid, pdo_type, RPDO_TIMEOUT_FOREVER).await?;
        self.core.registry.insert(pdid, pdo_type, dedup, consumer);
        Ok(())
    }

    /// Cancel a PDO subscription. The local entry is removed regardless
    /// of the confirm outcome.
    pub async fn unsubscribe(&self, pdid: u32, pdo_type: PdoType) -> Result<(), Error> {
        self.core.ensure_active()?;
        self.core.registry.remove(pdid);
        self.core.rpdo_request(pdid, pdo_type, RPDO_TIMEOUT_CANCEL).await?;
        Ok(())
    }

    /// Number of installed subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.core.registry.len()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(supervisor) = self
            .core
            .supervisor
            .lock()
            .expect("supervisor slot poisoned")
            .take()
        {
            supervisor.abort();
        }
        self.core.abort_tasks();
    }
}

impl Core {
    fn state(&self) -> SessionState {
        *self.state.lock().expect("session state poisoned")
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock().expect("session state poisoned") = state;
    }

    fn ensure_active(&self) -> Result<(), Error> {
        if self.state() != SessionState::Active {
            return Err(SessionError::NotConnected.into());
        }
        Ok(())
    }

    fn current_conn(&self) -> Result<Arc<Connection>, Error> {
        self.conn
            .lock()
            .expect("connection slot poisoned")
            .clone()
            .ok_or_else(|| SessionError::NotConnected.into())
    }

    fn touch_rx(&self) {
        *self.last_rx.lock().expect("last_rx poisoned") = Instant::now();
    }

    fn rx_silence(&self) -> std::time::Duration {
        self.last_rx.lock().expect("last_rx poisoned").elapsed()
    }

    fn abort_tasks(&self) {
        let tasks: Vec<JoinHandle<()>> = {
            let mut slot = self.tasks.lock().expect("task slot poisoned");
            slot.drain(..).collect()
        };
        for task in tasks {
            task.abort();
        }
    }

    async fn drop_connection(&self) {
        let conn = {
            self.conn
                .lock()
                .expect("connection slot poisoned")
                .take()
        };
        if let Some(conn) = conn {
            conn.shutdown().await;
        }
    }

    /// Open TCP, start the session, re-install subscriptions, go Active.
    ///
    /// Returns the event channel fed by the connection's reader and
    /// keepalive tasks. On any failure the connection is torn down and
    /// the state returns to Disconnected.
    async fn establish(
        self: &Arc<Self>,
        take_over: bool,
    ) -> Result<mpsc::UnboundedReceiver<SessionEvent>, Error> {
        self.set_state(SessionState::Connecting);

        match self.establish_inner(take_over).await {
            Ok(events) => Ok(events),
            Err(e) => {
                self.abort_tasks();
                self.drop_connection().await;
                self.set_state(SessionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Open TCP and spawn the reader; no session handshake yet.
    async fn open_transport(
        self: &Arc<Self>,
    ) -> Result<
        (
            Arc<Connection>,
            mpsc::UnboundedSender<SessionEvent>,
            mpsc::UnboundedReceiver<SessionEvent>,
        ),
        Error,
    > {
        debug!(host = %self.host, port = self.config.port, "connecting");
        let (conn, read_half) =
            transport::connect(&self.host, self.config.port, self.config.connect_timeout()).await?;
        let conn = Arc::new(conn);
        *self.conn.lock().expect("connection slot poisoned") = Some(Arc::clone(&conn));
        self.touch_rx();

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&self.correlator),
            Arc::clone(&self.registry),
            events_tx.clone(),
        ));
        dispatcher.set_alarm_handler(
            self.alarm_handler
                .lock()
                .expect("alarm handler poisoned")
                .clone(),
        );

        let reader = tokio::spawn(run_reader(
            read_half,
            Arc::clone(self),
            dispatcher,
            events_tx.clone(),
        ));
        self.tasks
            .lock()
            .expect("task slot poisoned")
            .push(reader);

        Ok((conn, events_tx, events_rx))
    }

    async fn establish_inner(
        self: &Arc<Self>,
        take_over: bool,
    ) -> Result<mpsc::UnboundedReceiver<SessionEvent>, Error> {
        let (conn, events_tx, events_rx) = self.open_transport().await?;

        self.set_state(SessionState::Starting);
        let confirm = self
            .request(
                OperationType::StartSessionRequest,
                OperationPayload::StartSessionRequest(StartSessionRequest {
                    takeover: Some(take_over),
                }),
            )
            .await;

        match confirm {
            Ok(frame) => {
                if let OperationPayload::StartSessionConfirm(c) = &frame.payload {
                    info!(
                        host = %self.host,
                        devicename = c.devicename.as_deref().unwrap_or(""),
                        resumed = c.resumed.unwrap_or(false),
                        "session started"
                    );
                }
            }
            Err(Error::Gateway(GatewayError::NotAllowed)) => {
                return Err(SessionError::NotRegistered.into());
            }
            Err(Error::Gateway(GatewayError::OtherSession)) => {
                return Err(SessionError::OtherSession.into());
            }
            Err(e) => return Err(e),
        }

        // Re-install subscriptions surviving from a previous connection
        // before user requests are allowed through.
        for sub in self.registry.snapshot() {
            self.rpdo_request(sub.pdid, sub.pdo_type, RPDO_TIMEOUT_FOREVER)
                .await?;
            debug!(pdid = sub.pdid, "subscription re-installed");
        }

        self.set_state(SessionState::Active);

        let keepalive = tokio::spawn(run_keepalive(Arc::clone(self), conn, events_tx));
        self.tasks
            .lock()
            .expect("task slot poisoned")
            .push(keepalive);

        Ok(events_rx)
    }

    async fn request(
        self: &Arc<Self>,
        op: OperationType,
        payload: OperationPayload,
    ) -> Result<Frame, Error> {
        let expect = op
            .expected_confirm()
            .ok_or_else(|| RequestError::Invalid(format!("{:?} has no confirm", op)))?;

        let timeout = self.config.request_timeout();
        let pending = match self.correlator.begin(expect, timeout) {
            Ok(pending) => pending,
            Err(e) => {
                // Reference wrap collision: protocol fault, drop the
                // connection rather than mis-correlate replies.
                warn!(error = %e, "correlation fault; dropping connection");
                self.abort_tasks();
                self.drop_connection().await;
                self.correlator.fail_all(|| RequestError::TransportLost.into());
                self.set_state(SessionState::Disconnected);
                return Err(e);
            }
        };

        let frame = Frame::request(self.local_uuid, self.bridge_uuid, op, pending.ref_id(), payload);
        self.current_conn()?.send(&frame.encode()).await?;
        pending.wait(timeout).await
    }

    async fn send_no_reply(
        &self,
        op: OperationType,
        payload: OperationPayload,
    ) -> Result<(), Error> {
        let reference = self.correlator.allocate();
        let frame = Frame::request(self.local_uuid, self.bridge_uuid, op, reference, payload);
        self.current_conn()?.send(&frame.encode()).await?;
        Ok(())
    }

    async fn rpdo_request(
        self: &Arc<Self>,
        pdid: u32,
        pdo_type: PdoType,
        timeout: u32,
    ) -> Result<(), Error> {
        self.request(
            OperationType::CnRpdoRequest,
            OperationPayload::CnRpdoRequest(CnRpdoRequest {
                pdid: Some(pdid),
                zone: Some(1),
                r#type: Some(u32::from(pdo_type.tag())),
                timeout: Some(timeout),
            }),
        )
        .await
        .map(drop)
    }
}

/// Reader task: the only parser of inbound bytes on this connection.
async fn run_reader(
    mut read_half: OwnedReadHalf,
    core: Arc<Core>,
    dispatcher: Arc<Dispatcher>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let max = core.config.max_frame_size;
    loop {
        match transport::read_frame(&mut read_half, max).await {
            Ok(frame) => {
                core.touch_rx();
                dispatcher.handle(frame);
            }
            Err(e) => {
                let _ = events.send(SessionEvent::TransportLost(e));
                return;
            }
        }
    }
}

/// Keepalive task: cadence traffic, deadline sweep, stall detection.
async fn run_keepalive(
    core: Arc<Core>,
    conn: Arc<Connection>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let interval = core.config.keepalive_interval();
    loop {
        tokio::time::sleep(interval).await;

        if core.state() != SessionState::Active {
            return;
        }

        if core.rx_silence() >= core.config.stall_timeout() {
            let _ = events.send(SessionEvent::Stalled);
            return;
        }

        core.correlator.sweep(Instant::now());

        let reference = core.correlator.allocate();
        let frame = Frame::request(
            core.local_uuid,
            core.bridge_uuid,
            OperationType::KeepAlive,
            reference,
            OperationPayload::KeepAlive(KeepAlive {}),
        );
        if conn.send(&frame.encode()).await.is_err() {
            // The reader observes the broken socket and reports it.
            return;
        }
    }
}

/// Supervisor: reacts to connection-fatal events, fails in-flight
/// requests, and drives the reconnect policy.
async fn supervise(
    core: Arc<Core>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    take_over: bool,
) {
    loop {
        let Some(event) = events.recv().await else {
            return;
        };

        let reason: fn() -> Error = match &event {
            SessionEvent::CloseRequested => {
                info!("bridge requested session close");
                || SessionError::ClosedByBridge.into()
            }
            SessionEvent::TransportLost(e) => {
                warn!(error = %e, "connection lost");
                || RequestError::TransportLost.into()
            }
            SessionEvent::Stalled => {
                warn!(
                    silence = ?core.rx_silence(),
                    "no inbound traffic; connection stalled"
                );
                || SessionError::StalledConnection.into()
            }
        };

        core.abort_tasks();
        core.drop_connection().await;
        core.correlator.fail_all(reason);
        core.set_state(SessionState::Disconnected);

        if core.closing.load(Ordering::SeqCst) || !core.config.auto_reconnect {
            return;
        }

        let mut backoff = core.config.reconnect_initial_backoff();
        events = loop {
            info!(delay = ?backoff, "reconnecting");
            tokio::time::sleep(backoff).await;
            if core.closing.load(Ordering::SeqCst) {
                return;
            }
            match core.establish(take_over).await {
                Ok(events) => {
                    info!(host = %core.host, "reconnected");
                    break events;
                }
                Err(e) => {
                    warn!(error = %e, "reconnect attempt failed");
                    backoff = std::cmp::min(backoff * 2, core.config.reconnect_max_backoff());
                }
            }
        };
    }
}
