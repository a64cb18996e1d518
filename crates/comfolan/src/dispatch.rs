// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request correlation and inbound frame routing.
//!
//! The correlator multiplexes many in-flight requests over one connection:
//! every outbound request gets a reference id and a pending entry with a
//! one-shot completion sink; every inbound reply is matched back by its
//! echoed reference. Notifications never match a reference and are routed
//! to the PDO registry or the session machine instead.

use crate::error::{Error, GatewayError, RequestError, RmiError, SessionError, TransportError};
use crate::frame::Frame;
use crate::pdo::PdoRegistry;
use crate::proto::{CnAlarmNotification, GatewayResult, OperationPayload, OperationType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

/// Events the dispatcher and transport raise toward the session machine.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    /// The reader task exited with the given reason.
    TransportLost(TransportError),
    /// The bridge asked us to close the session.
    CloseRequested,
    /// No inbound traffic for the stall window.
    Stalled,
}

// ---------------------------------------------------------------------------
// Correlator
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct PendingEntry {
    expect: OperationType,
    deadline: Instant,
    tx: oneshot::Sender<Result<Frame, Error>>,
}

/// Pending-request map keyed by reference id.
#[derive(Debug)]
pub(crate) struct Correlator {
    next_ref: AtomicU32,
    pending: Mutex<HashMap<u32, PendingEntry>>,
}

impl Correlator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_ref: AtomicU32::new(1),
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// Allocate the next reference id. Wraps past `u32::MAX` to 1; 0 is
    /// reserved as "no reference".
    pub fn allocate(&self) -> u32 {
        loop {
            let id = self.next_ref.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return id;
            }
        }
    }

    /// Install a pending entry for a fresh request.
    ///
    /// A wrap collision with a still-pending reference is a protocol
    /// fault; the caller must drop the connection.
    pub fn begin(
        self: &Arc<Self>,
        expect: OperationType,
        timeout: Duration,
    ) -> Result<PendingReply, Error> {
        let ref_id = self.allocate();
        let (tx, rx) = oneshot::channel();

        {
            let mut pending = self.pending.lock().expect("pending map poisoned");
            if pending.contains_key(&ref_id) {
                return Err(SessionError::Protocol(format!(
                    "reference {} reused while still pending",
                    ref_id
                ))
                .into());
            }
            pending.insert(
                ref_id,
                PendingEntry {
                    expect,
                    deadline: Instant::now() + timeout,
                    tx,
                },
            );
        }

        Ok(PendingReply {
            ref_id,
            rx,
            correlator: Arc::clone(self),
        })
    }

    fn remove(&self, ref_id: u32) -> bool {
        self.pending
            .lock()
            .expect("pending map poisoned")
            .remove(&ref_id)
            .is_some()
    }

    pub fn in_flight(&self) -> usize {
        self.pending.lock().expect("pending map poisoned").len()
    }

    /// Complete the pending entry matching this reply, if any.
    ///
    /// Returns false for unmatched references (late, duplicate, or never
    /// ours) so the caller can log and drop.
    pub fn complete(&self, frame: Frame) -> bool {
        let ref_id = frame.reference();
        if ref_id == 0 {
            return false;
        }

        let entry = {
            self.pending
                .lock()
                .expect("pending map poisoned")
                .remove(&ref_id)
        };
        let Some(entry) = entry else {
            return false;
        };

        let _ = entry.tx.send(reply_to_result(entry.expect, frame));
        true
    }

    /// Fail every in-flight request, e.g. on transport loss.
    pub fn fail_all(&self, make_err: impl Fn() -> Error) {
        let drained: Vec<PendingEntry> = {
            let mut pending = self.pending.lock().expect("pending map poisoned");
            pending.drain().map(|(_, e)| e).collect()
        };
        for entry in drained {
            let _ = entry.tx.send(Err(make_err()));
        }
    }

    /// Time out entries past their deadline.
    pub fn sweep(&self, now: Instant) {
        let expired: Vec<PendingEntry> = {
            let mut pending = self.pending.lock().expect("pending map poisoned");
            let ids: Vec<u32> = pending
                .iter()
                .filter(|(_, e)| e.deadline <= now)
                .map(|(&id, _)| id)
                .collect();
            ids.into_iter().filter_map(|id| pending.remove(&id)).collect()
        };
        for entry in expired {
            let _ = entry.tx.send(Err(RequestError::Timeout.into()));
        }
    }

    #[cfg(test)]
    pub fn set_next_ref(&self, value: u32) {
        self.next_ref.store(value, Ordering::Relaxed);
    }
}

/// Map a matched reply to the caller's result.
fn reply_to_result(expect: OperationType, frame: Frame) -> Result<Frame, Error> {
    let result = frame.op.result_code();

    if result == GatewayResult::RmiError {
        let code = match &frame.payload {
            OperationPayload::CnRmiResponse(r) => r.result.unwrap_or(0),
            OperationPayload::CnRmiAsyncConfirm(r) => r.result.unwrap_or(0),
            OperationPayload::CnRmiAsyncResponse(r) => r.result.unwrap_or(0),
            _ => 0,
        };
        return Err(RmiError { code }.into());
    }

    if let Some(err) = GatewayError::from_result(result) {
        return Err(err.into());
    }

    match frame.op.op_type() {
        Some(op) if op == expect => Ok(frame),
        got => Err(RequestError::UnexpectedReply {
            expected: expect,
            got,
        }
        .into()),
    }
}

/// Handle to one in-flight request.
///
/// Dropping the handle deregisters the pending entry, so a late reply for
/// a cancelled request is discarded by the correlator.
#[derive(Debug)]
pub(crate) struct PendingReply {
    ref_id: u32,
    rx: oneshot::Receiver<Result<Frame, Error>>,
    correlator: Arc<Correlator>,
}

impl PendingReply {
    pub fn ref_id(&self) -> u32 {
        self.ref_id
    }

    /// Await the reply, timing out after `timeout`.
    pub async fn wait(mut self, timeout: Duration) -> Result<Frame, Error> {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(RequestError::Cancelled.into()),
            Err(_) => {
                self.correlator.remove(self.ref_id);
                Err(RequestError::Timeout.into())
            }
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        self.correlator.remove(self.ref_id);
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Callback invoked with (node id, alarm) on alarm notifications.
pub type AlarmHandler = Arc<dyn Fn(u32, CnAlarmNotification) + Send + Sync>;

/// Routes every decoded inbound frame to its destination.
pub(crate) struct Dispatcher {
    correlator: Arc<Correlator>,
    registry: Arc<PdoRegistry>,
    events: mpsc::UnboundedSender<SessionEvent>,
    alarm_handler: Mutex<Option<AlarmHandler>>,
}

impl Dispatcher {
    pub fn new(
        correlator: Arc<Correlator>,
        registry: Arc<PdoRegistry>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            correlator,
            registry,
            events,
            alarm_handler: Mutex::new(None),
        }
    }

    pub fn set_alarm_handler(&self, handler: Option<AlarmHandler>) {
        *self.alarm_handler.lock().expect("alarm handler poisoned") = handler;
    }

    fn emit_alarm(&self, node_id: u32, alarm: CnAlarmNotification) {
        let handler = {
            self.alarm_handler
                .lock()
                .expect("alarm handler poisoned")
                .clone()
        };
        match handler {
            Some(handler) => handler(node_id, alarm),
            None => debug!(node_id, "alarm notification with no handler installed"),
        }
    }

    /// Route one inbound frame. Runs on the reader task; must not block.
    pub fn handle(&self, frame: Frame) {
        let tag = frame.op.r#type.unwrap_or(0);
        match frame.op.op_type() {
            Some(OperationType::CnRpdoNotification) => {
                if let OperationPayload::CnRpdoNotification(n) = &frame.payload {
                    let pdid = n.pdid.unwrap_or(0);
                    let data = n.data.as_deref().unwrap_or_default();
                    if let Err(e) = self.registry.dispatch(pdid, data) {
                        debug!(pdid, error = %e, "dropping PDO notification");
                    }
                }
            }

            Some(OperationType::CnAlarmNotification) => {
                if let OperationPayload::CnAlarmNotification(alarm) = frame.payload {
                    let node_id = alarm.node_id.unwrap_or(0);
                    self.emit_alarm(node_id, alarm);
                }
            }

            Some(OperationType::GatewayNotification) => {
                if let OperationPayload::GatewayNotification(n) = frame.payload {
                    match n.alarm {
                        Some(alarm) => {
                            let node_id = alarm.node_id.unwrap_or(0);
                            self.emit_alarm(node_id, alarm);
                        }
                        None => debug!("gateway notification"),
                    }
                }
            }

            Some(OperationType::CnNodeNotification) => {
                if let OperationPayload::CnNodeNotification(n) = &frame.payload {
                    debug!(
                        node_id = n.node_id.unwrap_or(0),
                        mode = n.mode.unwrap_or(0),
                        "node notification"
                    );
                }
            }

            Some(OperationType::CloseSessionRequest) => {
                let _ = self.events.send(SessionEvent::CloseRequested);
            }

            Some(OperationType::KeepAlive) => {
                trace!("keepalive from bridge");
            }

            None => {
                warn!(tag, "unknown operation; payload preserved and dropped");
            }

            _ => {
                let reference = frame.reference();
                if !self.correlator.complete(frame) {
                    debug!(reference, tag, "unmatched reply dropped");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{CnRmiResponse, CnRpdoConfirm, CnRpdoNotification, GatewayOperation};
    use crate::util::NIL_UUID;
    use std::sync::atomic::AtomicUsize;

    fn reply(op: OperationType, reference: u32, payload: OperationPayload) -> Frame {
        Frame {
            src: NIL_UUID,
            dst: NIL_UUID,
            op: GatewayOperation {
                r#type: Some(op as i32),
                reference: Some(reference),
                result: None,
                result_description: None,
            },
            payload,
        }
    }

    #[tokio::test]
    async fn test_begin_and_complete() {
        let correlator = Correlator::new();
        let pending = correlator
            .begin(OperationType::CnRpdoConfirm, Duration::from_secs(5))
            .unwrap();
        let ref_id = pending.ref_id();
        assert_eq!(correlator.in_flight(), 1);

        let frame = reply(
            OperationType::CnRpdoConfirm,
            ref_id,
            OperationPayload::CnRpdoConfirm(CnRpdoConfirm {}),
        );
        assert!(correlator.complete(frame.clone()));
        assert_eq!(correlator.in_flight(), 0);

        // Second reply for the same reference is unmatched.
        assert!(!correlator.complete(frame));

        let got = pending.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(got.reference(), ref_id);
    }

    #[tokio::test]
    async fn test_reply_refs_are_unique_and_skip_zero() {
        let correlator = Correlator::new();
        correlator.set_next_ref(u32::MAX);

        let a = correlator.allocate();
        let b = correlator.allocate();
        assert_eq!(a, u32::MAX);
        assert_eq!(b, 1, "wraps past zero");
    }

    #[tokio::test]
    async fn test_wrap_collision_is_protocol_fault() {
        let correlator = Correlator::new();
        let _pending = correlator
            .begin(OperationType::CnRpdoConfirm, Duration::from_secs(5))
            .unwrap();

        // Force the allocator to hand out the same reference again.
        correlator.set_next_ref(1);
        let err = correlator
            .begin(OperationType::CnRpdoConfirm, Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_unexpected_reply_tag() {
        let correlator = Correlator::new();
        let pending = correlator
            .begin(OperationType::CnRpdoConfirm, Duration::from_secs(5))
            .unwrap();
        let ref_id = pending.ref_id();

        let frame = reply(
            OperationType::CnRmiResponse,
            ref_id,
            OperationPayload::CnRmiResponse(CnRmiResponse {
                result: Some(0),
                message: None,
            }),
        );
        assert!(correlator.complete(frame));

        let err = pending.wait(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Request(RequestError::UnexpectedReply { .. })
        ));
    }

    #[tokio::test]
    async fn test_rmi_error_result() {
        let correlator = Correlator::new();
        let pending = correlator
            .begin(OperationType::CnRmiResponse, Duration::from_secs(5))
            .unwrap();
        let ref_id = pending.ref_id();

        let mut frame = reply(
            OperationType::CnRmiResponse,
            ref_id,
            OperationPayload::CnRmiResponse(CnRmiResponse {
                result: Some(14),
                message: None,
            }),
        );
        frame.op.result = Some(GatewayResult::RmiError as i32);
        assert!(correlator.complete(frame));

        match pending.wait(Duration::from_secs(1)).await.unwrap_err() {
            Error::Rmi(e) => {
                assert_eq!(e.code, 14);
                assert_eq!(e.name(), "UNKNOWN_PROPERTY");
            }
            other => panic!("expected RMI error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_discards_late_reply() {
        let correlator = Correlator::new();
        let pending = correlator
            .begin(OperationType::CnRpdoConfirm, Duration::from_secs(5))
            .unwrap();
        let ref_id = pending.ref_id();
        drop(pending);
        assert_eq!(correlator.in_flight(), 0);

        let frame = reply(
            OperationType::CnRpdoConfirm,
            ref_id,
            OperationPayload::CnRpdoConfirm(CnRpdoConfirm {}),
        );
        assert!(!correlator.complete(frame), "late reply is discarded");
    }

    #[tokio::test]
    async fn test_sweep_times_out_expired_entries() {
        let correlator = Correlator::new();
        let pending = correlator
            .begin(OperationType::CnRpdoConfirm, Duration::from_millis(1))
            .unwrap();

        correlator.sweep(Instant::now() + Duration::from_secs(1));
        assert_eq!(correlator.in_flight(), 0);

        let err = pending.wait(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, Error::Request(RequestError::Timeout)));
    }

    #[tokio::test]
    async fn test_fail_all() {
        let correlator = Correlator::new();
        let a = correlator
            .begin(OperationType::CnRpdoConfirm, Duration::from_secs(5))
            .unwrap();
        let b = correlator
            .begin(OperationType::CnRmiResponse, Duration::from_secs(5))
            .unwrap();

        correlator.fail_all(|| RequestError::TransportLost.into());
        assert_eq!(correlator.in_flight(), 0);

        for pending in [a, b] {
            let err = pending.wait(Duration::from_secs(1)).await.unwrap_err();
            assert!(matches!(err, Error::Request(RequestError::TransportLost)));
        }
    }

    #[tokio::test]
    async fn test_dispatcher_routes_pdo_notification() {
        let correlator = Correlator::new();
        let registry = Arc::new(PdoRegistry::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(Arc::clone(&correlator), Arc::clone(&registry), tx);

        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = Arc::clone(&hits);
        registry.insert(
            276,
            crate::pdo::PdoType::Int16,
            false,
            Arc::new(move |_, _| {
                hits2.fetch_add(1, Ordering::SeqCst);
            }),
        );

        dispatcher.handle(reply(
            OperationType::CnRpdoNotification,
            0,
            OperationPayload::CnRpdoNotification(CnRpdoNotification {
                pdid: Some(276),
                data: Some(vec![0x3c, 0x00]),
            }),
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatcher_routes_close_request() {
        let correlator = Correlator::new();
        let registry = Arc::new(PdoRegistry::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(correlator, registry, tx);

        dispatcher.handle(reply(
            OperationType::CloseSessionRequest,
            0,
            OperationPayload::CloseSessionRequest(crate::proto::CloseSessionRequest {}),
        ));

        match rx.try_recv() {
            Ok(SessionEvent::CloseRequested) => {}
            other => panic!("expected CloseRequested, got {:?}", other),
        }
    }
}
