// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end engine tests against a scripted mock bridge on loopback.

use comfolan::frame::Frame;
use comfolan::proto::{
    CnRmiResponse, CnRpdoConfirm, CnRpdoNotification, CnTimeConfirm, GatewayOperation,
    GatewayResult, KeepAlive, ListRegisteredAppsConfirm, OperationPayload, OperationType,
    RegisterAppConfirm, RegisteredApp, StartSessionConfirm,
};
use comfolan::{
    Bridge, BridgeConfig, ComfoClient, Error, PdoType, PdoValue, RequestError, SessionError,
    SessionState, VentilationSpeed,
};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const BRIDGE_UUID: [u8; 16] = [0xbb; 16];
const LOCAL_UUID: [u8; 16] = [0x01; 16];

/// What the mock does with inbound operations.
struct Behavior {
    /// Result code attached to StartSessionConfirm.
    start_session_result: AtomicI32,
    /// RMI responder: message bytes -> (rmi result, reply bytes, delay).
    /// `None` swallows the request (for timeout tests).
    #[allow(clippy::type_complexity)]
    rmi: Option<Arc<dyn Fn(&[u8]) -> Option<(u32, Vec<u8>, Duration)> + Send + Sync>>,
    /// Echo a KeepAlive whenever one arrives (keeps the client's inbound
    /// traffic fresh so stall detection stays quiet).
    echo_keepalive: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            start_session_result: AtomicI32::new(GatewayResult::Ok as i32),
            rmi: Some(Arc::new(|_| Some((0, Vec::new(), Duration::ZERO)))),
            echo_keepalive: true,
        }
    }
}

struct MockBridge {
    port: u16,
    behavior: Arc<Behavior>,
    /// (connection index, frame) for every request received.
    received: Arc<Mutex<Vec<(usize, Frame)>>>,
    received_notify: Arc<tokio::sync::Notify>,
    /// Write half of the most recent connection.
    writer: Arc<tokio::sync::Mutex<Option<OwnedWriteHalf>>>,
    connections: Arc<AtomicUsize>,
}

impl MockBridge {
    async fn spawn(behavior: Behavior) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mock = Self {
            port,
            behavior: Arc::new(behavior),
            received: Arc::new(Mutex::new(Vec::new())),
            received_notify: Arc::new(tokio::sync::Notify::new()),
            writer: Arc::new(tokio::sync::Mutex::new(None)),
            connections: Arc::new(AtomicUsize::new(0)),
        };

        let behavior = Arc::clone(&mock.behavior);
        let received = Arc::clone(&mock.received);
        let notify = Arc::clone(&mock.received_notify);
        let writer_slot = Arc::clone(&mock.writer);
        let connections = Arc::clone(&mock.connections);

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let conn = connections.fetch_add(1, Ordering::SeqCst) + 1;
                let (mut read_half, write_half) = stream.into_split();
                *writer_slot.lock().await = Some(write_half);

                let behavior = Arc::clone(&behavior);
                let received = Arc::clone(&received);
                let notify = Arc::clone(&notify);
                let writer_slot = Arc::clone(&writer_slot);

                tokio::spawn(async move {
                    loop {
                        let mut len_buf = [0u8; 4];
                        if read_half.read_exact(&mut len_buf).await.is_err() {
                            return;
                        }
                        let len = u32::from_be_bytes(len_buf) as usize;
                        let mut body = vec![0u8; len];
                        if read_half.read_exact(&mut body).await.is_err() {
                            return;
                        }
                        let frame = Frame::decode(&body).unwrap();

                        received.lock().unwrap().push((conn, frame.clone()));
                        notify.notify_waiters();

                        handle_op(&behavior, &writer_slot, frame).await;
                    }
                });
            }
        });

        mock
    }

    async fn send(&self, op: OperationType, reference: u32, payload: OperationPayload) {
        let frame = confirm_frame(op, reference, GatewayResult::Ok as i32, payload);
        let mut slot = self.writer.lock().await;
        if let Some(writer) = slot.as_mut() {
            writer.write_all(&frame.encode()).await.unwrap();
        }
    }

    /// Close the current connection from the bridge side.
    async fn kill_connection(&self) {
        let mut slot = self.writer.lock().await;
        if let Some(mut writer) = slot.take() {
            let _ = writer.shutdown().await;
        }
    }

    fn frames(&self) -> Vec<(usize, Frame)> {
        self.received.lock().unwrap().clone()
    }

    fn count_ops(&self, op: OperationType) -> usize {
        self.frames()
            .iter()
            .filter(|(_, f)| f.op.op_type() == Some(op))
            .count()
    }

    async fn wait_for<F: Fn(&MockBridge) -> bool>(&self, cond: F) {
        tokio::time::timeout(Duration::from_secs(3), async {
            loop {
                if cond(self) {
                    return;
                }
                let _ = tokio::time::timeout(
                    Duration::from_millis(20),
                    self.received_notify.notified(),
                )
                .await;
            }
        })
        .await
        .expect("mock condition not reached in time");
    }
}

fn confirm_frame(
    op: OperationType,
    reference: u32,
    result: i32,
    payload: OperationPayload,
) -> Frame {
    Frame {
        src: BRIDGE_UUID,
        dst: LOCAL_UUID,
        op: GatewayOperation {
            r#type: Some(op as i32),
            reference: if reference == 0 { None } else { Some(reference) },
            result: Some(result),
            result_description: None,
        },
        payload,
    }
}

async fn handle_op(
    behavior: &Arc<Behavior>,
    writer_slot: &Arc<tokio::sync::Mutex<Option<OwnedWriteHalf>>>,
    frame: Frame,
) {
    let reference = frame.reference();
    let reply = match frame.op.op_type() {
        Some(OperationType::StartSessionRequest) => Some(confirm_frame(
            OperationType::StartSessionConfirm,
            reference,
            behavior.start_session_result.load(Ordering::SeqCst),
            OperationPayload::StartSessionConfirm(StartSessionConfirm {
                devicename: Some("Mock Bridge".into()),
                resumed: Some(false),
            }),
        )),

        Some(OperationType::RegisterAppRequest) => Some(confirm_frame(
            OperationType::RegisterAppConfirm,
            reference,
            GatewayResult::Ok as i32,
            OperationPayload::RegisterAppConfirm(RegisterAppConfirm {}),
        )),

        Some(OperationType::ListRegisteredAppsRequest) => Some(confirm_frame(
            OperationType::ListRegisteredAppsConfirm,
            reference,
            GatewayResult::Ok as i32,
            OperationPayload::ListRegisteredAppsConfirm(ListRegisteredAppsConfirm {
                apps: vec![RegisteredApp {
                    uuid: Some(LOCAL_UUID.to_vec()),
                    devicename: Some("comfolan".into()),
                }],
            }),
        )),

        Some(OperationType::CnRpdoRequest) => Some(confirm_frame(
            OperationType::CnRpdoConfirm,
            reference,
            GatewayResult::Ok as i32,
            OperationPayload::CnRpdoConfirm(CnRpdoConfirm {}),
        )),

        Some(OperationType::CnTimeRequest) => Some(confirm_frame(
            OperationType::CnTimeConfirm,
            reference,
            GatewayResult::Ok as i32,
            OperationPayload::CnTimeConfirm(CnTimeConfirm {
                current_time: Some(778_459_747),
            }),
        )),

        Some(OperationType::CnRmiRequest) => {
            let message = match &frame.payload {
                OperationPayload::CnRmiRequest(r) => r.message.clone().unwrap_or_default(),
                _ => Vec::new(),
            };
            let Some(responder) = behavior.rmi.as_ref() else {
                return;
            };
            let Some((result, reply_bytes, delay)) = responder(&message) else {
                return;
            };

            let gateway_result = if result == 0 {
                GatewayResult::Ok as i32
            } else {
                GatewayResult::RmiError as i32
            };
            let reply = confirm_frame(
                OperationType::CnRmiResponse,
                reference,
                gateway_result,
                OperationPayload::CnRmiResponse(CnRmiResponse {
                    result: Some(result),
                    message: Some(reply_bytes),
                }),
            );

            let writer_slot = Arc::clone(writer_slot);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let mut slot = writer_slot.lock().await;
                if let Some(writer) = slot.as_mut() {
                    let _ = writer.write_all(&reply.encode()).await;
                }
            });
            return;
        }

        Some(OperationType::KeepAlive) => {
            if !behavior.echo_keepalive {
                return;
            }
            Some(confirm_frame(
                OperationType::KeepAlive,
                0,
                GatewayResult::Ok as i32,
                OperationPayload::KeepAlive(KeepAlive {}),
            ))
        }

        _ => None,
    };

    if let Some(reply) = reply {
        let mut slot = writer_slot.lock().await;
        if let Some(writer) = slot.as_mut() {
            let _ = writer.write_all(&reply.encode()).await;
        }
    }
}

fn test_config(port: u16) -> BridgeConfig {
    BridgeConfig {
        port,
        connect_timeout_ms: 1_000,
        request_timeout_ms: 1_000,
        keepalive_interval_ms: 100,
        stall_factor: 3,
        auto_reconnect: false,
        reconnect_initial_backoff_ms: 50,
        reconnect_max_backoff_ms: 200,
        sensor_hold_ms: 0,
        ..Default::default()
    }
}

fn make_bridge(config: BridgeConfig) -> Bridge {
    Bridge::new("127.0.0.1", BRIDGE_UUID, LOCAL_UUID, config).unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_connect_and_rmi_roundtrip() {
    // "Get ventilation unit name": the RMI reply decodes as a
    // NUL-terminated string.
    let behavior = Behavior {
        rmi: Some(Arc::new(|message| {
            assert_eq!(message, &[0x01, 0x01, 0x01, 0x10, 0x14]);
            Some((0, b"ComfoAirQ\0".to_vec(), Duration::ZERO))
        })),
        ..Default::default()
    };
    let mock = MockBridge::spawn(behavior).await;
    let bridge = make_bridge(test_config(mock.port));

    bridge.connect(true).await.unwrap();
    assert_eq!(bridge.state(), SessionState::Active);

    let value = bridge
        .get_property(0x01, 0x01, 0x01, 0x14, PdoType::String)
        .await
        .unwrap();
    assert_eq!(value, PdoValue::String("ComfoAirQ".into()));

    bridge.disconnect().await;
    assert_eq!(bridge.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_set_speed_emits_exact_bytes() {
    let expected: &[u8] = &[
        0x84, 0x15, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    ];
    let seen: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));
    let seen2 = Arc::clone(&seen);

    let behavior = Behavior {
        rmi: Some(Arc::new(move |message| {
            seen2.lock().unwrap().push(message.to_vec());
            Some((0, Vec::new(), Duration::ZERO))
        })),
        ..Default::default()
    };
    let mock = MockBridge::spawn(behavior).await;
    let client = ComfoClient::new(make_bridge(test_config(mock.port)));

    client.connect().await.unwrap();
    client.set_speed(VentilationSpeed::Low).await.unwrap();
    client.disconnect().await;

    assert!(seen.lock().unwrap().iter().any(|m| m == expected));
}

#[tokio::test]
async fn test_subscribe_delivers_decoded_values() {
    let mock = MockBridge::spawn(Behavior::default()).await;
    let bridge = make_bridge(test_config(mock.port));
    bridge.connect(true).await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    bridge
        .subscribe(
            276,
            PdoType::Int16,
            false,
            Arc::new(move |pdid, value| {
                let _ = tx.send((pdid, value));
            }),
        )
        .await
        .unwrap();

    // The subscription request carries type 6 and the "forever" lease.
    let rpdo = mock
        .frames()
        .into_iter()
        .find_map(|(_, f)| match f.payload {
            OperationPayload::CnRpdoRequest(r) => Some(r),
            _ => None,
        })
        .unwrap();
    assert_eq!(rpdo.pdid, Some(276));
    assert_eq!(rpdo.zone, Some(1));
    assert_eq!(rpdo.r#type, Some(6));
    assert_eq!(rpdo.timeout, Some(u32::MAX));

    mock.send(
        OperationType::CnRpdoNotification,
        0,
        OperationPayload::CnRpdoNotification(CnRpdoNotification {
            pdid: Some(276),
            data: Some(vec![0x3c, 0x00]),
        }),
    )
    .await;

    let (pdid, value) = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pdid, 276);
    assert_eq!(value, PdoValue::Int16(60));

    bridge.disconnect().await;
}

#[tokio::test]
async fn test_not_registered_then_register_flow() {
    let mock = MockBridge::spawn(Behavior::default()).await;
    mock.behavior
        .start_session_result
        .store(GatewayResult::NotAllowed as i32, Ordering::SeqCst);

    let bridge = make_bridge(test_config(mock.port));

    let err = bridge.connect(true).await.unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::NotRegistered)));
    assert_eq!(bridge.state(), SessionState::Disconnected);

    bridge.register_app("comfolan", 0).await.unwrap();
    assert_eq!(mock.count_ops(OperationType::RegisterAppRequest), 1);

    mock.behavior
        .start_session_result
        .store(GatewayResult::Ok as i32, Ordering::SeqCst);
    bridge.connect(true).await.unwrap();
    assert!(bridge.is_connected());

    let apps = bridge.list_registered_apps().await.unwrap();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].devicename.as_deref(), Some("comfolan"));

    bridge.disconnect().await;
}

#[tokio::test]
async fn test_keepalive_cadence() {
    let mock = MockBridge::spawn(Behavior::default()).await;
    let bridge = make_bridge(test_config(mock.port));
    bridge.connect(true).await.unwrap();

    tokio::time::sleep(Duration::from_millis(450)).await;
    let keepalives = mock.count_ops(OperationType::KeepAlive);
    assert!(
        (3..=6).contains(&keepalives),
        "expected ~4 keepalives at a 100ms cadence, got {}",
        keepalives
    );
    assert!(bridge.is_connected());

    bridge.disconnect().await;
}

#[tokio::test]
async fn test_stalled_connection_disconnects() {
    let behavior = Behavior {
        echo_keepalive: false,
        ..Default::default()
    };
    let mock = MockBridge::spawn(behavior).await;
    let bridge = make_bridge(test_config(mock.port));
    bridge.connect(true).await.unwrap();

    // No inbound traffic after the confirm; the stall window is 300ms.
    tokio::time::timeout(Duration::from_secs(2), async {
        while bridge.state() != SessionState::Disconnected {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("session did not detect the stall");
}

#[tokio::test]
async fn test_close_notification_fails_pending() {
    let behavior = Behavior {
        rmi: None, // swallow RMI so a request stays in flight
        ..Default::default()
    };
    let mock = MockBridge::spawn(behavior).await;
    let bridge = Arc::new(make_bridge(test_config(mock.port)));
    bridge.connect(true).await.unwrap();

    let in_flight = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move { bridge.rmi(0x01, vec![0x01, 0x01]).await })
    };
    mock.wait_for(|m| m.count_ops(OperationType::CnRmiRequest) == 1).await;

    mock.send(
        OperationType::CloseSessionRequest,
        0,
        OperationPayload::CloseSessionRequest(comfolan::proto::CloseSessionRequest {}),
    )
    .await;

    let err = in_flight.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::ClosedByBridge)));

    tokio::time::timeout(Duration::from_secs(2), async {
        while bridge.state() != SessionState::Disconnected {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("session did not close");
}

#[tokio::test]
async fn test_reconnect_preserves_subscriptions() {
    let mock = MockBridge::spawn(Behavior::default()).await;
    let config = BridgeConfig {
        auto_reconnect: true,
        ..test_config(mock.port)
    };
    let bridge = make_bridge(config);
    bridge.connect(true).await.unwrap();

    bridge
        .subscribe(65, PdoType::UInt8, false, Arc::new(|_, _| {}))
        .await
        .unwrap();
    assert_eq!(bridge.session().subscription_count(), 1);

    mock.kill_connection().await;

    // The supervisor reconnects and re-installs PDID 65 before going
    // Active again.
    mock.wait_for(|m| {
        m.frames().iter().any(|(conn, f)| {
            *conn == 2
                && matches!(
                    &f.payload,
                    OperationPayload::CnRpdoRequest(r) if r.pdid == Some(65)
                )
        })
    })
    .await;

    tokio::time::timeout(Duration::from_secs(2), async {
        while !bridge.is_connected() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("session did not reconnect");

    // User requests flow again after the automatic recovery.
    assert_eq!(bridge.session().subscription_count(), 1);
    let time = bridge.time().await.unwrap();
    assert_eq!(time, 778_459_747);

    bridge.disconnect().await;
}

#[tokio::test]
async fn test_request_timeout_keeps_session_alive() {
    let behavior = Behavior {
        rmi: None,
        ..Default::default()
    };
    let mock = MockBridge::spawn(behavior).await;
    let config = BridgeConfig {
        request_timeout_ms: 100,
        ..test_config(mock.port)
    };
    let bridge = make_bridge(config);
    bridge.connect(true).await.unwrap();

    let err = bridge.rmi(0x01, vec![0x01, 0x01]).await.unwrap_err();
    assert!(matches!(err, Error::Request(RequestError::Timeout)));

    // Scoped to one request: the session survives and other verbs work.
    assert!(bridge.is_connected());
    assert_eq!(bridge.time().await.unwrap(), 778_459_747);

    bridge.disconnect().await;
}

#[tokio::test]
async fn test_out_of_order_replies_correlate() {
    let behavior = Behavior {
        rmi: Some(Arc::new(|message| {
            // The first probe answers slowly, the second immediately.
            let delay = if message == [0xaa] {
                Duration::from_millis(150)
            } else {
                Duration::ZERO
            };
            Some((0, message.to_vec(), delay))
        })),
        ..Default::default()
    };
    let mock = MockBridge::spawn(behavior).await;
    let bridge = Arc::new(make_bridge(test_config(mock.port)));
    bridge.connect(true).await.unwrap();

    let slow = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move { bridge.rmi(0x01, vec![0xaa]).await })
    };
    let fast = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move { bridge.rmi(0x01, vec![0xbb]).await })
    };

    assert_eq!(fast.await.unwrap().unwrap(), vec![0xbb]);
    assert_eq!(slow.await.unwrap().unwrap(), vec![0xaa]);

    bridge.disconnect().await;
}

#[tokio::test]
async fn test_rmi_error_surfaces_code() {
    let behavior = Behavior {
        rmi: Some(Arc::new(|_| Some((14, Vec::new(), Duration::ZERO)))),
        ..Default::default()
    };
    let mock = MockBridge::spawn(behavior).await;
    let bridge = make_bridge(test_config(mock.port));
    bridge.connect(true).await.unwrap();

    match bridge.rmi(0x01, vec![0x01, 0x02, 0x03]).await.unwrap_err() {
        Error::Rmi(e) => {
            assert_eq!(e.code, 14);
            assert_eq!(e.name(), "UNKNOWN_PROPERTY");
        }
        other => panic!("expected RMI error, got {:?}", other),
    }

    bridge.disconnect().await;
}

#[tokio::test]
async fn test_unsubscribe_sends_cancel_lease() {
    let mock = MockBridge::spawn(Behavior::default()).await;
    let bridge = make_bridge(test_config(mock.port));
    bridge.connect(true).await.unwrap();

    bridge
        .subscribe(117, PdoType::UInt8, true, Arc::new(|_, _| {}))
        .await
        .unwrap();
    bridge.unsubscribe(117, PdoType::UInt8).await.unwrap();
    assert_eq!(bridge.session().subscription_count(), 0);

    let leases: Vec<Option<u32>> = mock
        .frames()
        .into_iter()
        .filter_map(|(_, f)| match f.payload {
            OperationPayload::CnRpdoRequest(r) if r.pdid == Some(117) => Some(r.timeout),
            _ => None,
        })
        .collect();
    assert_eq!(leases, vec![Some(u32::MAX), Some(0)]);

    bridge.disconnect().await;
}

#[tokio::test]
async fn test_outbound_frames_carry_configured_uuids() {
    let mock = MockBridge::spawn(Behavior::default()).await;
    let bridge = make_bridge(test_config(mock.port));
    bridge.connect(true).await.unwrap();
    bridge.time().await.unwrap();
    bridge.disconnect().await;

    for (_, frame) in mock.frames() {
        assert_eq!(frame.src, LOCAL_UUID);
        assert_eq!(frame.dst, BRIDGE_UUID);
    }
}
