mod support;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use support::{catalog, fast_config, rig, Chunk, FakeDevice};
use synthbox_core::{SyncController, SyncError, TransportError};
use synthbox_domain_protocol::{message_id, ProtocolError, MSG_LOAD_SETTINGS};
use synthbox_domain_settings::{apply, SessionState, SettingsAction};
use synthbox_ports::{ControllerMapping, SynthId};

/// Behaves like the firmware: stores a 0x30 document and echoes it back for 0x20.
fn firmware() -> (FakeDevice, Arc<Mutex<Option<Value>>>) {
    let stored: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let memory = stored.clone();
    let device = FakeDevice::new(move |request| {
        let reply = match message_id(request) {
            Ok(0x20) => {
                let mut doc = memory.lock().clone().unwrap_or_else(|| {
                    json!({ "ctrl": { "rows": 1, "cols": 2, "ccs": [1, 2] }, "outs": [] })
                });
                doc["msg"] = json!(MSG_LOAD_SETTINGS);
                doc.to_string()
            }
            Ok(0x30) => {
                *memory.lock() = serde_json::from_slice(request).ok();
                json!({ "msg": 0x31 }).to_string()
            }
            Ok(0x40) => json!({ "msg": 0x41 }).to_string(),
            _ => "garbage".to_string(),
        };
        let bytes = reply.into_bytes();
        let (head, tail) = bytes.split_at(bytes.len() / 2);
        vec![Chunk::now(head), Chunk::after(5, tail)]
    });
    (device, stored)
}

fn edited_session() -> SessionState {
    let catalog = catalog();
    let mut state = SessionState::default();
    for action in [
        SettingsAction::SubmitNewPreset {
            synth_id: SynthId(5),
            channel: 3,
        },
        SettingsAction::SubmitNewPreset {
            synth_id: SynthId(4),
            channel: 10,
        },
        SettingsAction::RelabelInput {
            slot_index: 0,
            cc: 20,
        },
    ] {
        state = apply(&state, action, &catalog).unwrap();
    }
    state
}

#[test]
fn push_marks_clean_and_load_restores_the_same_settings() {
    let (device, stored) = firmware();
    let rig = rig(fast_config(), device);
    let sync = SyncController::new(rig.transport.clone(), Arc::new(catalog()));

    let edited = edited_session();
    assert!(edited.unsaved_edits);

    let pushed = sync.push_to_device(&edited).unwrap();
    assert!(!pushed.unsaved_edits);
    assert_eq!(pushed.model, edited.model);

    let doc = stored.lock().clone().unwrap();
    assert_eq!(doc["outs"][0]["mfg"], json!("Roland"));
    assert_eq!(doc["outs"][0]["ccs"][0], json!({ "num": 74, "name": "Cutoff" }));
    assert_eq!(doc["outs"][1]["pid"], json!(2));

    let loaded = sync.load_from_device(&SessionState::default()).unwrap();
    assert_eq!(loaded.model, edited.model);
    assert_eq!(loaded.current_preset_idx, Some(0));
    assert!(!loaded.unsaved_edits);
    assert_eq!(loaded.model.presets[1].mappings[0], ControllerMapping::new(20, 78));

    sync.commit().unwrap();
    let ids: Vec<u8> = rig
        .device
        .requests()
        .iter()
        .map(|request| message_id(request).unwrap())
        .collect();
    assert_eq!(ids, vec![0x30, 0x20, 0x40]);
}

#[test]
fn wrong_ack_is_a_protocol_error_and_state_stays_dirty() {
    let device = FakeDevice::new(|_| vec![Chunk::now(br#"{"msg":65}"#)]);
    let rig = rig(fast_config(), device);
    let sync = SyncController::new(rig.transport.clone(), Arc::new(catalog()));

    let edited = edited_session();
    let err = sync.push_to_device(&edited).unwrap_err();

    assert!(matches!(
        err,
        SyncError::Protocol(ProtocolError::UnexpectedMessage {
            actual: Some(0x41),
            ..
        })
    ));
    assert_eq!(err.payload(), Some(r#"{"msg":65}"#));
}

#[test]
fn unparseable_response_carries_the_raw_payload() {
    let device = FakeDevice::new(|_| vec![Chunk::now(br#"{"msg":49}{"msg":65}"#)]);
    let rig = rig(fast_config(), device);
    let sync = SyncController::new(rig.transport.clone(), Arc::new(catalog()));

    let err = sync.commit().unwrap_err();
    assert!(matches!(err, SyncError::Protocol(ProtocolError::Malformed { .. })));
    assert_eq!(err.payload(), Some(r#"{"msg":49}{"msg":65}"#));
}

#[test]
fn load_rejects_settings_that_break_invariants() {
    let device = FakeDevice::new(|_| {
        let doc = json!({
            "msg": 0x21,
            "ctrl": { "rows": 1, "cols": 1, "ccs": [1] },
            "outs": [{ "pid": 1, "sid": 5, "chn": 0, "ccs": [{ "num": 74 }] }]
        });
        vec![Chunk::now(doc.to_string().as_bytes())]
    });
    let rig = rig(fast_config(), device);
    let sync = SyncController::new(rig.transport.clone(), Arc::new(catalog()));

    assert!(matches!(
        sync.load_from_device(&SessionState::default()),
        Err(SyncError::Engine(_))
    ));
}

#[test]
fn silent_device_surfaces_a_timeout() {
    let device = FakeDevice::new(|_| Vec::new());
    let rig = rig(fast_config(), device);
    let sync = SyncController::new(rig.transport.clone(), Arc::new(catalog()));

    assert!(matches!(
        sync.commit(),
        Err(SyncError::Transport(TransportError::Timeout { .. }))
    ));
}
