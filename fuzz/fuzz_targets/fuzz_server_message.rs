#![no_main]

use libfuzzer_sys::fuzz_target;
use queue_dashboard::protocol::ServerMessage;

fuzz_target!(|data: &[u8]| {
    // Raw-byte path, including serde_json's UTF-8 validation.
    let _ = serde_json::from_slice::<ServerMessage>(data);

    // The push channel hands the synchronizer text frames.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(ServerMessage::QueueUpdated { queue }) = serde_json::from_str::<ServerMessage>(s) {
            let json = serde_json::to_string(&ServerMessage::QueueUpdated { queue: queue.clone() })
                .unwrap_or_default();
            assert_eq!(
                serde_json::from_str::<ServerMessage>(&json).ok(),
                Some(ServerMessage::QueueUpdated { queue })
            );
        }
    }
});
