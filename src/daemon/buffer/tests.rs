use super::*;

fn msg(room: &str, text: &str) -> IncomingMessage {
    IncomingMessage {
        room: room.to_string(),
        from: "agent1".to_string(),
        from_name: None,
        text: text.to_string(),
        timestamp: 0,
    }
}

#[test]
fn drain_removes_matching_and_preserves_others_in_order() {
    let mut buffer = RingBuffer::new();
    buffer.push(msg("A", "1"));
    buffer.push(msg("B", "2"));
    buffer.push(msg("A", "3"));

    let drained = buffer.drain(Some("A"));
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].text, "1");
    assert_eq!(drained[1].text, "3");

    assert_eq!(buffer.len(), 1);
    let remaining = buffer.drain(None);
    assert_eq!(remaining[0].room, "B");
}

#[test]
fn room_filter_is_case_insensitive() {
    let mut buffer = RingBuffer::new();
    buffer.push(msg("General", "hi"));

    let drained = buffer.drain(Some("general"));
    assert_eq!(drained.len(), 1);
}

#[test]
fn never_exceeds_capacity_and_evicts_oldest() {
    let mut buffer = RingBuffer::new();
    for i in 0..(CAPACITY + 10) {
        buffer.push(msg("room", &i.to_string()));
    }
    assert_eq!(buffer.len(), CAPACITY);

    let drained = buffer.drain(None);
    // The oldest 10 were evicted; the first remaining message is #10.
    assert_eq!(drained[0].text, "10");
}

#[test]
fn drain_caps_the_returned_slice_but_removes_all_matches() {
    let mut buffer = RingBuffer::new();
    for i in 0..(DRAIN_LIMIT + 20) {
        buffer.push(msg("busy", &i.to_string()));
    }

    let drained = buffer.drain(Some("busy"));
    assert_eq!(drained.len(), DRAIN_LIMIT);
    // All matches were removed from the buffer even though only DRAIN_LIMIT
    // were returned to the caller (documented lossy-on-busy-rooms quirk).
    assert_eq!(buffer.len(), 0);
}
