//! Free-slot discovery over the sensor's paginated index table.

use fingate_core::TemplateId;
use fingate_sensor::testing::build_index_page;
use fingate_sensor::{MockTransport, SensorCodec};

fn codec(mock: &MockTransport) -> SensorCodec<MockTransport> {
    SensorCodec::new(mock.clone())
}

#[tokio::test]
async fn empty_table_yields_lowest_valid_slot() {
    let mock = MockTransport::new();
    mock.push_response(build_index_page(&[0u8; 32]));

    let free = codec(&mock).find_free_id(127).await;
    assert_eq!(free, Some(TemplateId::from_wire(1)));
}

#[tokio::test]
async fn slot_zero_is_never_offered() {
    // Only slot 0 is free in the first byte; the scan must pass over it
    // and land on the first free slot inside the valid range.
    let mut bitmap = [0u8; 32];
    bitmap[0] = 0xFE;
    let mock = MockTransport::new();
    mock.push_response(build_index_page(&bitmap));

    let free = codec(&mock).find_free_id(127).await;
    assert_eq!(free, Some(TemplateId::from_wire(8)));
}

#[tokio::test]
async fn scan_skips_occupied_bits_lsb_first() {
    // Slots 0..=2 occupied in the first byte.
    let mut bitmap = [0u8; 32];
    bitmap[0] = 0b0000_0111;
    let mock = MockTransport::new();
    mock.push_response(build_index_page(&bitmap));

    let free = codec(&mock).find_free_id(127).await;
    assert_eq!(free, Some(TemplateId::from_wire(3)));
}

#[tokio::test]
async fn scan_crosses_byte_boundaries_in_order() {
    // First byte full, so the lowest free slot is bit 0 of byte 1.
    let mut bitmap = [0u8; 32];
    bitmap[0] = 0xFF;
    let mock = MockTransport::new();
    mock.push_response(build_index_page(&bitmap));

    let free = codec(&mock).find_free_id(127).await;
    assert_eq!(free, Some(TemplateId::from_wire(8)));
}

#[tokio::test]
async fn full_library_below_ceiling_yields_none() {
    // Slots 0..=127 occupied; the first zero bit sits at or above the
    // ceiling and must not be offered.
    let mut bitmap = [0u8; 32];
    for byte in bitmap.iter_mut().take(16) {
        *byte = 0xFF;
    }
    let mock = MockTransport::new();
    mock.push_response(build_index_page(&bitmap));

    let free = codec(&mock).find_free_id(127).await;
    assert_eq!(free, None);
}

#[tokio::test]
async fn scan_spans_multiple_pages() {
    // Page 0 entirely occupied, page 1 free at its fifth slot.
    let mut second = [0u8; 32];
    second[0] = 0b0000_1111;
    let mock = MockTransport::new();
    mock.push_response(build_index_page(&[0xFF; 32]));
    mock.push_response(build_index_page(&second));

    let free = codec(&mock).find_free_id(300).await;
    assert_eq!(free, Some(TemplateId::from_wire(260)));
}

#[tokio::test]
async fn failed_page_read_aborts_the_scan() {
    // A partial index view must never be treated as authoritative.
    let mock = MockTransport::new();
    mock.push_receive_timeout();

    let free = codec(&mock).find_free_id(127).await;
    assert_eq!(free, None);
}

#[tokio::test]
async fn failure_on_a_later_page_also_aborts() {
    let mock = MockTransport::new();
    mock.push_response(build_index_page(&[0xFF; 32]));
    mock.push_receive_timeout();

    let free = codec(&mock).find_free_id(300).await;
    assert_eq!(free, None);
}
