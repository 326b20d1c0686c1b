//! Request/response codec over a [`SensorTransport`].
//!
//! One call, one command frame, one fixed-size response window. The codec
//! carries no retry logic and no cross-call state; the session machine
//! above it owns pacing and recovery.

use std::time::Duration;

use fingate_core::{
    Error, Result, TemplateId,
    constants::{DEFAULT_RECV_TIMEOUT_MS, DEFAULT_SEND_TIMEOUT_MS, INDEX_PAGE_SLOTS},
};
use tracing::{debug, trace, warn};

use crate::command::{AckOutcome, CharBuffer, Instruction};
use crate::packet::{ResponsePacket, encode_command};
use crate::transport::SensorTransport;

/// Size of one index-table bitmap in a `ReadIndexTable` response.
const INDEX_BITMAP_BYTES: usize = 32;

/// Result of a 1:N library search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    /// The captured template matched this stored slot.
    Match(TemplateId),

    /// The search completed but nothing in the library matched.
    NoMatch,
}

/// Command-level driver for the fingerprint sensor.
///
/// Generic over the transport so the session machines run identically
/// against real serial hardware and [`crate::MockTransport`].
#[derive(Debug)]
pub struct SensorCodec<T> {
    transport: T,
    send_timeout: Duration,
    recv_timeout: Duration,
}

impl<T: SensorTransport> SensorCodec<T> {
    /// Create a codec with the deployed timing: a short write deadline and
    /// a long read deadline covering the sensor's image processing.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            send_timeout: Duration::from_millis(DEFAULT_SEND_TIMEOUT_MS),
            recv_timeout: Duration::from_millis(DEFAULT_RECV_TIMEOUT_MS),
        }
    }

    /// Override both deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, send: Duration, recv: Duration) -> Self {
        self.send_timeout = send;
        self.recv_timeout = recv;
        self
    }

    /// Issue one command and read its response window.
    ///
    /// # Errors
    /// Propagates transport failures and frame-level protocol errors
    /// unchanged; the caller decides whether a pass is retried.
    pub async fn execute(
        &mut self,
        instruction: Instruction,
        params: &[u8],
    ) -> Result<ResponsePacket> {
        let frame = encode_command(instruction, params)?;
        trace!(%instruction, frame_len = frame.len(), "sending command");
        self.transport.send(&frame, self.send_timeout).await?;

        let raw = self
            .transport
            .receive(instruction.response_len(), self.recv_timeout)
            .await?;
        let packet = ResponsePacket::parse(&raw)?;
        trace!(
            %instruction,
            confirmation = format_args!("0x{:02X}", packet.confirmation),
            "response"
        );
        Ok(packet)
    }

    /// Issue a command whose response carries only a confirmation byte.
    async fn execute_ack(
        &mut self,
        instruction: Instruction,
        params: &[u8],
    ) -> Result<AckOutcome> {
        let packet = self.execute(instruction, params).await?;
        Ok(AckOutcome::from_confirmation(packet.confirmation))
    }

    /// Capture the current image into the sensor's image buffer.
    pub async fn get_image(&mut self) -> Result<AckOutcome> {
        self.execute_ack(Instruction::GetImage, &[]).await
    }

    /// Convert the image buffer into the given character buffer.
    pub async fn image_to_template(&mut self, buffer: CharBuffer) -> Result<AckOutcome> {
        self.execute_ack(Instruction::ImageToTemplate, &[buffer.code()])
            .await
    }

    /// Precise-match the first character buffer against one stored slot.
    pub async fn verify(&mut self, id: TemplateId) -> Result<AckOutcome> {
        let slot = id.to_be_bytes();
        self.execute_ack(Instruction::Verify, &[CharBuffer::First.code(), slot[0], slot[1]])
            .await
    }

    /// 1:N search of the first character buffer over `page_count` slots
    /// starting at slot zero.
    ///
    /// # Errors
    /// Returns `Error::Protocol` when the sensor acks with anything other
    /// than a hit or an explicit no-match.
    pub async fn search(&mut self, page_count: u16) -> Result<SearchResult> {
        let count = page_count.to_be_bytes();
        let params = [CharBuffer::First.code(), 0x00, 0x00, count[0], count[1]];
        let packet = self.execute(Instruction::Search, &params).await?;

        match AckOutcome::from_confirmation(packet.confirmation) {
            AckOutcome::Ok => {
                let id = TemplateId::from_wire(packet.param_u16(0)?);
                debug!(template = %id, "search hit");
                Ok(SearchResult::Match(id))
            }
            AckOutcome::NoMatch => Ok(SearchResult::NoMatch),
            outcome => Err(Error::Protocol(format!(
                "search failed with confirmation 0x{:02X} ({outcome})",
                packet.confirmation
            ))),
        }
    }

    /// Combine both character buffers into a storable model.
    pub async fn create_model(&mut self) -> Result<AckOutcome> {
        self.execute_ack(Instruction::CreateModel, &[]).await
    }

    /// Store the combined model at `id`.
    pub async fn store_template(
        &mut self,
        buffer: CharBuffer,
        id: TemplateId,
    ) -> Result<AckOutcome> {
        let slot = id.to_be_bytes();
        self.execute_ack(Instruction::StoreTemplate, &[buffer.code(), slot[0], slot[1]])
            .await
    }

    /// Read one 256-slot occupancy bitmap of the template index.
    ///
    /// # Errors
    /// Any non-`Ok` confirmation or a short bitmap is `Error::Protocol`.
    pub async fn read_index_page(&mut self, page: u8) -> Result<[u8; INDEX_BITMAP_BYTES]> {
        let packet = self.execute(Instruction::ReadIndexTable, &[page]).await?;
        if AckOutcome::from_confirmation(packet.confirmation) != AckOutcome::Ok {
            return Err(Error::Protocol(format!(
                "index page {page} read failed with confirmation 0x{:02X}",
                packet.confirmation
            )));
        }
        let bitmap: [u8; INDEX_BITMAP_BYTES] =
            packet.params().try_into().map_err(|_| {
                Error::Protocol(format!(
                    "index page {page} bitmap is {} bytes",
                    packet.params().len()
                ))
            })?;
        Ok(bitmap)
    }

    /// Find the lowest free template slot in the valid id range.
    ///
    /// Scans index pages in ascending order, bytes in ascending order, and
    /// bits least-significant first, so enrollment always fills the library
    /// from the bottom. Candidates go through [`TemplateId::new`], so the
    /// same range rule that rejects a slot at validation time governs
    /// allocation: slot zero sits below the floor and is skipped, and the
    /// scan stops at `max_id`. Returns `None` when every valid slot is
    /// occupied, and also when any page read fails: a partial view of the
    /// index must never cause a store over an occupied slot.
    pub async fn find_free_id(&mut self, max_id: u16) -> Option<TemplateId> {
        let pages = max_id.div_ceil(INDEX_PAGE_SLOTS);
        for page in 0..pages {
            let bitmap = match self.read_index_page(page as u8).await {
                Ok(bitmap) => bitmap,
                Err(err) => {
                    warn!(page, error = %err, "index scan aborted");
                    return None;
                }
            };
            for (byte_idx, &byte) in bitmap.iter().enumerate() {
                if byte == 0xFF {
                    continue;
                }
                for bit in 0..8u16 {
                    if byte & (1 << bit) != 0 {
                        continue;
                    }
                    let id = page * INDEX_PAGE_SLOTS + (byte_idx as u16) * 8 + bit;
                    if id >= max_id {
                        return None;
                    }
                    if let Ok(slot) = TemplateId::new(id, max_id) {
                        return Some(slot);
                    }
                }
            }
        }
        None
    }

    /// Consume the codec and recover its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ACK_NO_FINGER, ACK_NO_MATCH, ACK_OK};
    use crate::testing::build_ack;
    use crate::transport::MockTransport;

    fn codec_with(mock: &MockTransport) -> SensorCodec<MockTransport> {
        SensorCodec::new(mock.clone())
    }

    #[tokio::test]
    async fn test_get_image_maps_no_finger() {
        let mock = MockTransport::new();
        mock.push_response(build_ack(ACK_NO_FINGER, &[]));
        let mut codec = codec_with(&mock);
        assert_eq!(codec.get_image().await.unwrap(), AckOutcome::NoFinger);
    }

    #[tokio::test]
    async fn test_search_hit_carries_slot() {
        let mock = MockTransport::new();
        mock.push_response(build_ack(ACK_OK, &[0x00, 0x07, 0x00, 0x80]));
        let mut codec = codec_with(&mock);
        let result = codec.search(163).await.unwrap();
        assert_eq!(result, SearchResult::Match(TemplateId::from_wire(7)));

        // Search params: buffer 1, start 0, count 163.
        let sent = mock.sent_frames();
        assert_eq!(&sent[0][10..15], &[0x01, 0x00, 0x00, 0x00, 0xA3]);
    }

    #[tokio::test]
    async fn test_search_no_match() {
        let mock = MockTransport::new();
        mock.push_response(build_ack(ACK_NO_MATCH, &[0x00, 0x00, 0x00, 0x00]));
        let mut codec = codec_with(&mock);
        assert_eq!(codec.search(163).await.unwrap(), SearchResult::NoMatch);
    }

    #[tokio::test]
    async fn test_search_error_ack_is_protocol_error() {
        let mock = MockTransport::new();
        mock.push_response(build_ack(0x01, &[0x00, 0x00, 0x00, 0x00]));
        let mut codec = codec_with(&mock);
        assert!(matches!(codec.search(163).await, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn test_store_template_params() {
        let mock = MockTransport::new();
        mock.push_response(build_ack(ACK_OK, &[]));
        let mut codec = codec_with(&mock);
        let id = TemplateId::from_wire(0x012A);
        assert_eq!(
            codec.store_template(CharBuffer::Second, id).await.unwrap(),
            AckOutcome::Ok
        );
        let sent = mock.sent_frames();
        assert_eq!(&sent[0][10..13], &[0x02, 0x01, 0x2A]);
    }

    #[tokio::test]
    async fn test_verify_targets_one_slot() {
        let mock = MockTransport::new();
        mock.push_response(build_ack(ACK_NO_MATCH, &[]));
        let mut codec = codec_with(&mock);
        let outcome = codec.verify(TemplateId::from_wire(9)).await.unwrap();
        assert_eq!(outcome, AckOutcome::NoMatch);
        let sent = mock.sent_frames();
        assert_eq!(sent[0][9], 0x03);
        assert_eq!(&sent[0][10..13], &[0x01, 0x00, 0x09]);
    }

    #[tokio::test]
    async fn test_transport_timeout_propagates() {
        let mock = MockTransport::new();
        mock.push_receive_timeout();
        let mut codec = codec_with(&mock);
        assert!(matches!(
            codec.get_image().await,
            Err(Error::TransportTimeout { .. })
        ));
    }
}
