// crates/gifconv-media/src/reassemble.rs
//
// Reassembler: waits for exactly `expected` results and lays them out by
// frame index. `expected` must be the number of frames the producer actually
// submitted, never the container's declared count, or the wait can outlast
// the workers. If the workers do all exit early the result channel
// disconnects and collection fails instead of blocking.

use crossbeam_channel::Receiver;

use gifconv_core::media_types::EncodedImage;

use crate::error::ReassembleError;
use crate::worker::WorkResult;

pub struct Reassembler {
    expected: usize,
}

impl Reassembler {
    pub fn new(expected: usize) -> Self {
        Self { expected }
    }

    /// Block until `expected` results have arrived, then return the images in
    /// index order 0..expected. The first processing failure aborts the wait.
    pub fn collect(&self, rx: &Receiver<WorkResult>) -> Result<Vec<EncodedImage>, ReassembleError> {
        let expected = self.expected;
        let mut slots: Vec<Option<EncodedImage>> = (0..expected).map(|_| None).collect();

        for received in 0..expected {
            let frame = rx.recv()
                .map_err(|_| ReassembleError::Disconnected { received, expected })??;
            let slot = slots.get_mut(frame.index)
                .ok_or(ReassembleError::OutOfRange { index: frame.index, expected })?;
            if slot.is_some() {
                return Err(ReassembleError::DuplicateIndex(frame.index));
            }
            *slot = Some(frame.image);
        }

        // expected distinct in-range indices fill every slot.
        slots.into_iter()
            .enumerate()
            .map(|(i, s)| s.ok_or(ReassembleError::Disconnected { received: i, expected }))
            .collect()
    }
}
