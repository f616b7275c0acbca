//! Fixed-layout command frame: `[SOP, CMD, EOP]`.

use crate::config::{FRAME_LEN, PACKET_CMD_POS, PACKET_EOP, PACKET_EOP_POS, PACKET_SOP, PACKET_SOP_POS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum FrameError {
    BadStart(u8),
    BadEnd(u8),
}

/// Check both markers and return the command byte.
pub fn decode(frame: &[u8; FRAME_LEN]) -> Result<u8, FrameError> {
    let sop = frame[PACKET_SOP_POS];
    if sop != PACKET_SOP {
        return Err(FrameError::BadStart(sop));
    }
    let eop = frame[PACKET_EOP_POS];
    if eop != PACKET_EOP {
        return Err(FrameError::BadEnd(eop));
    }
    Ok(frame[PACKET_CMD_POS])
}
