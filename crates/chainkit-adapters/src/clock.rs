use std::time::{SystemTime, UNIX_EPOCH};

use chainkit_core::{ClockPort, PortError};

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now_ms(&self) -> Result<u64, PortError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| PortError::Validation(format!("system clock before epoch: {e}")))?;
        Ok(now.as_millis() as u64)
    }
}
