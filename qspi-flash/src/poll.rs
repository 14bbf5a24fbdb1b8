use crate::{error::QspiFlashError, peripheral::FlashStatus};

/// Blocking wait for the busy flag to clear, bounded by a number of status reads.
///
/// The bound is an iteration count rather than a time, so how long it actually waits
/// depends on how fast the status source answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusPoller {
    max_polls: u32,
}

impl StatusPoller {
    pub fn new(max_polls: u32) -> Self {
        StatusPoller { max_polls }
    }

    pub fn max_polls(&self) -> u32 {
        self.max_polls
    }

    /// Sample `status` until it reports not busy.
    ///
    /// A failed sample is returned straight away, there is no retry. Returns
    /// [QspiFlashError::Timeout] once `max_polls` samples all came back busy.
    pub fn wait_ready<E, F>(&self, mut status: F) -> Result<(), QspiFlashError<E>>
    where
        F: FnMut() -> Result<FlashStatus, E>,
    {
        for _ in 0..self.max_polls {
            let sample = status().map_err(QspiFlashError::Peripheral)?;
            if !sample.write_in_progress {
                return Ok(());
            }
        }
        warn!("Device still busy after {} polls", self.max_polls);
        Err(QspiFlashError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    const BUSY: FlashStatus = FlashStatus {
        write_in_progress: true,
    };
    const READY: FlashStatus = FlashStatus {
        write_in_progress: false,
    };

    #[test]
    fn test_ready_immediately() {
        let mut polls = 0;
        let result = StatusPoller::new(10).wait_ready(|| -> Result<_, ()> {
            polls += 1;
            Ok(READY)
        });
        assert_eq!(result, Ok(()));
        assert_eq!(polls, 1);
    }

    #[test]
    fn test_ready_after_busy() {
        let mut polls = 0;
        let result = StatusPoller::new(10).wait_ready(|| -> Result<_, ()> {
            polls += 1;
            Ok(if polls < 4 { BUSY } else { READY })
        });
        assert_eq!(result, Ok(()));
        assert_eq!(polls, 4);
    }

    /// A device that never clears busy must not hang
    #[test]
    fn test_timeout() {
        let mut polls = 0;
        let result = StatusPoller::new(25).wait_ready(|| -> Result<_, ()> {
            polls += 1;
            Ok(BUSY)
        });
        assert_eq!(result, Err(QspiFlashError::Timeout));
        assert_eq!(polls, 25);
    }

    #[test]
    fn test_status_error_not_retried() {
        let mut polls = 0;
        let result = StatusPoller::new(10).wait_ready(|| {
            polls += 1;
            Err::<FlashStatus, _>("bus fault")
        });
        assert_eq!(result, Err(QspiFlashError::Peripheral("bus fault")));
        assert_eq!(polls, 1);
    }

    #[test]
    fn test_zero_bound() {
        let result = StatusPoller::new(0).wait_ready(|| -> Result<_, ()> { Ok(READY) });
        assert_eq!(result, Err(QspiFlashError::Timeout));
    }
}
