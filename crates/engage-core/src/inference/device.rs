//! Inference device selection.

use candle_core::Device;
use tracing::debug;

/// Picks the device models are loaded onto.
///
/// GPU backends are only tried when the matching cargo feature is enabled;
/// otherwise, or when no GPU is present, inference runs on the CPU.
#[must_use]
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                debug!("inference device: metal");
                return device;
            }
            Err(e) => debug!("metal unavailable: {e}"),
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                debug!("inference device: cuda");
                return device;
            }
            Err(e) => debug!("cuda unavailable: {e}"),
        }
    }

    debug!("inference device: cpu");
    Device::Cpu
}
