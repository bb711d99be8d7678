/// Compute device a network's tensors can live on.
///
/// Device placement is a best-effort, one-time move per gradient call:
/// requesting the accelerator when none is available is not an error and
/// silently falls back to the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Accelerator,
}

impl Device {
    /// Whether an accelerated backend is compiled into this build.
    ///
    /// The crate currently ships CPU kernels only; this is the hook a
    /// GPU/NPU backend would flip.
    pub fn accelerator_available() -> bool {
        false
    }

    /// Pick the device for a call. Falls back to [`Device::Cpu`] when the
    /// accelerator is requested but unavailable.
    pub fn select(use_accelerator: bool) -> Device {
        if use_accelerator && Self::accelerator_available() {
            Device::Accelerator
        } else {
            Device::Cpu
        }
    }
}
