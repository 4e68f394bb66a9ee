//! Static environment capability probes.
//!
//! Data-only inspections: nothing here touches the engine or any
//! hardware. Callers use these to decide up front whether to offer
//! scanning at all, and whether to apply touch-tablet UI affordances.

/// Whether this environment can run the decoding engine.
///
/// The scan loop drives the engine from a dedicated thread, so any
/// target without native threads (wasm) cannot host it.
pub fn engine_supported() -> bool {
    !cfg!(target_family = "wasm")
}

/// Whether this device belongs to a known touch-tablet class.
///
/// Target-OS inspection, with an `OPTISCAN_FORCE_TABLET` environment
/// override for deployments (kiosks, convertibles) the OS probe
/// cannot classify.
pub fn is_touch_tablet() -> bool {
    if matches!(
        std::env::var("OPTISCAN_FORCE_TABLET").as_deref(),
        Ok("1") | Ok("true")
    ) {
        return true;
    }
    cfg!(any(target_os = "ios", target_os = "android"))
}
