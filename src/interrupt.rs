//! Signal handling for run cancellation.
//!
//! The first Ctrl+C sets a flag the stream pump polls between lines: the
//! engine is killed and the session fully reset, but nothing is torn down
//! mid-update. A second Ctrl+C hard-exits.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Global interrupt flag, registered once with SIGINT.
static INTERRUPT_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Register the SIGINT handler. Safe to call multiple times (only the first
/// call registers; subsequent calls are no-ops).
pub fn register_signal_handler() -> Result<()> {
    let flag = INTERRUPT_FLAG.get_or_init(|| Arc::new(AtomicBool::new(false)));

    // First handler: set the flag on first Ctrl+C
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(flag))?;

    // Second handler: if the flag is already set (i.e. second Ctrl+C), force-exit
    let flag_clone = Arc::clone(flag);
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGINT, move || {
            if flag_clone.load(Ordering::SeqCst) {
                // Second Ctrl+C — hard exit
                std::process::exit(130);
            }
        })?;
    }

    Ok(())
}

/// Check whether the interrupt flag is set.
pub fn is_interrupted() -> bool {
    INTERRUPT_FLAG
        .get()
        .map(|f| f.load(Ordering::SeqCst))
        .unwrap_or(false)
}

/// Clear the interrupt flag so the next run starts clean.
pub fn clear_interrupt() {
    if let Some(flag) = INTERRUPT_FLAG.get() {
        flag.store(false, Ordering::SeqCst);
    }
}
