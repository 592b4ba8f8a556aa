use std::sync::atomic::{AtomicBool, Ordering};

use crate::HexlightResult;

/// Smart plug that powers the display.
///
/// The plug is independent from the effect scheduler: toggling the power never
/// stops or starts an effect routine.
pub trait SmartPlug: Send + Sync {
    /// Returns `true` if the plug is switched on.
    fn is_on(&self) -> HexlightResult<bool>;
    /// Flips the plug state and returns the new one.
    fn toggle(&self) -> HexlightResult<bool>;
}

/// In-memory plug for setups without a real one.
#[derive(Debug, Default)]
pub struct VirtualPlug {
    is_on: AtomicBool,
}

impl VirtualPlug {
    pub fn new(is_on: bool) -> Self {
        Self {
            is_on: AtomicBool::new(is_on),
        }
    }
}

impl SmartPlug for VirtualPlug {
    fn is_on(&self) -> HexlightResult<bool> {
        Ok(self.is_on.load(Ordering::Acquire))
    }

    fn toggle(&self) -> HexlightResult<bool> {
        let was_on = self.is_on.fetch_xor(true, Ordering::AcqRel);
        log::info!("Virtual plug switched {}", if was_on { "off" } else { "on" });
        Ok(!was_on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_plug_toggle() {
        let plug = VirtualPlug::default();
        assert!(!plug.is_on().unwrap());
        assert!(plug.toggle().unwrap());
        assert!(plug.is_on().unwrap());
        assert!(!plug.toggle().unwrap());
    }
}
