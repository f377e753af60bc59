//! One-shot interrupt wiring for the expander's INTA line.
//!
//! Configures the INTA GPIO as a pulled-up input, installs the per-pin ISR
//! service and registers a falling-edge handler using raw ESP-IDF sys
//! calls.  Called once from `main()` before the event loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot interrupt setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    HandlerAddFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::HandlerAddFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

// ── ISR ───────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn expander_gpio_isr(_arg: *mut core::ffi::c_void) {
    // INTA stays low until INTCAP is read; mask the pin until the loop
    // has serviced the expander.
    unsafe {
        gpio_intr_disable(pins::EXPANDER_INT_GPIO);
    }
    crate::events::expander_isr();
}

// ── Setup ─────────────────────────────────────────────────────

/// Configure INTA and register its falling-edge handler.
#[cfg(target_os = "espidf")]
pub fn init_expander_interrupt() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::EXPANDER_INT_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    // SAFETY: called once from main() before the event loop; the handler
    // is a static function that only stores to an atomic.
    unsafe {
        let ret = gpio_config(&cfg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }

        // ESP_ERR_INVALID_STATE means the service is already installed.
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        gpio_set_intr_type(pins::EXPANDER_INT_GPIO, gpio_int_type_t_GPIO_INTR_NEGEDGE);
        let ret = gpio_isr_handler_add(
            pins::EXPANDER_INT_GPIO,
            Some(expander_gpio_isr),
            core::ptr::null_mut(),
        );
        if ret != ESP_OK as i32 {
            return Err(HwInitError::HandlerAddFailed(ret));
        }
        gpio_intr_enable(pins::EXPANDER_INT_GPIO);
    }
    info!("hw_init: expander INTA on GPIO {} (negedge)", pins::EXPANDER_INT_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_expander_interrupt() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): expander interrupt skipped");
    Ok(())
}

/// Re-enable INTA after the loop has serviced the expander.
#[cfg(target_os = "espidf")]
pub fn reenable_expander_interrupt() {
    // SAFETY: pin was configured by init_expander_interrupt().
    unsafe {
        gpio_intr_enable(pins::EXPANDER_INT_GPIO);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn reenable_expander_interrupt() {}

/// INTA is active-low: a low level means the expander still holds an
/// un-serviced interrupt.
#[cfg(target_os = "espidf")]
pub fn expander_int_asserted() -> bool {
    // SAFETY: read-only GPIO level query.
    unsafe { gpio_get_level(pins::EXPANDER_INT_GPIO) == 0 }
}

#[cfg(not(target_os = "espidf"))]
pub fn expander_int_asserted() -> bool {
    false
}
