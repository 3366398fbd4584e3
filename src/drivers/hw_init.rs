//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO directions, the button edge interrupt, and the
//! metering UART using raw ESP-IDF sys calls.  Called once from `main()`
//! before the event loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    UartInitFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "meter UART init failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the event loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_meter_uart()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: (1u64 << pins::RELAY_GPIO) | (1u64 << pins::LED_GPIO),
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    // Relay released, LED off (active-low) until the core says otherwise.
    unsafe {
        gpio_set_level(pins::RELAY_GPIO, 0);
        gpio_set_level(pins::LED_GPIO, 1);
    }
    info!("hw_init: relay + LED outputs configured");
    Ok(())
}

// ── Button ISR ────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn button_edge_isr(_arg: *mut core::ffi::c_void) {
    crate::drivers::button::button_isr_handler();
}

/// Install the GPIO ISR service and hook the button's falling edge.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    unsafe {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pins::BUTTON_GPIO,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
        };
        let ret = gpio_config(&cfg);
        if ret != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(ret));
        }

        let ret = gpio_install_isr_service(0);
        // ESP_ERR_INVALID_STATE means the service is already installed.
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let ret = gpio_isr_handler_add(
            pins::BUTTON_GPIO,
            Some(button_edge_isr),
            core::ptr::null_mut(),
        );
        if ret != ESP_OK {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
    }
    info!("hw_init: button ISR armed (GPIO{})", pins::BUTTON_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    Ok(())
}

// ── Metering UART ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_meter_uart() -> Result<(), HwInitError> {
    let uart_cfg = uart_config_t {
        baud_rate: pins::METER_UART_BAUD as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_EVEN,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    unsafe {
        let ret = uart_param_config(pins::METER_UART_NUM as i32, &uart_cfg);
        if ret != ESP_OK {
            return Err(HwInitError::UartInitFailed(ret));
        }
        let ret = uart_set_pin(
            pins::METER_UART_NUM as i32,
            UART_PIN_NO_CHANGE,
            pins::METER_UART_RX_GPIO,
            UART_PIN_NO_CHANGE,
            UART_PIN_NO_CHANGE,
        );
        if ret != ESP_OK {
            return Err(HwInitError::UartInitFailed(ret));
        }
        let ret = uart_driver_install(pins::METER_UART_NUM as i32, 256, 0, 0, core::ptr::null_mut(), 0);
        if ret != ESP_OK {
            return Err(HwInitError::UartInitFailed(ret));
        }
    }
    info!("hw_init: meter UART configured ({} baud)", pins::METER_UART_BAUD);
    Ok(())
}

// ── Runtime helpers ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_write(gpio: i32, high: bool) {
    unsafe {
        gpio_set_level(gpio, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_gpio: i32, _high: bool) {}

/// Non-blocking read of whatever the metering chip has buffered.
/// Returns the number of bytes copied into `buf`.
#[cfg(target_os = "espidf")]
pub fn uart_read(uart_num: u32, buf: &mut [u8]) -> Result<usize, i32> {
    let n = unsafe {
        uart_read_bytes(
            uart_num as i32,
            buf.as_mut_ptr().cast(),
            buf.len() as u32,
            0, // zero ticks — never block the control loop
        )
    };
    if n < 0 { Err(n) } else { Ok(n as usize) }
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_read(_uart_num: u32, _buf: &mut [u8]) -> Result<usize, i32> {
    Ok(0)
}
