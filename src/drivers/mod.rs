//! Board-level drivers (ESP-IDF only, host stubs elsewhere).

pub mod hw_init;
