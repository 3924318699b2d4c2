//! Macro di utility per fermare il firmware con il LED acceso.

/// Se un messaggio di panic è stato salvato da panic-persist, accende il
/// LED, lo logga e ferma il firmware.
#[macro_export]
macro_rules! panic_led_loop {
    ($control:expr) => {
        if let Some(panic_message) = panic_persist::get_panic_message_utf8() {
            let _ = $control.gpio_set(0, true).await;
            log::error!("{panic_message}");
            loop {
                embassy_time::Timer::after_secs(5).await;
            }
        }
    };
}

/// Variante di [`panic_led_loop`] per quando il controller è già condiviso
/// dietro un mutex.
#[macro_export]
macro_rules! panic_led_loop_shared {
    ($shared_control:expr) => {
        if let Some(panic_message) = panic_persist::get_panic_message_utf8() {
            let mut control = $shared_control.0.lock().await;
            let _ = control.gpio_set(0, true).await;
            log::error!("{panic_message}");
            loop {
                embassy_time::Timer::after_secs(5).await;
            }
        }
    };
}

/// Ferma il firmware su una configurazione di rete non valida: logga
/// l'errore, accende il LED e dorme. La rete non viene avviata.
#[macro_export]
macro_rules! config_led_loop {
    ($control:expr, $err:expr) => {
        log::error!("network configuration rejected: {}", $err);
        let _ = $control.gpio_set(0, true).await;
        loop {
            embassy_time::Timer::after_secs(5).await;
        }
    };
}
