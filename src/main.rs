//! Questa applicazione per Raspberry Pico 2 W porta su la rete WiFi con un
//! indirizzo IPv4 statico letto da una configurazione embedded (SSID,
//! password, IP, gateway, subnet mask, server DNS) e espone una piccola
//! pagina di stato via HTTP attraverso il crate 'picoserve'.
//! La configurazione viene parsata e validata una volta sola all'avvio;
//! con una configurazione non valida la rete non parte.
//! Viene anche gestito il LED collegato al chip WiFi CYW43 per segnalare
//! lo stato della connessione.
//! Viene impostata la modalità di compilazione con nightly (vedi README).

#![no_std]
#![no_main]
#![feature(impl_trait_in_assoc_type)]

mod app_props;
mod app_state;
mod status_page;
#[macro_use]
mod utility;

use crate::app_props::AppProps;
use crate::app_state::{AppState, SharedNetConfig};
use cyw43::{Control, JoinOptions};
use cyw43_pio::{PioSpi, RM2_CLOCK_DIVIDER};
use defmt::*;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_net::Ipv4Cidr;
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIO0, USB};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker, Timer};
use netcfg::configuration::CONFIG;
use netcfg::net_config::NetConfig;
use panic_persist as _;
use picoserve::{AppRouter, AppWithStateBuilder, make_static};
use static_cell::StaticCell;

const WEB_TASK_POOL_SIZE: usize = 10;
const UPTIME_LOG_SECS: u64 = 60;

// Program metadata for `picotool info`.
// This isn't needed, but it's recommended to have these minimal entries.
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"pico-netconfig"),
    embassy_rp::binary_info::rp_program_description!(
        c"Bring-up della rete con IP statico e pagina di stato HTTP."
    ),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

// Interrupt handlers
bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

bind_interrupts!(struct UsbIrqs {
    USBCTRL_IRQ => UsbInterruptHandler<USB>;
});

/// Struttura per condividere il controller tra task embassy diversi
#[derive(Clone, Copy)]
pub struct SharedControl(&'static Mutex<CriticalSectionRawMutex, Control<'static>>);

/// Entry point principale secondo Embassy
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // Parte il logger su USB
    let driver = Driver::new(p.USB, UsbIrqs);
    spawner.must_spawn(logger_task(driver)); //<---- 1
    if let Some(panic_message) = panic_persist::get_panic_message_utf8() {
        log::error!("{panic_message}");
        loop {
            embassy_time::Timer::after_secs(5).await;
        }
    }

    // Firmware files for the CYW43xxx WiFi chip, flashed once at hardcoded
    // addresses (see README):
    //     probe-rs download cyw43-firmware/43439A0.bin --binary-format bin --chip RP235x --base-address 0x10100000
    //     probe-rs download cyw43-firmware/43439A0_clm.bin --binary-format bin --chip RP235x --base-address 0x10140000
    let fw = unsafe { core::slice::from_raw_parts(0x10100000 as *const u8, 230321) };
    let clm = unsafe { core::slice::from_raw_parts(0x10140000 as *const u8, 4752) };

    // To bake the firmware into the program instead, put the files in
    // cyw43-firmware/ and use:
    //let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    //let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs); // <---- PIO0 for SPI communication
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        // SPI communication won't work if the speed is too high, so we use a divider larger than `DEFAULT_CLOCK_DIVIDER`.
        // See: https://github.com/embassy-rs/embassy/issues/3960.
        RM2_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;

    // parte il task di gestione del chip WiFi
    spawner.must_spawn(cyw43_task(runner)); //<---- 2
    panic_led_loop!(control);

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    // Parsa e valida la configurazione di rete prima di avviare lo stack.
    let net_config = match NetConfig::parse(CONFIG) {
        Ok(config) => config,
        Err(err) => {
            config_led_loop!(control, err);
        }
    };
    if let Err(err) = net_config.validate() {
        config_led_loop!(control, err);
    }
    // validate() ha già rifiutato le mask non contigue o tutte zero
    let prefix_len = net_config.prefix_len().unwrap_or(24);
    let net_config: &'static NetConfig = make_static!(NetConfig, net_config);
    log::info!(
        "Network configuration: SSID '{}', {}/{} via {}",
        net_config.ssid,
        net_config.local_addr,
        prefix_len,
        net_config.gateway
    );

    // Genera un random seed per il network stack
    let seed: u64 = RoscRng.next_u64();
    log::info!("Random seed value seeded to {}", seed);

    let (stack, runner) = embassy_net::new(
        net_device,
        embassy_net::Config::ipv4_static(embassy_net::StaticConfigV4 {
            address: Ipv4Cidr::new(net_config.local_addr, prefix_len),
            gateway: Some(net_config.gateway),
            dns_servers: net_config.dns_servers().collect(),
        }),
        make_static!(
            embassy_net::StackResources::<WEB_TASK_POOL_SIZE>,
            embassy_net::StackResources::new()
        ),
        seed,
    );

    // parte il task di gestione del network
    spawner.must_spawn(net_task(runner)); //<---- 3
    panic_led_loop!(control);

    // Tenta il join all'access point; il LED segnala il progresso.
    led_connecting(&mut control, 2).await;
    while let Err(err) = control
        .join(
            net_config.ssid,
            JoinOptions::new(net_config.password.as_bytes()),
        )
        .await
    {
        log::warn!(
            "join to '{}' failed with status={}",
            net_config.ssid,
            err.status
        );
        led_connect_failed(&mut control).await;
    }
    led_connected(&mut control).await;

    log::info!("waiting for the link to come up...");
    stack.wait_config_up().await;

    // And now we can use it!
    log::info!("Stack is up!");
    // Recupera la configurazione IPv4 attiva
    if let Some(config) = stack.config_v4() {
        let ip = config.address.address();
        log::info!("Assigned IP: {ip}");
    }

    // Definiamo un controllore comune da condividere tra i task
    let shared_control = SharedControl(
        make_static!(Mutex<CriticalSectionRawMutex, Control<'static>>, Mutex::new(control)),
    );

    // Fa partire l'heartbeat del LED collegato al cyw43
    spawner.must_spawn(heartbeat_task(shared_control)); //<---- 4
    panic_led_loop_shared!(shared_control);

    // Fa partire il log periodico dell'uptime
    spawner.must_spawn(uptime_task());
    panic_led_loop_shared!(shared_control);

    let app = make_static!(AppRouter<AppProps>, AppProps.build_app());

    let server_config = make_static!(
        picoserve::Config::<Duration>,
        picoserve::Config::new(picoserve::Timeouts {
            start_read_request: Some(Duration::from_secs(5)),
            persistent_start_read_request: Some(Duration::from_secs(1)),
            read_request: Some(Duration::from_secs(1)),
            write: Some(Duration::from_secs(1)),
        })
        .keep_connection_alive()
    );

    // Fa partire i task del web server per rispondere a diverse richieste in parallelo,
    for id in 0..WEB_TASK_POOL_SIZE - 2 {
        unwrap!(spawner.spawn(web_task(
            id,
            stack,
            app,
            server_config,
            AppState {
                shared_control,
                net_config: SharedNetConfig(net_config),
            },
        )));
    }

    log::info!(
        "Status server running on http://{}/",
        stack.config_v4().unwrap().address.address()
    );
}

/// Blink pattern: tentativo di connessione in corso (500ms).
async fn led_connecting(control: &mut Control<'_>, cycles: u32) {
    for _ in 0..cycles {
        control.gpio_set(0, true).await;
        Timer::after(Duration::from_millis(500)).await;
        control.gpio_set(0, false).await;
        Timer::after(Duration::from_millis(500)).await;
    }
}

/// Blink pattern: connessione fallita (100ms x5).
async fn led_connect_failed(control: &mut Control<'_>) {
    for _ in 0..5 {
        control.gpio_set(0, true).await;
        Timer::after(Duration::from_millis(100)).await;
        control.gpio_set(0, false).await;
        Timer::after(Duration::from_millis(100)).await;
    }
}

/// Connessione riuscita: LED acceso fisso per 2s.
async fn led_connected(control: &mut Control<'_>) {
    control.gpio_set(0, true).await;
    Timer::after(Duration::from_secs(2)).await;
    control.gpio_set(0, false).await;
}

// Tasks that run in the background:
/// WIFI task runner
///
/// # Argomenti
/// * `runner` - cyw43 runner
///
/// # Ritorna
/// * ! - Non ritorna mai
#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
/// Network task runner
///
/// # Argomenti
/// * `runner` - embassy net runner
///
/// # Ritorna
/// * ! - Non ritorna mai
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
/// Logger task for USB
///
/// # Argomenti
/// * `driver` - USB driver
///
/// # Ritorna
/// * ! - Non ritorna mai
async fn logger_task(driver: Driver<'static, USB>) {
    embassy_usb_logger::run!(1024, log::LevelFilter::Info, driver);
}

#[embassy_executor::task]
/// Heartbeat: toggla il LED del CYW43 per segnalare che il firmware è vivo
///
/// # Argomenti
/// * `shared_control` - Controller condiviso per il WiFi
///
/// # Ritorna
/// * ! - Non ritorna mai
async fn heartbeat_task(shared_control: SharedControl) {
    let delay = Duration::from_millis(250);
    loop {
        shared_control.0.lock().await.gpio_set(0, true).await;
        Timer::after(delay).await;
        shared_control.0.lock().await.gpio_set(0, false).await;
        Timer::after(delay).await;
    }
}

#[embassy_executor::task]
/// Timer task che logga l'uptime una volta al minuto
///
/// # Ritorna
/// * ! - Non ritorna mai
async fn uptime_task() {
    let mut ticker = Ticker::every(Duration::from_secs(UPTIME_LOG_SECS));
    loop {
        ticker.next().await;
        log::info!("[uptime {}s]", Instant::now().as_secs());
    }
}

#[embassy_executor::task(pool_size = WEB_TASK_POOL_SIZE)]
/// Web server task che risponde alle richieste HTTP
///
/// # Argomenti
///
/// * `id` - ID del task
/// * `stack` - Stack di rete
/// * `app` - Router dell'applicazione
/// * `config` - Configurazione del server
/// * `state` - Stato dell'applicazione
async fn web_task(
    id: usize,
    stack: embassy_net::Stack<'static>,
    app: &'static AppRouter<AppProps>,
    config: &'static picoserve::Config<Duration>,
    state: AppState,
) -> ! {
    let port = 80;
    let mut tcp_rx_buffer = [0; 1024];
    let mut tcp_tx_buffer = [0; 1024];
    let mut http_buffer = [0; 2048];

    picoserve::listen_and_serve_with_state(
        id,
        app,
        config,
        stack,
        port,
        &mut tcp_rx_buffer,
        &mut tcp_tx_buffer,
        &mut http_buffer,
        &state,
    )
    .await
}
