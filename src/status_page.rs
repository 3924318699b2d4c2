//! Risposte HTTP generate dinamicamente per la pagina di stato.
//!
//! Il rendering vero e proprio vive in `netcfg::status`; qui c'è solo
//! l'adattamento a picoserve.

use core::cell::RefCell;

use embassy_time::Instant;
use netcfg::net_config::NetConfig;
use netcfg::status::{status_html, status_json};

/// Pagina HTML con i parametri di rete attivi e l'uptime.
pub struct StatusPage {
    config: &'static NetConfig,
    message: RefCell<heapless::String<1024>>,
}

impl StatusPage {
    pub fn new(config: &'static NetConfig) -> Self {
        Self {
            config,
            message: RefCell::new(heapless::String::new()),
        }
    }
}

impl picoserve::response::Content for StatusPage {
    /// Specifica il tipo di contenuto della risposta HTTP (HTML)
    fn content_type(&self) -> &'static str {
        "text/html"
    }

    /// Genera l'HTML e lo salva in self.message, così write_content non
    /// deve rigenerarlo.
    ///
    /// # Ritorna
    /// * usize - Lunghezza del contenuto
    fn content_length(&self) -> usize {
        let html = status_html(self.config, Instant::now().as_secs());
        let len = html.len();
        *self.message.borrow_mut() = html;
        len
    }

    /// Scrive il contenuto già generato in content_length.
    ///
    /// # Argomenti
    /// * `writer` - Writer per scrivere il contenuto della risposta HTTP
    ///
    /// # Ritorna
    /// * Result<(), W::Error> - Risultato dell'operazione di scrittura
    async fn write_content<W: picoserve::io::Write>(self, mut writer: W) -> Result<(), W::Error> {
        let content = self.message.borrow().clone();
        writer.write_all(content.as_str().as_bytes()).await
    }
}

/// Documento JSON servito su `/config`.
pub struct StatusJson {
    config: &'static NetConfig,
    message: RefCell<heapless::String<512>>,
}

impl StatusJson {
    pub fn new(config: &'static NetConfig) -> Self {
        Self {
            config,
            message: RefCell::new(heapless::String::new()),
        }
    }
}

impl picoserve::response::Content for StatusJson {
    /// Specifica il tipo di contenuto della risposta HTTP (JSON)
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    /// Genera il JSON e lo salva in self.message.
    ///
    /// # Ritorna
    /// * usize - Lunghezza del contenuto
    fn content_length(&self) -> usize {
        let json = status_json(self.config, Instant::now().as_secs());
        let len = json.len();
        *self.message.borrow_mut() = json;
        len
    }

    /// Scrive il contenuto già generato in content_length.
    ///
    /// # Argomenti
    /// * `writer` - Writer per scrivere il contenuto della risposta HTTP
    ///
    /// # Ritorna
    /// * Result<(), W::Error> - Risultato dell'operazione di scrittura
    async fn write_content<W: picoserve::io::Write>(self, mut writer: W) -> Result<(), W::Error> {
        let content = self.message.borrow().clone();
        writer.write_all(content.as_str().as_bytes()).await
    }
}
