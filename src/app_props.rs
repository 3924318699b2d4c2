use crate::app_state::{AppState, SharedNetConfig};
use crate::status_page::{StatusJson, StatusPage};
use picoserve::AppWithStateBuilder;
use picoserve::extract::State;
use picoserve::routing::{PathRouter, get};

pub struct AppProps;

// Costruisce il router dell'applicazione con le rotte definite
impl AppWithStateBuilder for AppProps {
    type State = AppState;
    type PathRouter = impl PathRouter<AppState>;

    /// Costruisce il router dell'applicazione con gli endpoint.
    ///
    /// # Ritorna
    /// * picoserve::Router<Self::PathRouter, Self::State>
    fn build_app(self) -> picoserve::Router<Self::PathRouter, Self::State> {
        picoserve::Router::new()
            .route(
                "/",
                get(|State(SharedNetConfig(config)): State<SharedNetConfig>| async move {
                    StatusPage::new(config)
                }),
            )
            .route(
                "/config",
                get(|State(SharedNetConfig(config)): State<SharedNetConfig>| async move {
                    StatusJson::new(config)
                }),
            )
    }
}
