//! # Application State Management
//!
//! This module defines the shared application state accessible to all HTTP handlers.

use crate::SharedControl;
use netcfg::net_config::NetConfig;

/// Immutable network configuration shared with HTTP handlers.
///
/// The record is parsed and validated once during bring-up; handlers only
/// ever read it.
#[derive(Clone, Copy)]
pub struct SharedNetConfig(pub &'static NetConfig);

/// Application state shared across Embassy tasks and HTTP handlers.
pub struct AppState {
    /// Shared WiFi controller for CYW43 chip operations
    pub shared_control: SharedControl,
    /// Network configuration the firmware was brought up with
    pub net_config: SharedNetConfig,
}

impl picoserve::extract::FromRef<AppState> for SharedControl {
    /// Extracts the shared WiFi controller from application state.
    ///
    /// # Arguments
    ///
    /// * `state` - Reference to the application state
    ///
    /// # Returns
    ///
    /// Copy of the shared WiFi controller wrapper
    fn from_ref(state: &AppState) -> Self {
        state.shared_control
    }
}

impl picoserve::extract::FromRef<AppState> for SharedNetConfig {
    /// Extracts the network configuration from application state.
    ///
    /// # Arguments
    ///
    /// * `state` - Reference to the application state
    ///
    /// # Returns
    ///
    /// Copy of the shared configuration reference
    fn from_ref(state: &AppState) -> Self {
        state.net_config
    }
}
