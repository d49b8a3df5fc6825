//! Top-level client
//!
//! Composes the REST channel, the browser session manager and the
//! business sub-clients. Collaborators (rotation counter, webhook
//! alerter) are constructed by the caller and passed in explicitly;
//! nothing in this crate is process-global.

use std::sync::Arc;

use chromiumoxide::Page;

use crate::alert::WebhookAlerter;
use crate::config::Cin7Config;
use crate::error::Result;
use crate::http::ApiChannel;
use crate::resources::{CreditNotes, Payments, ProductOptions, SalesOrders, StockLevels};
use crate::rotation::KeyRotationCounter;
use crate::session::SessionManager;

/// The integration client
///
/// One instance holds at most one browser session; instances are not
/// meant to share a session.
pub struct Cin7 {
    config: Arc<Cin7Config>,
    session: Arc<SessionManager>,

    pub sales_orders: SalesOrders,
    pub credit_notes: CreditNotes,
    pub payments: Payments,
    pub product_options: ProductOptions,
    pub stock_levels: StockLevels,
}

impl Cin7 {
    /// Build a client without rotation or alerting collaborators
    pub fn new(config: Cin7Config) -> Result<Self> {
        Self::with_collaborators(config, None, None)
    }

    /// Build a client with explicitly-passed collaborators
    ///
    /// `rotation_counter` is required when the configuration enables key
    /// rotation; `alerter` receives error notifications from the REST
    /// channel when present.
    pub fn with_collaborators(
        config: Cin7Config,
        rotation_counter: Option<Arc<dyn KeyRotationCounter>>,
        alerter: Option<Arc<WebhookAlerter>>,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let channel = Arc::new(ApiChannel::new(&config, rotation_counter, alerter)?);
        let session = Arc::new(SessionManager::new(config.clone()));

        Ok(Self {
            sales_orders: SalesOrders::new(channel.clone(), session.clone(), config.clone()),
            credit_notes: CreditNotes::new(channel.clone(), session.clone(), config.clone()),
            payments: Payments::new(channel.clone()),
            product_options: ProductOptions::new(channel.clone()),
            stock_levels: StockLevels::new(channel),
            config,
            session,
        })
    }

    pub fn config(&self) -> &Cin7Config {
        &self.config
    }

    /// The logged-in console page, logging in first if necessary
    pub async fn get_console_page(&self) -> Result<Page> {
        self.session.get_page().await
    }

    /// Tear down the browser session, if one is running
    pub async fn close_browser(&self) {
        self.session.close_browser().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Cin7Config, KeyRotationOptions};
    use crate::error::{Cin7Error, ConfigError};
    use crate::rotation::InMemoryKeyCounter;

    #[test]
    fn builds_without_collaborators() {
        assert!(Cin7::new(Cin7Config::default()).is_ok());
    }

    #[test]
    fn enabled_rotation_requires_a_counter() {
        let mut config = Cin7Config::default();
        config.options.key_rotation = Some(KeyRotationOptions::default());

        let result = Cin7::new(config.clone());
        assert!(matches!(
            result,
            Err(Cin7Error::Config(ConfigError::RotationCounterMissing))
        ));

        let counter = Arc::new(InMemoryKeyCounter::new());
        assert!(Cin7::with_collaborators(config, Some(counter), None).is_ok());
    }

    #[test]
    fn disabled_rotation_needs_no_counter() {
        let mut config = Cin7Config::default();
        config.options.key_rotation = Some(KeyRotationOptions {
            enabled: false,
            cutoff: 100,
        });
        assert!(Cin7::new(config).is_ok());
    }
}
