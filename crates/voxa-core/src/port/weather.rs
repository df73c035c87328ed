//! Weather service port.
//!
//! Follows the blanket-impl pattern used for skills:
//! 1. `WeatherProvider` is the RPITIT trait implementations write
//! 2. `WeatherProviderDyn` is the object-safe twin with boxed futures
//! 3. `BoxWeatherProvider` wraps `Arc<dyn WeatherProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use voxa_types::error::UpstreamError;
use voxa_types::locale::Locale;
use voxa_types::weather::WeatherReport;

/// Current weather lookup by city name.
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &str;

    fn current(
        &self,
        city: &str,
        locale: Locale,
    ) -> impl Future<Output = Result<WeatherReport, UpstreamError>> + Send;
}

/// Object-safe version of [`WeatherProvider`] with boxed futures.
pub trait WeatherProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn current_boxed<'a>(
        &'a self,
        city: &'a str,
        locale: Locale,
    ) -> Pin<Box<dyn Future<Output = Result<WeatherReport, UpstreamError>> + Send + 'a>>;
}

/// Blanket implementation: any `WeatherProvider` automatically implements `WeatherProviderDyn`.
impl<T: WeatherProvider> WeatherProviderDyn for T {
    fn name(&self) -> &str {
        WeatherProvider::name(self)
    }

    fn current_boxed<'a>(
        &'a self,
        city: &'a str,
        locale: Locale,
    ) -> Pin<Box<dyn Future<Output = Result<WeatherReport, UpstreamError>> + Send + 'a>> {
        Box::pin(self.current(city, locale))
    }
}

/// Type-erased, cheaply cloneable weather provider.
#[derive(Clone)]
pub struct BoxWeatherProvider {
    inner: Arc<dyn WeatherProviderDyn>,
}

impl BoxWeatherProvider {
    pub fn new<T: WeatherProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Arc::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn current(&self, city: &str, locale: Locale) -> Result<WeatherReport, UpstreamError> {
        self.inner.current_boxed(city, locale).await
    }
}

impl std::fmt::Debug for BoxWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxWeatherProvider")
            .field("name", &self.inner.name())
            .finish()
    }
}
