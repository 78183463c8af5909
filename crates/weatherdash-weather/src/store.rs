//! Shared weather state and the network operations that mutate it.
//!
//! One `WeatherStore` exists per running client; clones share the same state.
//! State lives in a `watch` channel so the view can subscribe to changes,
//! while derived values (`temperature`, `wind_speed`, ...) are recomputed from
//! the snapshot and unit system on every read.
//!
//! Concurrent `fetch_weather` calls are not sequenced: whichever response
//! resolves last overwrites the state.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use weatherdash_core::{ApiConfig, PreferenceStore};

use crate::air_quality::AirQualityLevel;
use crate::client::WeatherApiClient;
use crate::error::{ClientError, ErrorCode};
use crate::types::{City, CurrentConditions, WeatherSnapshot};
use crate::units::{select_rounded, UnitLabels, UnitSystem, UNIT_SYSTEM_KEY};

/// Minimum query length (in characters) that triggers a city search
pub const MIN_SEARCH_CHARS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    pub weather: Option<WeatherSnapshot>,
    pub cities: Vec<City>,
    pub loading: bool,
    pub search_loading: bool,
    pub error: Option<ErrorCode>,
    pub unit_system: UnitSystem,
}

impl WeatherState {
    fn select(&self, pick: impl Fn(&CurrentConditions) -> (f64, f64)) -> Option<i32> {
        let (metric, imperial) = pick(&self.weather.as_ref()?.current);
        Some(select_rounded(metric, imperial, self.unit_system))
    }

    /// Current temperature, °C or °F
    pub fn temperature(&self) -> Option<i32> {
        self.select(|c| (c.temp_c, c.temp_f))
    }

    pub fn feels_like(&self) -> Option<i32> {
        self.select(|c| (c.feelslike_c, c.feelslike_f))
    }

    /// km/h or mph
    pub fn wind_speed(&self) -> Option<i32> {
        self.select(|c| (c.wind_kph, c.wind_mph))
    }

    /// km or miles
    pub fn visibility(&self) -> Option<i32> {
        self.select(|c| (c.vis_km, c.vis_miles))
    }

    pub fn air_quality_level(&self) -> Option<AirQualityLevel> {
        self.weather
            .as_ref()?
            .us_epa_index()
            .map(AirQualityLevel::from_index)
    }
}

struct Inner {
    client: WeatherApiClient,
    storage: Arc<dyn PreferenceStore>,
    state: watch::Sender<WeatherState>,
}

/// Which in-flight flag a [`FlagGuard`] owns
#[derive(Clone, Copy)]
enum Flag {
    Loading,
    SearchLoading,
}

/// Lowers its flag if the request future is dropped before it stores a
/// result (cancelled by a timeout, superseded in a `select!`, never polled).
struct FlagGuard {
    inner: Arc<Inner>,
    flag: Flag,
    armed: bool,
}

impl FlagGuard {
    /// Raise `flag`; it stays up until the guard is disarmed or dropped.
    fn raise(inner: Arc<Inner>, flag: Flag, prepare: impl FnOnce(&mut WeatherState)) -> Self {
        inner.state.send_modify(|s| {
            prepare(s);
            match flag {
                Flag::Loading => s.loading = true,
                Flag::SearchLoading => s.search_loading = true,
            }
        });
        Self {
            inner,
            flag,
            armed: true,
        }
    }

    /// Store the outcome. `finish` must lower the flag itself so that the
    /// result and the flag change reach subscribers in one update.
    fn complete(mut self, finish: impl FnOnce(&mut WeatherState)) {
        self.armed = false;
        self.inner.state.send_modify(finish);
    }
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::debug!("Request dropped before completion");
        let flag = self.flag;
        self.inner.state.send_modify(|s| match flag {
            Flag::Loading => s.loading = false,
            Flag::SearchLoading => s.search_loading = false,
        });
    }
}

#[derive(Clone)]
pub struct WeatherStore {
    inner: Arc<Inner>,
}

impl WeatherStore {
    /// Create the store, restoring the persisted unit system (metric if unset).
    pub fn new(client: WeatherApiClient, storage: Arc<dyn PreferenceStore>) -> Self {
        let unit_system = storage
            .get(UNIT_SYSTEM_KEY)
            .and_then(|raw| match raw.parse::<UnitSystem>() {
                Ok(system) => Some(system),
                Err(e) => {
                    tracing::warn!("Ignoring stored unit system: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        let state = WeatherState {
            unit_system,
            ..WeatherState::default()
        };

        Self {
            inner: Arc::new(Inner {
                client,
                storage,
                state: watch::Sender::new(state),
            }),
        }
    }

    pub fn from_config(
        config: &ApiConfig,
        storage: Arc<dyn PreferenceStore>,
    ) -> Result<Self, ClientError> {
        Ok(Self::new(WeatherApiClient::new(config)?, storage))
    }

    /// Receive the state after every change
    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.inner.state.subscribe()
    }

    /// Run `f` against the current state without cloning it
    pub fn with_state<R>(&self, f: impl FnOnce(&WeatherState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    pub fn state(&self) -> WeatherState {
        self.inner.state.borrow().clone()
    }

    pub fn weather(&self) -> Option<WeatherSnapshot> {
        self.with_state(|s| s.weather.clone())
    }

    pub fn cities(&self) -> Vec<City> {
        self.with_state(|s| s.cities.clone())
    }

    pub fn loading(&self) -> bool {
        self.with_state(|s| s.loading)
    }

    pub fn search_loading(&self) -> bool {
        self.with_state(|s| s.search_loading)
    }

    pub fn error(&self) -> Option<ErrorCode> {
        self.with_state(|s| s.error)
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.with_state(|s| s.unit_system)
    }

    pub fn unit_labels(&self) -> UnitLabels {
        self.unit_system().labels()
    }

    pub fn temperature(&self) -> Option<i32> {
        self.with_state(WeatherState::temperature)
    }

    pub fn feels_like(&self) -> Option<i32> {
        self.with_state(WeatherState::feels_like)
    }

    pub fn wind_speed(&self) -> Option<i32> {
        self.with_state(WeatherState::wind_speed)
    }

    pub fn visibility(&self) -> Option<i32> {
        self.with_state(WeatherState::visibility)
    }

    pub fn air_quality_level(&self) -> Option<AirQualityLevel> {
        self.with_state(WeatherState::air_quality_level)
    }

    pub fn get_air_quality_level(&self, index: i32) -> &'static str {
        AirQualityLevel::from_index(index).key()
    }

    pub fn get_air_quality_color(&self, index: i32) -> &'static str {
        AirQualityLevel::from_index(index).color()
    }

    /// Change the unit system and persist it. Derived values follow
    /// immediately; no refetch is needed.
    pub fn set_unit_system(&self, system: UnitSystem) {
        self.inner.state.send_modify(|s| s.unit_system = system);
        if let Err(e) = self.inner.storage.set(UNIT_SYSTEM_KEY, system.as_str()) {
            tracing::warn!("Failed to persist unit system: {}", e);
        }
    }

    /// Forget the loaded weather, search results and error
    pub fn clear(&self) {
        self.inner.state.send_modify(|s| {
            s.weather = None;
            s.cities.clear();
            s.error = None;
        });
    }

    /// Search cities matching `query`.
    ///
    /// Queries shorter than [`MIN_SEARCH_CHARS`] clear the results without a
    /// request. `search_loading` is raised before this returns and lowered
    /// once the results are stored, or when the future is dropped unfinished.
    /// Failures resolve to an empty list.
    pub fn search_cities(&self, query: &str) -> impl Future<Output = Vec<City>> + Send + 'static {
        let query = query.to_string();

        let guard = if query.chars().count() < MIN_SEARCH_CHARS {
            self.inner.state.send_modify(|s| {
                s.cities.clear();
                s.search_loading = false;
            });
            None
        } else {
            Some(FlagGuard::raise(self.inner.clone(), Flag::SearchLoading, |_| {}))
        };

        async move {
            let Some(guard) = guard else {
                return Vec::new();
            };

            let cities = match guard.inner.client.search(&query).await {
                Ok(cities) => {
                    tracing::debug!("Found {} cities for {:?}", cities.len(), query);
                    cities
                }
                Err(e) => {
                    tracing::warn!("Failed to search cities for {:?}: {}", query, e);
                    Vec::new()
                }
            };

            let stored = cities.clone();
            guard.complete(|s| {
                s.cities = stored;
                s.search_loading = false;
            });
            cities
        }
    }

    /// Fetch current conditions and forecast for `city`.
    ///
    /// `loading` is raised and `error` cleared before this returns. On
    /// success the snapshot replaces the previous one; on failure the
    /// snapshot is cleared and `error` holds the classified code. `loading`
    /// drops in the same update, or on its own if the future is dropped.
    pub fn fetch_weather(&self, city: &str) -> impl Future<Output = ()> + Send + 'static {
        let city = city.to_string();
        let guard = FlagGuard::raise(self.inner.clone(), Flag::Loading, |s| s.error = None);

        async move {
            let result = guard.inner.client.forecast(&city).await;
            match result {
                Ok(snapshot) => {
                    tracing::info!(
                        "Fetched weather for {}, {}",
                        snapshot.location.name,
                        snapshot.location.country
                    );
                    guard.complete(|s| {
                        s.weather = Some(snapshot);
                        s.error = None;
                        s.loading = false;
                    });
                }
                Err(e) => {
                    let code = ErrorCode::classify(&e);
                    tracing::error!("Failed to fetch weather for {:?} ({}): {}", city, code, e);
                    guard.complete(|s| {
                        s.weather = None;
                        s.error = Some(code);
                        s.loading = false;
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AirQuality, Location};
    use weatherdash_core::{MemoryStorage, StorageError};

    /// Accepts nothing; every write fails
    struct ReadOnlyStorage;

    impl PreferenceStore for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed("read-only".into()))
        }
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            location: Location {
                name: "London".into(),
                ..Location::default()
            },
            current: CurrentConditions {
                temp_c: 12.0,
                temp_f: 54.0,
                feelslike_c: 9.6,
                feelslike_f: 49.3,
                wind_kph: 16.2,
                wind_mph: 10.1,
                vis_km: 10.0,
                vis_miles: 6.0,
                air_quality: Some(AirQuality {
                    us_epa_index: 4,
                    ..AirQuality::default()
                }),
                ..CurrentConditions::default()
            },
            forecast: Default::default(),
        }
    }

    fn offline_store(storage: Arc<dyn PreferenceStore>) -> WeatherStore {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..ApiConfig::default()
        };
        WeatherStore::from_config(&config, storage).unwrap()
    }

    #[test]
    fn test_derived_values_are_none_without_weather() {
        let state = WeatherState::default();
        assert_eq!(state.temperature(), None);
        assert_eq!(state.feels_like(), None);
        assert_eq!(state.wind_speed(), None);
        assert_eq!(state.visibility(), None);
        assert_eq!(state.air_quality_level(), None);
    }

    #[test]
    fn test_derived_values_follow_unit_system() {
        let mut state = WeatherState {
            weather: Some(snapshot()),
            ..WeatherState::default()
        };
        assert_eq!(state.temperature(), Some(12));
        assert_eq!(state.feels_like(), Some(10));
        assert_eq!(state.wind_speed(), Some(16));
        assert_eq!(state.visibility(), Some(10));

        state.unit_system = UnitSystem::Imperial;
        assert_eq!(state.temperature(), Some(54));
        assert_eq!(state.feels_like(), Some(49));
        assert_eq!(state.wind_speed(), Some(10));
        assert_eq!(state.visibility(), Some(6));
    }

    #[test]
    fn test_air_quality_level_from_snapshot() {
        let state = WeatherState {
            weather: Some(snapshot()),
            ..WeatherState::default()
        };
        assert_eq!(state.air_quality_level(), Some(AirQualityLevel::Unhealthy));
    }

    #[tokio::test]
    async fn test_defaults_to_metric() {
        let store = offline_store(Arc::new(MemoryStorage::new()));
        assert_eq!(store.unit_system(), UnitSystem::Metric);
        assert_eq!(store.unit_labels().temperature, "°C");
    }

    #[tokio::test]
    async fn test_restores_persisted_unit_system() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(UNIT_SYSTEM_KEY, "imperial").unwrap();
        let store = offline_store(storage);
        assert_eq!(store.unit_system(), UnitSystem::Imperial);
    }

    #[tokio::test]
    async fn test_set_unit_system_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let store = offline_store(storage.clone());

        store.set_unit_system(UnitSystem::Imperial);

        assert_eq!(store.unit_system(), UnitSystem::Imperial);
        assert_eq!(storage.get(UNIT_SYSTEM_KEY).as_deref(), Some("imperial"));
    }

    #[tokio::test]
    async fn test_air_quality_helpers_on_store() {
        let store = offline_store(Arc::new(MemoryStorage::new()));
        assert_eq!(store.get_air_quality_level(3), "unhealthySensitive");
        assert_eq!(store.get_air_quality_color(5), "deep-purple");
        assert_eq!(store.get_air_quality_level(0), "good");
        assert_eq!(store.get_air_quality_color(9), "brown");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = offline_store(Arc::new(MemoryStorage::new()));
        let other = store.clone();
        other.set_unit_system(UnitSystem::Imperial);
        assert_eq!(store.unit_system(), UnitSystem::Imperial);
    }

    #[tokio::test]
    async fn test_set_unit_system_survives_storage_failure() {
        let store = offline_store(Arc::new(ReadOnlyStorage));

        store.set_unit_system(UnitSystem::Imperial);

        assert_eq!(store.unit_system(), UnitSystem::Imperial);
        assert_eq!(store.unit_labels().temperature, "°F");
    }

    #[tokio::test]
    async fn test_dropping_unpolled_requests_lowers_flags() {
        let store = offline_store(Arc::new(MemoryStorage::new()));

        let fetch = store.fetch_weather("Paris");
        let search = store.search_cities("Par");
        assert!(store.loading());
        assert!(store.search_loading());

        drop(fetch);
        assert!(!store.loading());
        assert!(store.search_loading());

        drop(search);
        assert!(!store.search_loading());
        assert_eq!(store.error(), None);
    }
}
