use anyhow::{Context, Result};
use weatherdash_core::{App, AppError, Language, ThemeMode, WeatherError};
use weatherdash_weather::{
    forecast_day_labels, select_rounded, upcoming_hours, UnitSystem, WeatherSnapshot,
    WeatherStore,
};

const USAGE: &str = "usage:
  weatherdash <city>
  weatherdash search <query>
  weatherdash units <metric|imperial>
  weatherdash theme [toggle|light|dark]
  weatherdash lang <en|ar|fa>";

#[tokio::main]
async fn main() -> Result<()> {
    weatherdash_core::init()?;

    let mut app = App::new().map_err(report)?;
    app.initialize()?;

    let store = WeatherStore::from_config(&app.config().api, app.storage())
        .context("Failed to create weather client")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run(&app, &store, &args).await;

    app.shutdown()?;
    result
}

async fn run(app: &App, store: &WeatherStore, args: &[String]) -> Result<()> {
    let settings = app.settings();

    match args {
        [] => {
            println!("{USAGE}");
        }
        [cmd, query @ ..] if cmd == "search" && !query.is_empty() => {
            let cities = store.search_cities(&query.join(" ")).await;
            if cities.is_empty() {
                println!("No cities found");
            }
            for city in cities {
                println!("{:>8}  {}  ({})", city.id, city.display_name(), city.url);
            }
        }
        [cmd, system] if cmd == "units" => {
            let system: UnitSystem = system.parse()?;
            store.set_unit_system(system);
            println!("Units: {}", store.unit_system());
        }
        [cmd, rest @ ..] if cmd == "theme" => {
            match rest.first().map(String::as_str) {
                None | Some("toggle") => settings.toggle_theme(),
                Some(mode) => settings.set_theme(mode.parse::<ThemeMode>()?),
            }
            println!("Theme: {}", settings.theme());
        }
        [cmd, lang] if cmd == "lang" => {
            settings.set_language(lang.parse::<Language>()?);
            let attrs = app.document().attributes();
            println!("Language: {} (dir={})", attrs.lang, attrs.dir.as_str());
        }
        [cmd, ..] if matches!(cmd.as_str(), "search" | "units" | "lang") => {
            println!("{USAGE}");
        }
        city => {
            store.fetch_weather(&city.join(" ")).await;
            if let Some(code) = store.error() {
                return Err(report(WeatherError::from(code).into()));
            }
            if let Some(weather) = store.weather() {
                print_weather(store, &weather);
            }
        }
    }

    Ok(())
}

/// Attach the user-facing message to an application error
fn report(err: AppError) -> anyhow::Error {
    anyhow::anyhow!("{} ({})", err.user_message(), err)
}

fn print_weather(store: &WeatherStore, weather: &WeatherSnapshot) {
    let labels = store.unit_labels();
    let system = store.unit_system();
    let loc = &weather.location;
    let current = &weather.current;

    println!("{}, {}, {}  ({})", loc.name, loc.region, loc.country, loc.localtime);
    println!(
        "  {}{}  {}  (feels like {}{})",
        store.temperature().unwrap_or_default(),
        labels.temperature,
        current.condition.text,
        store.feels_like().unwrap_or_default(),
        labels.temperature,
    );
    println!(
        "  Wind {} {} {}  Humidity {}%  Visibility {} {}  UV {}",
        store.wind_speed().unwrap_or_default(),
        labels.speed,
        current.wind_dir,
        current.humidity,
        store.visibility().unwrap_or_default(),
        labels.distance,
        current.uv,
    );
    if let Some(level) = store.air_quality_level() {
        println!("  Air quality: {}", level.label());
    }

    let days = weather.forecast_days();
    for (day, label) in days.iter().zip(forecast_day_labels(days)) {
        let high = select_rounded(day.day.maxtemp_c, day.day.maxtemp_f, system);
        let low = select_rounded(day.day.mintemp_c, day.day.mintemp_f, system);
        println!(
            "  {:<10} {:>4}{} / {:>4}{}  rain {:>3}%  {}",
            label.key(),
            high,
            labels.temperature,
            low,
            labels.temperature,
            day.day.daily_chance_of_rain,
            day.day.condition.text,
        );
    }

    if let (Some(today), Some(now)) = (days.first(), loc.local_time()) {
        for slot in upcoming_hours(&today.hour, now).iter().take(6) {
            let hour = slot.hour;
            let when = if slot.is_now {
                "now".to_string()
            } else {
                hour.time.get(11..).unwrap_or(hour.time.as_str()).to_string()
            };
            println!(
                "    {:>5}  {:>4}{}  rain {:>3}%",
                when,
                select_rounded(hour.temp_c, hour.temp_f, system),
                labels.temperature,
                hour.chance_of_rain,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use weatherdash_core::{ApiConfig, Config, MemoryStorage};

    fn offline() -> (App, WeatherStore) {
        let app = App::with_parts(Config::default(), Arc::new(MemoryStorage::new()));
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..ApiConfig::default()
        };
        let store = WeatherStore::from_config(&config, app.storage()).unwrap();
        (app, store)
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_bare_subcommands_do_not_fetch() {
        let (app, store) = offline();

        let cases: [&[&str]; 4] = [&["units"], &["lang"], &["search"], &["units", "metric", "extra"]];
        for cmd in cases {
            run(&app, &store, &args(cmd)).await.unwrap();
        }

        assert_eq!(store.error(), None);
        assert!(store.weather().is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_user_message() {
        let (app, store) = offline();

        let err = run(&app, &store, &args(&["Nowhere"])).await.unwrap_err();

        assert!(err.to_string().starts_with("Failed to fetch weather data"));
        assert_eq!(store.error(), Some(weatherdash_weather::ErrorCode::FetchFailed));
    }

    #[tokio::test]
    async fn test_units_command_switches_system() {
        let (app, store) = offline();

        run(&app, &store, &args(&["units", "imperial"])).await.unwrap();

        assert_eq!(store.unit_system(), UnitSystem::Imperial);
        assert_eq!(app.storage().get("unitSystem").as_deref(), Some("imperial"));
    }
}
