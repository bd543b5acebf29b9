//! Plain-text rendering of the view state.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use std::fmt;

use crate::model::{CurrentWeather, ForecastEntry, LookupState, Unit, icon_url};

const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Host clock inputs: the date shown for current conditions and the offset
/// used to turn forecast timestamps into dates.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub today: NaiveDate,
    pub offset: FixedOffset,
}

impl RenderContext {
    pub fn now() -> Self {
        let now = Local::now();
        Self { today: now.date_naive(), offset: *now.offset() }
    }

    fn date_of(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.offset).date_naive()
    }
}

/// Render `state` with temperatures shown in `unit`.
pub fn render(state: &LookupState, unit: Unit, ctx: &RenderContext) -> String {
    Screen { state, unit, ctx }.to_string()
}

/// Declarative view of one state snapshot.
pub struct Screen<'a> {
    pub state: &'a LookupState,
    pub unit: Unit,
    pub ctx: &'a RenderContext,
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            LookupState::Idle => Ok(()),
            LookupState::Loading => writeln!(f, "Loading..."),
            LookupState::Error(message) => writeln!(f, "{message}"),
            LookupState::Success { current, forecast } => {
                self.write_current(f, current)?;
                self.write_forecast(f, forecast)
            }
        }
    }
}

impl Screen<'_> {
    fn write_current(&self, f: &mut fmt::Formatter<'_>, current: &CurrentWeather) -> fmt::Result {
        match &current.country {
            Some(country) => writeln!(f, "{}, {}", current.city, country)?,
            None => writeln!(f, "{}", current.city)?,
        }
        writeln!(f, "{}", self.ctx.today.format(DATE_FORMAT))?;
        writeln!(f, "{}°", format_number(current.temperature.in_unit(self.unit)))?;
        writeln!(f, "{}", unit_selector(self.unit))?;
        if let Some(icon) = &current.icon {
            writeln!(f, "Icon: {}", icon_url(icon))?;
        }
        writeln!(f, "{}", current.description)?;
        writeln!(
            f,
            "Wind Speed: {} {}",
            format_number(current.wind_speed),
            current.temperature.unit.wind_speed_label()
        )?;
        writeln!(f, "Humidity: {}%", current.humidity_pct)
    }

    fn write_forecast(&self, f: &mut fmt::Formatter<'_>, forecast: &[ForecastEntry]) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Forecast")?;
        for entry in forecast {
            write!(
                f,
                "{}  Temperature: {}°",
                self.ctx.date_of(entry.timestamp).format(DATE_FORMAT),
                format_number(entry.temperature.in_unit(self.unit))
            )?;
            if let Some(icon) = &entry.icon {
                write!(f, "  {}", icon_url(icon))?;
            }
            writeln!(f, "  {}", entry.description)?;
        }
        Ok(())
    }
}

/// Two mutually exclusive options with the current one checked.
fn unit_selector(selected: Unit) -> String {
    Unit::all()
        .iter()
        .map(|u| {
            let mark = if *u == selected { '•' } else { ' ' };
            format!("({mark}) {}", u.label())
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Shortest form, at most two decimals: `18`, `3.5`, `64.4`.
fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Temperature;
    use chrono::TimeZone;

    fn ctx() -> RenderContext {
        RenderContext {
            today: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            offset: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn paris(unit: Unit, temp: f64) -> CurrentWeather {
        CurrentWeather {
            city: "Paris".into(),
            country: Some("FR".into()),
            temperature: Temperature::new(temp, unit),
            humidity_pct: 60,
            wind_speed: 3.5,
            description: "clear sky".into(),
            icon: Some("01d".into()),
        }
    }

    fn success(current: CurrentWeather, forecast: Vec<ForecastEntry>) -> LookupState {
        LookupState::Success { current, forecast }
    }

    #[test]
    fn loading_suppresses_everything_else() {
        assert_eq!(render(&LookupState::Loading, Unit::Metric, &ctx()), "Loading...\n");
    }

    #[test]
    fn error_renders_message_only() {
        let out = render(&LookupState::Error("city not found".into()), Unit::Metric, &ctx());
        assert_eq!(out, "city not found\n");
    }

    #[test]
    fn idle_renders_nothing() {
        assert!(render(&LookupState::Idle, Unit::Metric, &ctx()).is_empty());
    }

    #[test]
    fn paris_metric_scenario() {
        let out = render(&success(paris(Unit::Metric, 18.0), vec![]), Unit::Metric, &ctx());

        assert!(out.contains("Paris, FR\n"));
        assert!(out.contains("5/1/2024\n"));
        assert!(out.contains("\n18°\n"));
        assert!(out.contains("Humidity: 60%"));
        assert!(out.contains("Wind Speed: 3.5 m/s"));
        assert!(out.contains("(•) Celsius  ( ) Fahrenheit"));
        assert!(out.contains("Icon: https://openweathermap.org/img/wn/01d.png"));
    }

    #[test]
    fn empty_forecast_still_renders_section_header() {
        let out = render(&success(paris(Unit::Metric, 18.0), vec![]), Unit::Metric, &ctx());

        assert!(out.contains("Humidity: 60%"));
        assert!(out.ends_with("\nForecast\n"));
    }

    #[test]
    fn imperial_values_are_not_converted_again() {
        let out = render(&success(paris(Unit::Imperial, 64.4), vec![]), Unit::Imperial, &ctx());

        assert!(out.contains("\n64.4°\n"));
        assert!(out.contains("( ) Celsius  (•) Fahrenheit"));
        assert!(out.contains("Wind Speed: 3.5 mph"));
    }

    #[test]
    fn metric_values_shown_in_fahrenheit_are_converted() {
        let out = render(&success(paris(Unit::Metric, 18.0), vec![]), Unit::Imperial, &ctx());
        assert!(out.contains("\n64.4°\n"));
    }

    #[test]
    fn missing_country_renders_city_only() {
        let mut current = paris(Unit::Metric, 18.0);
        current.country = None;

        let out = render(&success(current, vec![]), Unit::Metric, &ctx());
        assert!(out.starts_with("Paris\n"));
    }

    #[test]
    fn forecast_lists_every_entry_in_order() {
        let entry = |day: u32, temp: f64, description: &str| ForecastEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 5, day, 23, 30, 0).unwrap(),
            temperature: Temperature::new(temp, Unit::Metric),
            description: description.into(),
            icon: Some("10d".into()),
        };
        let forecast = vec![entry(2, 12.25, "light rain"), entry(3, -0.001, "snow")];

        let out = render(&success(paris(Unit::Metric, 18.0), forecast), Unit::Metric, &ctx());
        let lines: Vec<&str> = out.lines().skip_while(|l| *l != "Forecast").collect();

        assert_eq!(
            lines,
            vec![
                "Forecast",
                "5/2/2024  Temperature: 12.25°  https://openweathermap.org/img/wn/10d.png  light rain",
                "5/3/2024  Temperature: 0°  https://openweathermap.org/img/wn/10d.png  snow",
            ]
        );
    }

    #[test]
    fn forecast_dates_follow_context_offset() {
        let mut ctx = ctx();
        ctx.offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let forecast = vec![ForecastEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 2, 23, 0, 0).unwrap(),
            temperature: Temperature::new(10.0, Unit::Metric),
            description: "mist".into(),
            icon: None,
        }];

        let out = render(&success(paris(Unit::Metric, 18.0), forecast), Unit::Metric, &ctx);
        assert!(out.contains("5/3/2024  Temperature: 10°  mist"));
    }
}
