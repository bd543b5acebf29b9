use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use weather_core::{
    Config, Coordinates, FixedPosition, Geolocator, IpGeolocator, LookupTicket, NoGeolocation,
    OpenWeatherProvider, RenderContext, Unit, WeatherProvider, WeatherView, provider_from_config,
    render,
};

type View = WeatherView<OpenWeatherProvider, Box<dyn Geolocator>>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default unit.
    Configure,

    /// Show current weather and forecast once.
    Show {
        /// City name; when absent, the current position is used.
        location: Option<String>,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Live view: type a city, `/unit` to toggle units, `/search` to refresh, `/quit` to exit.
    Interactive {
        #[command(flatten)]
        lookup: LookupArgs,
    },
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Temperature unit: metric or imperial. Defaults to the configured unit.
    #[arg(long, short)]
    pub unit: Option<Unit>,

    /// Latitude used instead of geolocation.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude used instead of geolocation.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Disable position lookup entirely.
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub no_geolocation: bool,
}

impl LookupArgs {
    fn geolocator(&self, config: &Config) -> Box<dyn Geolocator> {
        if let (Some(latitude), Some(longitude)) = (self.lat, self.lon) {
            tracing::debug!(latitude, longitude, "using position from flags");
            return Box::new(FixedPosition(Coordinates { latitude, longitude }));
        }
        if self.no_geolocation {
            tracing::debug!("geolocation disabled");
            return Box::new(NoGeolocation);
        }

        let boxed: Box<dyn Geolocator> = match config.location {
            Some(coords) => {
                tracing::debug!(?coords, "using position from config");
                Box::new(FixedPosition(coords))
            }
            None => {
                tracing::debug!("using IP geolocation");
                Box::new(IpGeolocator::new())
            }
        };

        boxed
    }

    fn build_view(&self, config: &Config) -> anyhow::Result<View> {
        let provider = provider_from_config(config)?;
        let unit = self.unit.unwrap_or(config.default_unit);
        tracing::debug!(%unit, base_url = provider.base_url(), "view configured");

        Ok(WeatherView::new(provider, self.geolocator(config)).with_unit(unit))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, lookup } => {
                let config = load_config()?;
                let mut view = lookup.build_view(&config)?;
                if let Some(location) = location {
                    view = view.with_location_text(location);
                }
                show(view).await
            }
            Command::Interactive { lookup } => {
                let config = load_config()?;
                interactive(lookup.build_view(&config)?).await
            }
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    tracing::debug!(
        default_unit = %config.default_unit,
        has_api_key = config.api_key.is_some(),
        has_location = config.location.is_some(),
        "config loaded"
    );
    Ok(config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = load_config()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key);

    let units = Unit::all().to_vec();
    let start = units.iter().position(|u| *u == config.default_unit).unwrap_or(0);
    config.default_unit = Select::new("Default unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read default unit")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(mut view: View) -> anyhow::Result<()> {
    let ticket = view.mount();
    view.refresh(ticket).await;

    if let Some(message) = view.error() {
        bail!("{message}");
    }
    print!("{}", render(view.state(), view.unit(), &RenderContext::now()));
    Ok(())
}

async fn interactive(mut view: View) -> anyhow::Result<()> {
    let ticket = view.mount();
    run_lookup(&mut view, ticket).await;

    loop {
        let line = match Text::new("Location:")
            .with_help_message("empty = current position, /unit [metric|imperial], /search, /quit")
            .prompt()
        {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };

        let ticket = match parse_input(&line) {
            Input::Quit => break,
            Input::Invalid(message) => {
                eprintln!("{message}");
                None
            }
            input => apply_input(&mut view, input),
        };

        match ticket {
            Some(ticket) => run_lookup(&mut view, ticket).await,
            None => print!("{}", render(view.state(), view.unit(), &RenderContext::now())),
        }
    }

    Ok(())
}

async fn run_lookup(view: &mut View, ticket: LookupTicket) {
    print!("{}", render(view.state(), view.unit(), &RenderContext::now()));
    view.refresh(ticket).await;
    print!("{}", render(view.state(), view.unit(), &RenderContext::now()));
}

/// Submitting a location always looks it up: a changed text triggers the
/// reactive lookup, an unchanged one falls back to an explicit search.
fn apply_input<P: WeatherProvider, G: Geolocator>(
    view: &mut WeatherView<P, G>,
    input: Input,
) -> Option<LookupTicket> {
    match input {
        Input::Search => Some(view.search()),
        Input::ToggleUnit => Some(view.toggle_unit()),
        Input::SetUnit(unit) => view.set_unit(unit),
        Input::Location(text) => view.set_location_text(text).or_else(|| Some(view.search())),
        Input::Quit | Input::Invalid(_) => None,
    }
}

#[derive(Debug, PartialEq)]
enum Input {
    Quit,
    Search,
    ToggleUnit,
    SetUnit(Unit),
    Location(String),
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Location(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "q" | "exit"), None) => Input::Quit,
        (Some("search" | "s"), None) => Input::Search,
        (Some("unit" | "u"), None) => Input::ToggleUnit,
        (Some("unit" | "u"), Some(unit)) => match Unit::try_from(unit) {
            Ok(unit) => Input::SetUnit(unit),
            Err(err) => Input::Invalid(err.to_string()),
        },
        _ => Input::Invalid(format!("Unknown command '{trimmed}'")),
    }
}
