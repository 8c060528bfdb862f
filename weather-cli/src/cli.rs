use std::{fmt, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use tokio::task::JoinHandle;
use weather_core::{
    Config, Coordinates, DisabledLocation, FixedLocation, IpApiLocator, LoadingRelease,
    LocationService, WeatherWidget,
};

use crate::render::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Current weather in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather app id.
    Configure,

    /// Print the widget once and exit.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        /// Skip location lookup and show weather for this place.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        place: Option<String>,

        /// Include the detailed fields.
        #[arg(long)]
        expand: bool,
    },

    /// Interactive session: reload, toggle details, enter a place.
    Run {
        #[command(flatten)]
        location: LocationArgs,
    },
}

/// Where the widget's position comes from. Defaults to IP geolocation.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lon: Option<f64>,

    /// Don't look the position up; start with manual place entry.
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    no_locate: bool,
}

impl LocationArgs {
    fn locator(&self) -> Arc<dyn LocationService> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Arc::new(FixedLocation(Coordinates::new(lat, lon))),
            _ if self.no_locate => Arc::new(DisabledLocation),
            _ => Arc::new(IpApiLocator::default()),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, place, expand } => {
                let config = Config::load()?;
                let locator: Arc<dyn LocationService> = if place.is_some() {
                    Arc::new(DisabledLocation)
                } else {
                    location.locator()
                };
                let widget = WeatherWidget::new(&config, locator)?;

                widget.mount().await?;
                if let Some(place) = place {
                    widget.set_place(place);
                    widget.submit().await?;
                }
                if expand {
                    widget.toggle_expand();
                }

                print!("{}", render(&widget.view()));
                widget.unmount();
                Ok(())
            }
            Command::Run { location } => {
                let config = Config::load()?;
                let widget = WeatherWidget::new(&config, location.locator())?;
                let result = session(&widget).await;
                widget.unmount();
                result
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let app_id = Password::new("OpenWeather app id:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read app id")?;

    let release = Select::new(
        "Hide the loading indicator:",
        vec![ReleaseChoice(LoadingRelease::OnSettle), ReleaseChoice(LoadingRelease::OnIssue)],
    )
    .prompt()
    .context("Failed to read loading preference")?;

    config.set_app_id(app_id.trim().to_string());
    config.loading_release = release.0;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

struct ReleaseChoice(LoadingRelease);

impl fmt::Display for ReleaseChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            LoadingRelease::OnSettle => f.write_str("when the request completes"),
            LoadingRelease::OnIssue => f.write_str("as soon as the request is sent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Reload,
    EnterPlace,
    ToggleDetails,
    Locate,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Reload => "Reload",
            Action::EnterPlace => "Enter place",
            Action::ToggleDetails => "Toggle details",
            Action::Locate => "Locate me again",
            Action::Quit => "Quit",
        };
        f.write_str(s)
    }
}

async fn session(widget: &WeatherWidget) -> anyhow::Result<()> {
    settle(widget, widget.mount()).await?;

    loop {
        let view = widget.view();
        let mut actions = Vec::new();
        if view.reload {
            actions.push(Action::Reload);
        }
        if view.form.is_some() {
            actions.push(Action::EnterPlace);
        }
        if view.panel.is_some() {
            actions.push(Action::ToggleDetails);
        }
        actions.extend([Action::Locate, Action::Quit]);

        let action = match Select::new("Action:", actions).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match action {
            Action::Reload => {
                if let Some(handle) = widget.reload() {
                    settle(widget, handle).await?;
                }
            }
            Action::EnterPlace => {
                let current = widget.state().place().to_string();
                let place = match Text::new("Place:")
                    .with_placeholder(weather_core::view::PLACE_PLACEHOLDER)
                    .with_initial_value(&current)
                    .prompt()
                {
                    Ok(place) => place,
                    Err(InquireError::OperationCanceled) => continue,
                    Err(e) => return Err(e.into()),
                };
                widget.set_place(place);
                settle(widget, widget.submit()).await?;
            }
            Action::ToggleDetails => {
                widget.toggle_expand();
                print!("{}", render(&widget.view()));
            }
            Action::Locate => settle(widget, widget.resolve_location()).await?,
            Action::Quit => break,
        }
    }

    Ok(())
}

/// Draw the in-flight view, wait for the task, draw the result.
async fn settle(widget: &WeatherWidget, handle: JoinHandle<()>) -> anyhow::Result<()> {
    print!("{}", render(&widget.view()));
    handle.await.context("Widget task failed")?;
    print!("{}", render(&widget.view()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["weather-widget", "show", "--lat", "51.5", "--lon", "-0.12"])
            .expect("valid args");

        match cli.command {
            Command::Show { location, place, expand } => {
                assert_eq!(location.lat, Some(51.5));
                assert_eq!(location.lon, Some(-0.12));
                assert!(place.is_none());
                assert!(!expand);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["weather-widget", "run", "--lat", "51.5"]).is_err());
    }

    #[test]
    fn no_locate_conflicts_with_coordinates() {
        let res = Cli::try_parse_from([
            "weather-widget", "run", "--no-locate", "--lat", "1", "--lon", "2",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn place_conflicts_with_coordinates() {
        let res = Cli::try_parse_from([
            "weather-widget", "show", "--place", "Oslo", "--lat", "1", "--lon", "2",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn show_with_place_and_expand() {
        let cli = Cli::try_parse_from(["weather-widget", "show", "--place", "Oslo", "--expand"])
            .expect("valid args");

        match cli.command {
            Command::Show { place, expand, .. } => {
                assert_eq!(place.as_deref(), Some("Oslo"));
                assert!(expand);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn action_labels() {
        assert_eq!(Action::EnterPlace.to_string(), "Enter place");
        assert_eq!(Action::Locate.to_string(), "Locate me again");
    }
}
