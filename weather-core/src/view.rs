//! Renderer-independent description of what the widget shows.

use crate::{
    AccumulationWindow, WidgetState,
    present::{observation_time, precipitation_amount, precipitation_label, wind_direction, wind_gust},
};

pub const PLACE_PLACEHOLDER: &str = "Enter place";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct View {
    /// Loading indicator; when set nothing else is shown.
    pub spinner: bool,
    pub reload: bool,
    pub form: Option<FormView>,
    pub panel: Option<PanelView>,
}

/// Manual place entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub value: String,
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub title: String,
    pub expanded: bool,
    pub fields: Vec<Field>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

impl PanelView {
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.label == label).map(|f| f.value.as_str())
    }
}

pub fn render(state: &WidgetState) -> View {
    if state.is_loading() {
        return View { spinner: true, ..View::default() };
    }

    let form = (!state.location_enabled()).then(|| FormView {
        value: state.place().to_string(),
        placeholder: PLACE_PLACEHOLDER,
    });

    View {
        spinner: false,
        reload: true,
        form,
        panel: state.snapshot().map(|snapshot| panel(snapshot, state.expanded())),
    }
}

fn panel(s: &crate::WeatherSnapshot, expanded: bool) -> PanelView {
    let label = precipitation_label(s);
    let mut fields = vec![
        Field::new("Conditions", s.conditions()),
        Field::new("Temperature (actual)", format!("{} °C", s.main.temp)),
    ];

    if expanded {
        fields.push(Field::new("Temperature (feels like)", format!("{} °C", s.main.feels_like)));
        for window in [AccumulationWindow::OneHour, AccumulationWindow::ThreeHours] {
            fields.push(Field::new(
                format!("{label} ({})", window.caption()),
                precipitation_amount(s, window),
            ));
        }
    }

    fields.push(Field::new("Pressure", format!("{} hPa", s.main.pressure)));

    if expanded {
        fields.push(Field::new("Humidity", format!("{} %", s.main.humidity)));
    }

    fields.push(Field::new("Wind speed", format!("{} m/s", s.wind.speed)));

    if expanded {
        fields.push(Field::new("Wind gust", wind_gust(s)));
        fields.push(Field::new("Wind direction", wind_direction(s.wind.deg)));
        fields.push(Field::new("Clouds", format!("{} %", s.clouds.all)));
    }

    PanelView {
        title: format!("Weather for {}", s.name),
        expanded,
        fields,
        note: format!("Data loaded at {}", observation_time(s)),
    }
}
