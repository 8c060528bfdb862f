use weather_core::view::View;

const LABEL_WIDTH: usize = 26;

/// Draw the widget view as plain text.
pub fn render(view: &View) -> String {
    if view.spinner {
        return "  · · ·  loading\n".to_string();
    }

    let mut out = String::new();

    if view.reload {
        out.push_str("[⟳ reload]\n");
    }

    if let Some(form) = &view.form {
        let shown = if form.value.is_empty() {
            format!("<{}>", form.placeholder)
        } else {
            form.value.clone()
        };
        out.push_str(&format!("Place: {shown}\n"));
    }

    if let Some(panel) = &view.panel {
        out.push('\n');
        out.push_str(&panel.title);
        out.push('\n');
        for field in &panel.fields {
            out.push_str(&format!("  {:<LABEL_WIDTH$} {}\n", format!("{}:", field.label), field.value));
        }
        if !panel.expanded {
            out.push_str("  (toggle details for more)\n");
        }
        out.push_str(&panel.note);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::view::{Field, FormView, PanelView};

    #[test]
    fn spinner_hides_everything_else() {
        let view = View { spinner: true, reload: true, ..View::default() };
        assert_eq!(render(&view), "  · · ·  loading\n");
    }

    #[test]
    fn empty_form_shows_placeholder() {
        let view = View {
            reload: true,
            form: Some(FormView { value: String::new(), placeholder: "Enter place" }),
            ..View::default()
        };

        assert_eq!(render(&view), "[⟳ reload]\nPlace: <Enter place>\n");
    }

    #[test]
    fn panel_lists_fields_with_aligned_labels() {
        let view = View {
            reload: true,
            panel: Some(PanelView {
                title: "Weather for London".into(),
                expanded: false,
                fields: vec![Field { label: "Pressure".into(), value: "1012 hPa".into() }],
                note: "Data loaded at now".into(),
            }),
            ..View::default()
        };

        let text = render(&view);
        assert!(text.contains("Weather for London\n"));
        assert!(text.contains(&format!("  {:<26} 1012 hPa\n", "Pressure:")));
        assert!(text.contains("(toggle details for more)"));
        assert!(text.ends_with("Data loaded at now\n"));
    }
}
