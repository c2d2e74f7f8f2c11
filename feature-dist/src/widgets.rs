use ratatui::text::Span;

/// Spinner frames for the loading indicator.
const SPINNER: [&str; 8] = ["|", "/", "-", "\\", "|", "/", "-", "\\"];

/// Progress indicator text for the given animation frame.
/// Returns: "| Loading distributions..." with the dots cycling.
pub fn spinner(frame: usize) -> String {
    let dots = match frame % 4 {
        0 => ".",
        1 => "..",
        2 => "...",
        _ => "",
    };
    format!("{} Loading distributions{}", SPINNER[frame % SPINNER.len()], dots)
}

/// Axis tick text. Whole numbers print without decimals, others with two.
pub fn format_axis_label(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Min, mid and max labels for an axis range.
pub fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let [min, max] = bounds;
    vec![
        Span::raw(format_axis_label(min)),
        Span::raw(format_axis_label((min + max) / 2.0)),
        Span::raw(format_axis_label(max)),
    ]
}

/// Relative time formatting.
pub fn relative_time(secs: u64) -> String {
    if secs < 5 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        let m = secs / 60;
        let s = secs % 60;
        if s > 0 {
            format!("{}m{}s ago", m, s)
        } else {
            format!("{}m ago", m)
        }
    } else {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        if m > 0 {
            format!("{}h{}m ago", h, m)
        } else {
            format!("{}h ago", h)
        }
    }
}
