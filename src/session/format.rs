//! Output formatting for session and one-shot commands.
//!
//! Human-readable lines by default; with `--json`, one JSON object per
//! line so the output can be piped into other tools.

use std::io::{self, Write};

use serde::Serialize;

use crate::backend::{Resolution, Suggestion};
use crate::control::{ListEvent, Notification};

/// JSON shape of a notification.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Suggestions { suggestions: &'a [Suggestion] },
    Resolvable { resolvable: bool },
    Selected { words: &'a str },
    List { phase: &'static str },
}

fn phase(event: ListEvent) -> &'static str {
    match event {
        ListEvent::WillAppear => "will_appear",
        ListEvent::DidAppear => "did_appear",
        ListEvent::WillDisappear => "will_disappear",
        ListEvent::DidDisappear => "did_disappear",
    }
}

/// Write one notification as a line (or a table, for suggestion lists).
pub fn write_notification(
    out: &mut impl Write,
    notification: &Notification,
    json: bool,
) -> io::Result<()> {
    if json {
        let event = match notification {
            Notification::SuggestionsChanged(list) => Event::Suggestions { suggestions: list },
            Notification::ResolvableChanged(resolvable) => Event::Resolvable {
                resolvable: *resolvable,
            },
            Notification::Selected(words) => Event::Selected { words },
            Notification::List(event) => Event::List {
                phase: phase(*event),
            },
        };
        serde_json::to_writer(&mut *out, &event)?;
        writeln!(out)?;
        return Ok(());
    }

    match notification {
        Notification::SuggestionsChanged(list) => write_table(out, list)?,
        Notification::ResolvableChanged(true) => writeln!(out, "✓ valid address")?,
        Notification::ResolvableChanged(false) => writeln!(out, "✗ not a known address")?,
        Notification::Selected(words) => writeln!(out, "selected ///{words}")?,
        Notification::List(event) => writeln!(out, "list {}", phase(*event))?,
    }
    Ok(())
}

/// Print one notification to stdout.
pub fn print_notification(notification: &Notification, json: bool) -> io::Result<()> {
    write_notification(&mut io::stdout().lock(), notification, json)
}

/// Print a suggestion list to stdout.
pub fn print_suggestions(suggestions: &[Suggestion], json: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, suggestions)?;
        writeln!(stdout)?;
        return Ok(());
    }
    write_table(&mut stdout, suggestions)
}

/// Print the outcome of a resolution.
pub fn print_resolution(words: &str, resolution: &Resolution) {
    match resolution {
        Resolution::Found(point) => println!("///{words} -> {point}"),
        Resolution::NotFound => println!("///{words} is not a known address"),
    }
}

fn write_table(out: &mut impl Write, suggestions: &[Suggestion]) -> io::Result<()> {
    if suggestions.is_empty() {
        return writeln!(out, "No suggestions");
    }
    for (i, s) in suggestions.iter().enumerate() {
        writeln!(out, "{i:>2}  {}", describe(s))?;
    }
    Ok(())
}

/// One-line description: `///words  nearest place (CC)[, N km]`.
fn describe(s: &Suggestion) -> String {
    let mut line = format!("///{:<28} {} ({})", s.words, s.nearest_place, s.country);
    if let Some(km) = s.distance_to_focus_km {
        line.push_str(&format!(", {km} km"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(words: &str, distance: Option<f64>) -> Suggestion {
        Suggestion {
            words: words.into(),
            nearest_place: "Bayswater, London".into(),
            country: "GB".into(),
            rank: 1,
            distance_to_focus_km: distance,
        }
    }

    #[test]
    fn describe_without_distance() {
        let line = describe(&suggestion("index.home.raft", None));
        assert!(line.starts_with("///index.home.raft "));
        assert!(line.ends_with("Bayswater, London (GB)"));
    }

    #[test]
    fn describe_with_distance() {
        let line = describe(&suggestion("index.home.raft", Some(2.0)));
        assert!(line.ends_with("(GB), 2 km"));
    }

    #[test]
    fn table_numbers_rows() {
        let mut out = Vec::new();
        write_table(
            &mut out,
            &[suggestion("lock.spout.radar", None), suggestion("filled.count.soap", None)],
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 0  ///lock.spout.radar"));
        assert!(lines[1].starts_with(" 1  ///filled.count.soap"));
    }

    #[test]
    fn empty_table() {
        let mut out = Vec::new();
        write_table(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No suggestions\n");
    }

    #[test]
    fn json_event_shape() {
        let event = Event::Selected {
            words: "filled.count.soap",
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"selected","words":"filled.count.soap"}"#
        );

        let list = [suggestion("index.home.raft", None)];
        let event = Event::Suggestions { suggestions: &list };
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "suggestions");
        assert_eq!(value["suggestions"][0]["nearestPlace"], "Bayswater, London");
        assert!(value["suggestions"][0].get("distanceToFocusKm").is_none());
    }
}
