use chrono::{DateTime, Utc};

use crate::events::Event;

const SEPARATOR: &str = "\n===========================================\n";

/// Subject line for a new-events digest.
pub fn subject(count: usize) -> String {
    let noun = if count == 1 { "event" } else { "events" };
    format!("New Campus Events Detected ({count} new {noun})")
}

/// Plain-text digest body listing each new event.
pub fn body(events: &[Event], link_base: Option<&str>) -> String {
    let details: Vec<String> = events
        .iter()
        .map(|event| format_event(event, link_base))
        .collect();

    format!("New events detected:\n\n{}", details.join(SEPARATOR))
}

fn format_event(event: &Event, link_base: Option<&str>) -> String {
    let mut block = format!(
        "\n\u{1F4C5} {name}\n\
         --------------------------------------------------\n\
         \u{1F4CD} Location: {location}\n\
         \u{1F3F7} Type: {kind}\n\
         \u{23F0} When: {when}\n\
         \u{1F465} Max Participants: {max}\n",
        name = event.name,
        location = event.location.as_deref().unwrap_or("N/A"),
        kind = title_case_kind(&event.kind),
        when = format_when(event.begin_at, event.end_at),
        max = event
            .max_people
            .map(|n| n.to_string())
            .unwrap_or_else(|| "Unlimited".to_string()),
    );

    if let Some(base) = link_base {
        block.push_str(&format!(
            "\u{1F517} Link: {}/{}\n",
            base.trim_end_matches('/'),
            event.id
        ));
    }

    block.push_str(&format!(
        "\n\u{1F4DD} Description:\n{}\n",
        event.description.as_deref().unwrap_or("N/A")
    ));

    block
}

fn format_when(begin: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "{} - {} UTC",
        begin.format("%B %d, %Y %H:%M"),
        end.format("%H:%M")
    )
}

/// "piscine_discovery" -> "Piscine Discovery"
fn title_case_kind(kind: &str) -> String {
    kind.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
