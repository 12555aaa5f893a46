use crate::place::ResolutionResult;
use crate::source::PhotoSource;
use crate::ui::{theme, Icons};
use crate::validate::UrlVerdict;
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::GLOBE, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

/// Provenance tag colored by how trustworthy the tier is
pub fn source_label(source: PhotoSource) -> String {
    let style = match source {
        PhotoSource::Cache | PhotoSource::GooglePlaces | PhotoSource::GoogleCached => theme().success.clone(),
        PhotoSource::GoogleDirect | PhotoSource::Wikimedia | PhotoSource::Curated => theme().info.clone(),
        PhotoSource::Fallback => theme().warn.clone(),
        PhotoSource::NotFound => theme().error.clone(),
    };
    source.as_str().style(style).to_string()
}

pub fn photo_line(place_name: &str, result: &ResolutionResult) {
    println!(
        "{} {} [{}]",
        Icons::PIN,
        place_name.style(theme().header.clone()),
        source_label(result.source),
    );
    println!("   {} {}", Icons::IMAGE, result.image_url.style(theme().link.clone()));
    if let Some(place_id) = &result.place_id {
        summary_row("place id", place_id);
    }
    if let Some(attribution) = &result.attribution {
        summary_row("attribution", attribution);
    }
}

pub fn verdict_line(url: &str, verdict: &UrlVerdict) {
    match verdict {
        UrlVerdict::Accepted => success(&format!("accepted: {}", url)),
        UrlVerdict::Legacy(signature) => warn(&format!("legacy ({}): {}", signature, url)),
        UrlVerdict::Unrecognized => warn(&format!("unrecognized shape: {}", url)),
    }
}

pub fn timing(elapsed: &str) {
    println!("{} {}", Icons::CLOCK.style(theme().dim.clone()), elapsed);
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}
