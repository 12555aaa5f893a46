use crate::{CacheAction, OutputMode, emit_success};
use jelajah::config::{self, JelajahConfig};
use jelajah::resolver::WriteBack;
use jelajah::server::AppState;
use jelajah::storage::SqliteStore;
use jelajah::ui::{self, Icons, Spinner, WarmProgress};
use jelajah::validate::UrlVerdict;
use jelajah::{PhotoRequest, PhotoSource, PlacePhotoRecord};
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Instant;

pub fn run_init(
    mode: OutputMode,
    config_path: Option<&Path>,
    database: Option<&Path>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path);

    let mut starter = JelajahConfig::starter();
    if let Some(database) = database {
        starter.database = Some(database.to_string_lossy().to_string());
    }
    config::write_config(&path, &starter, force)?;

    let db_path = starter.database_path();
    config::ensure_db_dir(&db_path)?;
    SqliteStore::open(&db_path)?;

    if mode.is_human() {
        ui::success(&format!("Wrote {}", path.display()));
        ui::status(Icons::DATABASE, "Database", &db_path.display().to_string());
        println!();
        println!(
            "  {} set {} to enable the proxy tier",
            Icons::INFO.style(ui::theme().dim.clone()),
            "JELAJAH_PLACES_API_KEY".bold()
        );
    } else {
        emit_success(
            mode,
            "init",
            serde_json::json!({
                "config": path.display().to_string(),
                "database": db_path.display().to_string(),
            }),
        )?;
    }
    Ok(())
}

fn build_request(name: &str, category: Option<String>, max_width: u32) -> anyhow::Result<PhotoRequest> {
    let mut request = PhotoRequest::new(name)?.with_max_width(max_width);
    if let Some(category) = category {
        request = request.with_category(category);
    }
    Ok(request)
}

pub async fn run_resolve(
    mode: OutputMode,
    config: JelajahConfig,
    name: &str,
    category: Option<String>,
    max_width: Option<u32>,
) -> anyhow::Result<()> {
    let request = build_request(name, category, max_width.unwrap_or_else(|| config.max_width()))?;
    // the process exits right after, so write-backs must land first
    let state = AppState::from_config(config, WriteBack::Awaited)?;

    let spinner = mode
        .is_human()
        .then(|| Spinner::new(&format!("Resolving {}...", request.place_name)));
    let started = Instant::now();
    let result = state.resolver.resolve(&request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if mode.is_human() {
        ui::photo_line(&request.place_name, &result);
        ui::timing(&format!("{:.2?}", started.elapsed()));
    } else {
        emit_success(mode, "resolve", serde_json::to_value(&result)?)?;
    }
    Ok(())
}

/// `name` or `name | category`; blank lines and `#` comments are skipped
fn parse_warm_line(line: &str) -> Option<(String, Option<String>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (name, category) = match line.split_once('|') {
        Some((name, category)) => (name.trim(), Some(category.trim())),
        None => (line, None),
    };
    if name.is_empty() {
        return None;
    }
    let category = category.filter(|c| !c.is_empty()).map(str::to_string);
    Some((name.to_string(), category))
}

pub async fn run_warm(
    mode: OutputMode,
    config: JelajahConfig,
    file: &Path,
    category: Option<String>,
) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let entries: Vec<(String, Option<String>)> = contents.lines().filter_map(parse_warm_line).collect();
    if entries.is_empty() {
        anyhow::bail!("no destinations found in {}", file.display());
    }

    let max_width = config.max_width();
    let state = AppState::from_config(config, WriteBack::Awaited)?;

    if mode.is_human() {
        ui::header(&format!("Warming {} destinations", entries.len()));
    }

    let started = Instant::now();
    let mut progress = WarmProgress::new(entries.len());
    let mut results = Vec::with_capacity(entries.len());

    for (name, line_category) in entries {
        progress.start(&name);
        let request = build_request(&name, line_category.or_else(|| category.clone()), max_width)?;
        let result = state.resolver.resolve(&request).await;
        tracing::debug!("{} -> {} ({})", request.place_name, result.image_url, result.source);
        progress.record(result.source);
        results.push(serde_json::json!({
            "placeName": request.place_name,
            "result": result,
        }));
    }

    if mode.is_human() {
        progress.finish_with_summary(started.elapsed());
        let fallbacks = progress
            .tally()
            .iter()
            .find(|(source, _)| *source == PhotoSource::Fallback)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        if fallbacks > 0 {
            ui::warn(&format!("{} destinations only got a category image", fallbacks));
        }
    } else {
        emit_success(mode, "warm", serde_json::Value::Array(results))?;
    }
    Ok(())
}

fn open_store(config: &JelajahConfig) -> anyhow::Result<SqliteStore> {
    let db_path = config.database_path();
    config::ensure_db_dir(&db_path)?;
    Ok(SqliteStore::open(&db_path)?)
}

pub fn run_cache(mode: OutputMode, config: &JelajahConfig, action: CacheAction) -> anyhow::Result<()> {
    let store = open_store(config)?;

    match action {
        CacheAction::Show { name } => {
            let name = jelajah::normalize_place_name(&name);
            let record = store.get_photo(&name)?;
            if !mode.is_human() {
                return emit_success(mode, "cache show", serde_json::to_value(&record)?);
            }
            match record {
                Some(record) => {
                    let verdict = config.url_policy().check(&record.image_url);
                    ui::section(&record.place_name);
                    ui::summary_row("source", &ui::source_label(record.source));
                    ui::summary_row("image", &record.image_url);
                    if let Some(place_id) = &record.place_id {
                        ui::summary_row("place id", place_id);
                    }
                    if let Some(attribution) = &record.attribution {
                        ui::summary_row("attribution", attribution);
                    }
                    ui::summary_row("cached", &record.cached_at.to_rfc3339());
                    ui::summary_row("updated", &record.updated_at.to_rfc3339());
                    ui::verdict_line(&record.image_url, &verdict);
                }
                None => ui::warn(&format!("No cached photo for {:?}", name)),
            }
        }

        CacheAction::List { limit } => {
            let records = store.list_photos(limit)?;
            if !mode.is_human() {
                return emit_success(mode, "cache list", serde_json::to_value(&records)?);
            }
            if records.is_empty() {
                ui::warn("Cache is empty");
            } else {
                println!("{}", ui::photo_table(&records));
            }
        }

        CacheAction::Stats => {
            let stats = store.stats()?;
            if !mode.is_human() {
                return emit_success(mode, "cache stats", serde_json::to_value(&stats)?);
            }
            ui::status(Icons::STATS, "Database", &config.database_path().display().to_string());
            let photos = stats.photos.to_string();
            let mut rows: Vec<(&str, &str)> = vec![("Photos", photos.as_str())];
            let counts: Vec<(String, String)> = stats
                .by_source
                .iter()
                .map(|(source, n)| (source.clone(), n.to_string()))
                .collect();
            rows.extend(counts.iter().map(|(s, n)| (s.as_str(), n.as_str())));
            println!("{}", ui::stats_table(&rows));
        }

        CacheAction::Put {
            name,
            url,
            source,
            place_id,
            attribution,
        } => {
            let source: PhotoSource = source.parse()?;
            if !source.is_cacheable() {
                anyhow::bail!("source {} is never stored in the cache", source);
            }
            let name = jelajah::normalize_place_name(&name);
            if name.is_empty() {
                anyhow::bail!("place name must not be empty");
            }

            let verdict = config.url_policy().check(&url);
            if verdict != UrlVerdict::Accepted && mode.is_human() {
                ui::warn("URL will be ignored on read until its shape is accepted");
            }

            let record = PlacePhotoRecord::new(&name, url.as_str(), source)
                .with_place_id(place_id)
                .with_attribution(attribution);
            store.upsert_photo(&record)?;

            if mode.is_human() {
                ui::success(&format!("Cached {} [{}]", name, source));
            } else {
                emit_success(mode, "cache put", serde_json::to_value(&record)?)?;
            }
        }
    }
    Ok(())
}

pub fn run_check_url(mode: OutputMode, config: &JelajahConfig, url: &str) -> anyhow::Result<()> {
    let verdict = config.url_policy().check(url);

    if mode.is_human() {
        ui::verdict_line(url, &verdict);
    } else {
        let (verdict_name, signature) = match &verdict {
            UrlVerdict::Accepted => ("accepted", None),
            UrlVerdict::Legacy(signature) => ("legacy", Some(signature.clone())),
            UrlVerdict::Unrecognized => ("unrecognized", None),
        };
        emit_success(
            mode,
            "check-url",
            serde_json::json!({
                "url": url,
                "verdict": verdict_name,
                "signature": signature,
            }),
        )?;
    }
    Ok(())
}
