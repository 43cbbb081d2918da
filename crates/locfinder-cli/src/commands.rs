//! Command handlers. Each builds the clients it needs from the app config.

use std::sync::Arc;

use anyhow::Context as _;
use locfinder_cms::CmsClient;
use locfinder_core::{AppConfig, LocationRecord, TextDirection};
use locfinder_geocoder::{Geocode, GeocoderClient, GeocoderSettings};
use locfinder_map::{
    apply_filters, matches_query, FilterState, LocationDataset, LocationFinder, MapEvent,
    RecordingEngine, Suggestions,
};

fn cms_client(config: &AppConfig) -> anyhow::Result<CmsClient> {
    CmsClient::new(
        &config.cms_base_url,
        config.request_timeout_secs,
        config.cms_max_retries,
        config.cms_retry_backoff_ms,
    )
    .context("failed to build CMS client")
}

fn geocoder(config: &AppConfig) -> anyhow::Result<Option<GeocoderClient>> {
    let Some(settings) = GeocoderSettings::from_config(config) else {
        return Ok(None);
    };
    Ok(Some(
        GeocoderClient::new(settings).context("failed to build geocoder client")?,
    ))
}

/// Loads the full dataset. Unlike the finder, a CMS failure is an error
/// here: an editor asking for the list wants to know it failed.
async fn load_dataset(cms: &CmsClient) -> anyhow::Result<LocationDataset> {
    let content = cms
        .fetch_city_locations()
        .await
        .context("failed to fetch city locations")?;
    let filters = cms
        .fetch_location_filters()
        .await
        .context("failed to fetch location filters")?;
    let ratings = match cms.fetch_location_ratings().await {
        Ok(ratings) => ratings,
        Err(e) => {
            tracing::warn!(error = %e, "ratings unavailable; continuing without them");
            std::collections::HashMap::new()
        }
    };
    Ok(LocationDataset::from_content(content, filters, &ratings))
}

fn print_record(record: &LocationRecord) {
    let position = record.coordinate.map_or_else(
        || "unmapped".to_string(),
        |c| format!("{:.5},{:.5}", c.lat, c.lng),
    );
    let status = record
        .status_label()
        .map(|label| format!(" [{label}]"))
        .unwrap_or_default();
    println!(
        "{:<38} {:<28} {:<12} {:<4} {}{}",
        record.id,
        record.name,
        record.city.as_deref().unwrap_or("-"),
        record.region_label(),
        position,
        status
    );
}

pub(crate) async fn run_locations(
    config: &AppConfig,
    country: Option<usize>,
    city: Option<&str>,
    filter_ids: &[String],
) -> anyhow::Result<()> {
    let dataset = load_dataset(&cms_client(config)?).await?;

    let mut state = FilterState::default();
    if let Some(tab) = country {
        let Some(country_tab) = dataset.countries().get(tab) else {
            anyhow::bail!("no country tab {tab}; {} available", dataset.countries().len());
        };
        println!("country: {} ({})", country_tab.name, country_tab.cities.join(", "));
        state.select_country(tab);
    }
    state.select_city(city);
    for id in filter_ids {
        state.toggle(id);
    }
    state.submit();

    let outcome = apply_filters(&dataset, &state);
    if outcome.no_match {
        println!("No Location Found: the selected filters have no location in common.");
        return Ok(());
    }
    for record in &outcome.visible {
        print_record(record);
    }
    println!(
        "{} of {} locations",
        outcome.visible.len(),
        dataset.records().len()
    );
    Ok(())
}

pub(crate) async fn run_filters(config: &AppConfig) -> anyhow::Result<()> {
    let filters = cms_client(config)?
        .fetch_location_filters()
        .await
        .context("failed to fetch location filters")?;
    for filter in &filters {
        println!(
            "{:<38} {:<30} {} locations",
            filter.id,
            filter.name,
            filter.location_ids.len()
        );
    }
    Ok(())
}

pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    pick: Option<usize>,
) -> anyhow::Result<()> {
    let Some(geocoder) = geocoder(config)? else {
        anyhow::bail!("LOCFINDER_MAPBOX_TOKEN is not set; search is disabled");
    };
    if query.chars().count() < config.search_min_query_len {
        println!(
            "query shorter than {} characters; no suggestions shown",
            config.search_min_query_len
        );
        return Ok(());
    }

    let result = geocoder.suggest(query).await;
    let shown: Vec<&String> = result
        .suggestions
        .iter()
        .filter(|s| matches_query(s, query))
        .collect();
    if shown.is_empty() {
        println!("Locations not found.");
        return Ok(());
    }
    for (i, suggestion) in shown.iter().enumerate() {
        println!("{i:>2}. {suggestion}");
    }

    let index = pick.unwrap_or(0);
    let Some(picked) = shown.get(index) else {
        anyhow::bail!("no suggestion {index}; {} shown", shown.len());
    };
    let Some(top) = result.top else {
        println!("no coordinate resolved for \"{picked}\"");
        return Ok(());
    };

    let dataset = load_dataset(&cms_client(config)?).await?;
    match dataset.nearest(&top) {
        Some(record) => {
            let km = record.coordinate.map_or(0.0, |c| c.distance_km(&top));
            println!("nearest to \"{picked}\" ({km:.1} km):");
            print_record(record);
        }
        None => println!("no mapped location to fly to"),
    }
    Ok(())
}

pub(crate) async fn run_page(config: &AppConfig, slug: &str) -> anyhow::Result<()> {
    let blocks = cms_client(config)?
        .fetch_page_blocks(slug)
        .await
        .with_context(|| format!("failed to fetch page \"{slug}\""))?;
    for block in &blocks {
        let marker = if block.kind.is_location_finder() {
            "  <- location finder"
        } else {
            ""
        };
        println!(
            "{:<24} {}{marker}",
            block.kind.to_string(),
            block.id.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub(crate) async fn run_preview(
    config: &AppConfig,
    city: Option<&str>,
    filter_ids: &[String],
    card: Option<usize>,
    query: Option<&str>,
) -> anyhow::Result<()> {
    let cms = cms_client(config)?;
    let geocoder = geocoder(config)?.map(|client| Arc::new(client) as Arc<dyn Geocode>);

    let mut finder =
        LocationFinder::new(config, RecordingEngine::new(), geocoder, TextDirection::Ltr);
    finder.map_visible();
    finder.handle_map_event(MapEvent::Loaded);
    finder.load(&cms).await;

    if city.is_some() {
        finder.select_city(city);
    }
    if !filter_ids.is_empty() {
        for id in filter_ids {
            finder.toggle_filter(id);
        }
        finder.submit_filters();
    }
    if let Some(index) = card {
        finder.card_clicked(index);
    }
    if let Some(query) = query {
        finder.set_query(query);
        finder.search_settled().await;
        match finder.suggestions() {
            Suggestions::Items(items) => {
                if let Some(id) = finder.select_suggestion(&items[0]) {
                    println!("search: \"{}\" -> {id}", items[0]);
                }
            }
            Suggestions::NotFound => println!("search: Locations not found."),
            Suggestions::Hidden => println!("search: query too short"),
        }
    }
    finder.handle_map_event(MapEvent::MoveEnd);

    println!("view: {:?}", finder.view());
    println!("map: {:?}", finder.surface().state());
    println!("visible: {}", finder.visible().len());
    let engine = finder.surface().engine();
    println!("markers: {}", engine.marker_count());
    println!("animations: {}", engine.fly_count());
    match finder.surface().open_popup() {
        Some(id) => println!("popup: {id}"),
        None => println!("popup: none"),
    }
    if let Some(active) = finder.active_card() {
        println!("active card: {active}");
    }

    finder.teardown();
    Ok(())
}
