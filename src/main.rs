use std::{path::Path, sync::Arc};

use anyhow::Context;
use bookstore::{
    CatalogClient, CatalogEvent, CatalogViewModel, Config, DetailViewModel, ImageCache,
    PreferenceStore,
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};

type BookStoreResult<T> = anyhow::Result<T>;

#[tokio::main]
async fn main() -> BookStoreResult<()> {
    // Initialize tracing (logs). Respect RUST_LOG if set, default to info for our crate
    // and warn for deps.
    let default_filter = format!("{}=info,reqwest=warn,h2=warn", env!("CARGO_CRATE_NAME"));
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_level(true)
        .pretty()
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting bookstore");

    // Load environment variables from .env files
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let client = CatalogClient::with_http_client(config.catalog_client_config(), http.clone());
    let preferences = Arc::new(PreferenceStore::open(&config.preferences_path));
    let images = Arc::new(ImageCache::new(http));
    tracing::info!(
        api_url = %config.api_url,
        mock_data = ?config.mock_data_path,
        preferences = %config.preferences_path.display(),
        "configured catalog"
    );

    let (view_model, mut events) = CatalogViewModel::new(client, preferences, images);
    view_model
        .refresh()
        .await
        .context("Failed to load the catalog")?;
    view_model.select(0);

    // This loop is the single update context all notifications are delivered on.
    while let Ok(event) = events.try_recv() {
        match event {
            CatalogEvent::DataChanged => render_list(&view_model).await,
            CatalogEvent::BookSelected(book) => render_detail(&view_model.detail_view_model(book)),
        }
    }
    Ok(())
}

async fn render_list(view_model: &CatalogViewModel) {
    if view_model.is_empty() {
        println!("{}", view_model.empty_list_message());
        return;
    }

    let cells: Vec<_> = (0..view_model.count())
        .filter_map(|index| view_model.cell_view_model(index))
        .collect();
    let thumbnails = futures::future::join_all(cells.iter().map(|cell| cell.thumbnail())).await;

    println!(
        "[{}] {} books",
        view_model.display_mode_symbol(),
        cells.len()
    );
    for (index, (cell, thumbnail)) in cells.iter().zip(thumbnails).enumerate() {
        let cover = thumbnail
            .map(|image| format!("{}x{}", image.width(), image.height()))
            .unwrap_or_else(|| "no cover".into());
        println!("{index:>3}. {} ({cover})", cell.title());
    }
}

fn render_detail(detail: &DetailViewModel) {
    println!();
    println!("{} [{}]", detail.title(), detail.favorite_symbol());
    println!("{}", detail.authors_line());
    println!("{}", detail.formatted_description().text);
    if let Some(link) = detail.buy_link() {
        println!("{}: {}", detail.buy_button_title(), link);
    }
}
