use cinedex_core::config::{Config, LoadSettings};
use cinedex_index::SearchClient;

fn main() -> anyhow::Result<()> {
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = LoadSettings::from_config(&config)?;

    println!("Ensuring index '{}' at {} ({})", settings.index, settings.endpoint, settings.region);
    let client = SearchClient::new(&settings)?;
    if client.ensure_index(&settings.index, settings.dim)? {
        println!("✅ Created index '{}' with knn_vector dim {}", settings.index, settings.dim);
    } else {
        println!("Index '{}' already exists, nothing to do", settings.index);
    }
    Ok(())
}
