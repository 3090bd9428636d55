use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use cinedex_core::config::{expand_path, Config, LoadSettings};
use cinedex_embed::get_default_embedder;
use cinedex_index::SearchClient;
use cinedex_loader::BatchLoader;

fn main() -> anyhow::Result<()> {
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let mut settings = LoadSettings::from_config(&config)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut skip_ensure = false;
    let mut data_file = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--skip-ensure-index" | "-s" => skip_ensure = true,
            "--batch-size" => {
                if i + 1 < args.len() {
                    if let Ok(size) = args[i + 1].parse::<usize>() {
                        settings.batch_size = size;
                        i += 1;
                    } else {
                        eprintln!("Error: --batch-size requires a number");
                        std::process::exit(1);
                    }
                } else {
                    eprintln!("Error: --batch-size requires a number");
                    std::process::exit(1);
                }
            }
            _ if !args[i].starts_with('-') => data_file = Some(PathBuf::from(&args[i])),
            _ => {}
        }
        i += 1;
    }
    settings.validate()?;
    let data_file = data_file.unwrap_or_else(|| {
        let path: String = config
            .get("data.movies_file")
            .unwrap_or_else(|_| "data/sample-movies.ndjson".to_string());
        expand_path(path)
    });

    println!("Cinedex Bulk Loader\n===================");
    println!("Endpoint: {} ({})", settings.endpoint, settings.region);
    println!("Index: {} (dim {})", settings.index, settings.dim);
    println!("Data file: {}", data_file.display());
    if skip_ensure {
        println!("⚠️  Skipping index provisioning (--skip-ensure-index flag)");
    }

    let client = SearchClient::new(&settings)?;
    if !skip_ensure {
        if client.ensure_index(&settings.index, settings.dim)? {
            println!("Created index: {}", settings.index);
        } else {
            println!("Index already exists: {}", settings.index);
        }
    }

    let embedder = get_default_embedder(&settings)?;
    let loader = BatchLoader::new(embedder.as_ref(), &client, &settings);
    let file = File::open(&data_file)?;
    let stats = loader.load_all(BufReader::new(file))?;

    println!("\n✅ Load completed successfully!");
    println!("📊 {} records read ({} action headers skipped)", stats.records, stats.headers_skipped);
    println!("📊 {} documents indexed in {} bulk requests", stats.indexed, stats.batches);
    Ok(())
}
