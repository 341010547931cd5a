mod app;
mod config;
mod script;

use std::path::{Path, PathBuf};

use backend::HttpBackend;
use catalog::{JsonFileLayerStore, LayerRecord, LayerStore};
use clap::{Parser, Subcommand};
use compute::HashSampler;
use foundation::math::LonLat;
use layers::symbology::{symbology, LegendScale};
use layers::ProcessingType;
use runtime::BusMessage;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::{ExplorerConfig, Overrides};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Earth-observation map explorer")]
struct Args {
    /// Earth-observation service (env: EXPLORER_BACKEND_URL)
    #[arg(long)]
    backend_url: Option<String>,

    /// Owner of saved layers (env: EXPLORER_USER_ID)
    #[arg(long)]
    user: Option<String>,

    /// Directory of the local layer store (env: EXPLORER_STORE_DIR)
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Raster tile edge in pixels (env: EXPLORER_TILE_SIZE)
    #[arg(long)]
    tile_size: Option<u32>,

    /// Camera flight when focusing a layer (env: EXPLORER_FLY_DURATION_MS)
    #[arg(long)]
    fly_duration_ms: Option<u32>,

    /// Opacity of new layers (env: EXPLORER_DEFAULT_OPACITY)
    #[arg(long)]
    opacity: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scripted session and write the drawn features as GeoJSON
    Replay {
        script: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Send a prompt to the service and stack the resulting layer
    Query {
        prompt: String,

        /// Also save the new layer through the service's layer endpoints
        #[arg(long)]
        remote_save: bool,
    },

    /// Print the synthetic pixel value of a processing type at a coordinate
    Sample {
        processing_type: String,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },

    /// Print the legend of a processing type
    Legend { processing_type: String },

    /// Manage saved layers
    Layers {
        /// Use the service's layer endpoints instead of the local store
        #[arg(long)]
        remote: bool,

        #[command(subcommand)]
        action: LayersAction,
    },
}

#[derive(Subcommand, Debug)]
enum LayersAction {
    List,
    Delete { id: String },
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = ExplorerConfig::resolve(Overrides {
        backend_url: args.backend_url,
        user_id: args.user,
        store_dir: args.store_dir,
        tile_size: args.tile_size,
        fly_duration_ms: args.fly_duration_ms,
        default_opacity: args.opacity,
    });
    info!(backend = %config.backend_url, user = %config.user_id, "explorer");

    match args.command {
        Command::Replay { script, out } => replay(config, &script, out).await?,
        Command::Query {
            prompt,
            remote_save,
        } => query(config, &prompt, remote_save).await?,
        Command::Sample {
            processing_type,
            lon,
            lat,
        } => sample(&processing_type, LonLat::new(lon, lat))?,
        Command::Legend { processing_type } => legend(&processing_type),
        Command::Layers { remote, action } => layers(config, remote, action).await?,
    }

    Ok(())
}

async fn replay(
    config: ExplorerConfig,
    path: &Path,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let script = script::parse(&raw)?;
    let report = script::replay(config, script).await;

    print_messages(&report.messages);
    for line in &report.samples {
        println!("{line}");
    }
    if let Some(km) = report.measurement_km {
        println!("measuring: {km:.2} km");
    }
    println!("layers (top first): {}", report.layers.join(", "));
    println!("render order (bottom first): {}", report.render_order.join(", "));

    let export = serde_json::to_string_pretty(&report.export)?;
    match out {
        Some(out) => {
            tokio::fs::write(&out, export).await?;
            info!(actions = report.actions, path = %out.display(), "export written");
        }
        None => println!("{export}"),
    }
    Ok(())
}

async fn query(
    config: ExplorerConfig,
    prompt: &str,
    remote_save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = HttpBackend::new(&config.backend_url)?;
    let store = JsonFileLayerStore::open(&config.store_dir)?;
    let user = config.user_id.clone();
    let mut app = App::new(config, Box::new(store));
    let console = app.subscribe();
    let restored = app.restore_saved();
    info!(restored, "saved layers restored");

    let added = app.submit_prompt(&backend, prompt).await;
    if let Some(layer) = added.as_ref().and_then(|id| app.stack().get(id)) {
        if remote_save {
            backend
                .save_layer(&user, layer.id.as_str(), &LayerRecord::from(layer))
                .await?;
        }
    }

    let messages: Vec<BusMessage> = app
        .bus_mut()
        .drain(console)
        .into_iter()
        .map(|e| e.message)
        .collect();
    print_messages(&messages);
    for (i, layer) in app.stack().layers().iter().enumerate() {
        println!("{i}\t{}\t{}\t{}", layer.id, layer.label(), layer.visibility.layout_value());
    }
    if let Some(camera) = app.map().engine().camera() {
        println!("camera: {} @ zoom {}", camera.center, camera.zoom);
    }
    Ok(())
}

fn sample(processing_type: &str, at: LonLat) -> Result<(), Box<dyn std::error::Error>> {
    if !at.is_finite() {
        return Err(format!("cannot sample at {at}").into());
    }
    let sample = HashSampler::sample_type(&ProcessingType::parse(processing_type), at);
    println!("{sample}");
    println!("{}", serde_json::to_string(&sample)?);
    Ok(())
}

fn legend(processing_type: &str) {
    let pt = ProcessingType::parse(processing_type);
    let sym = symbology(&pt);
    println!("{pt}: focus zoom {}", sym.focus_zoom);
    let Some(legend) = sym.legend else {
        println!("no legend");
        return;
    };
    println!("{}", legend.title);
    match legend.scale {
        LegendScale::Gradient { stops, min, max } => {
            println!("{min} .. {max}: {}", stops.join(" "));
        }
        LegendScale::Categories(categories) => {
            for c in categories {
                println!("{}\t{}", c.color, c.label);
            }
        }
        LegendScale::None => {}
    }
    println!("{}", legend.description);
}

async fn layers(
    config: ExplorerConfig,
    remote: bool,
    action: LayersAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = config.user_id.as_str();
    if remote {
        let backend = HttpBackend::new(&config.backend_url)?;
        match action {
            LayersAction::List => {
                for record in backend.list_layers(user).await? {
                    println!("{}\t{} ({})", record.id, record.location, record.processing_type);
                }
            }
            LayersAction::Delete { id } => {
                println!("deleted: {}", backend.delete_layer(user, &id).await?);
            }
            LayersAction::Clear => {
                println!("cleared: {}", backend.clear_layers(user).await?);
            }
        }
        return Ok(());
    }

    let mut store = JsonFileLayerStore::open(&config.store_dir)?;
    match action {
        LayersAction::List => {
            for record in store.list(user)? {
                println!("{}\t{} ({})", record.id, record.location, record.processing_type);
            }
        }
        LayersAction::Delete { id } => println!("deleted: {}", store.delete(user, &id)?),
        LayersAction::Clear => println!("cleared: {}", store.clear_all(user)?),
    }
    Ok(())
}

fn print_messages(messages: &[BusMessage]) {
    for message in messages {
        match message {
            BusMessage::Advisory(advisory) => println!("{advisory}"),
            BusMessage::Chat(chat) => {
                if let Some(prompt) = &chat.prompt {
                    println!("> {prompt}");
                }
                if let Some(response) = &chat.response {
                    println!("< {response}");
                }
            }
        }
    }
}
