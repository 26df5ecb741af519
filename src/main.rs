use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use vibestage::config::Config;
use vibestage::db::{Database, JobStore};
use vibestage::generation::HttpImageGenerator;
use vibestage::llm::PhotoTagger;
use vibestage::logging;
use vibestage::scoring::{
    compute_buyer_vibe_vector, compute_listing_vibe_vector, rank_lead_candidates, SwipeEvent, VibeVector,
};
use vibestage::staging::{
    AssetWriter, BatchRequest, BatchStatus, JobStatusView, QueueSettings, StagingQueue, StagingService, Strictness,
};

enum Command {
    Stage {
        image: PathBuf,
        room: String,
        vibes: Vec<String>,
        strict: bool,
        notes: Option<String>,
    },
    Status {
        batch_id: String,
    },
    ListingVector {
        description: String,
        fields: BTreeMap<String, String>,
        photos: Vec<PathBuf>,
    },
    BuyerVector {
        events: PathBuf,
    },
    Leads {
        events: PathBuf,
        listings: PathBuf,
    },
}

struct Cli {
    config_path: Option<PathBuf>,
    command: Command,
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("Run `vibestage --help` for usage.");
    std::process::exit(1);
}

fn parse_args() -> Cli {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config_path = None;
    let mut positional = Vec::new();
    let mut room = None;
    let mut vibes = Vec::new();
    let mut strict = false;
    let mut notes = None;
    let mut description = String::new();
    let mut fields = BTreeMap::new();
    let mut photos = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let value = |i: usize| -> String {
            match args.get(i + 1) {
                Some(v) => v.clone(),
                None => fail(&format!("{} requires a value", args[i])),
            }
        };
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("vibestage {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                config_path = Some(PathBuf::from(value(i)));
                i += 1;
            }
            "--room" => {
                room = Some(value(i));
                i += 1;
            }
            "--vibes" => {
                vibes.extend(
                    value(i)
                        .split(',')
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty()),
                );
                i += 1;
            }
            "--strict" => strict = true,
            "--notes" => {
                notes = Some(value(i));
                i += 1;
            }
            "--description" => {
                description = value(i);
                i += 1;
            }
            "--field" => {
                let pair = value(i);
                match pair.split_once('=') {
                    Some((k, v)) => {
                        fields.insert(k.trim().to_string(), v.trim().to_string());
                    }
                    None => fail("--field expects KEY=VALUE"),
                }
                i += 1;
            }
            "--photo" => {
                photos.push(PathBuf::from(value(i)));
                i += 1;
            }
            arg if arg.starts_with('-') => fail(&format!("unknown argument: {}", arg)),
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("stage") => Command::Stage {
            image: positional
                .next()
                .map(PathBuf::from)
                .unwrap_or_else(|| fail("stage requires an image path")),
            room: room.unwrap_or_else(|| fail("stage requires --room")),
            vibes,
            strict,
            notes,
        },
        Some("status") => Command::Status {
            batch_id: positional
                .next()
                .unwrap_or_else(|| fail("status requires a batch id")),
        },
        Some("listing-vector") => Command::ListingVector {
            description,
            fields,
            photos,
        },
        Some("buyer-vector") => Command::BuyerVector {
            events: positional
                .next()
                .map(PathBuf::from)
                .unwrap_or_else(|| fail("buyer-vector requires an events file")),
        },
        Some("leads") => {
            let events = positional.next().map(PathBuf::from);
            let listings = positional.next().map(PathBuf::from);
            match (events, listings) {
                (Some(events), Some(listings)) => Command::Leads { events, listings },
                _ => fail("leads requires an events file and a listings file"),
            }
        }
        Some(other) => fail(&format!("unknown command: {}", other)),
        None => {
            print_help();
            std::process::exit(1);
        }
    };

    Cli {
        config_path,
        command,
    }
}

fn print_help() {
    println!(
        r#"vibestage - vibe matching and virtual staging

USAGE:
    vibestage [OPTIONS] <COMMAND>

COMMANDS:
    stage <IMAGE> --room <TYPE> --vibes <A,B,..> [--strict] [--notes TEXT]
                            Stage a room photo in each vibe and wait for the results
    status <BATCH_ID>       Show the stored status of a staging batch
    listing-vector [--description TEXT] [--field KEY=VALUE].. [--photo PATH]..
                            Infer a listing's vibe vector (photos are tagged first)
    buyer-vector <EVENTS_JSON>
                            Aggregate a JSON array of swipe events into a vibe vector
    leads <EVENTS_JSON> <LISTINGS_JSON>
                            Rank listings ({{"listingId", "vector"}}) against a buyer

OPTIONS:
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    VIBESTAGE_CONFIG    Path to config file (overrides default location)
    VIBESTAGE_LOG       Log filter (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/vibestage/config.toml"#
    );
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingVectorRecord {
    listing_id: String,
    vector: VibeVector,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn open_database(config: &Config) -> Result<Arc<Database>> {
    let db = Database::open(&config.db_path)?;
    db.initialize()?;
    Ok(Arc::new(db))
}

async fn stage(
    config: &Config,
    image: PathBuf,
    room: String,
    vibes: Vec<String>,
    strict: bool,
    notes: Option<String>,
) -> Result<()> {
    if !image.exists() {
        bail!("input image {} does not exist", image.display());
    }

    let db = open_database(config)?;
    let queue = Arc::new(StagingQueue::start(
        QueueSettings::from_config(config),
        db.clone(),
        Arc::new(HttpImageGenerator::from_config(&config.generation)),
        AssetWriter::new(&config.assets.output_dir),
    ));
    let service = StagingService::new(db, queue.clone());

    let receipt = service.submit_batch(BatchRequest {
        input_image: image.to_string_lossy().into_owned(),
        room_type: room,
        selected_vibes: vibes,
        strictness: if strict { Strictness::Strict } else { Strictness::Normal },
        room_notes: notes,
    })?;
    eprintln!("Submitted batch {} ({} jobs)", receipt.batch_id, receipt.jobs.len());

    queue.wait_idle().await;
    queue.shutdown().await;

    match service.batch_status(&receipt.batch_id)? {
        Some(status) => print_json(&status),
        None => bail!("batch {} vanished from the store", receipt.batch_id),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args();

    let _ = logging::init(None);

    let config = match cli.config_path {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Stage {
            image,
            room,
            vibes,
            strict,
            notes,
        } => stage(&config, image, room, vibes, strict, notes).await,
        Command::Status { batch_id } => {
            let db = open_database(&config)?;
            let jobs = db.jobs_for_batch(&batch_id)?;
            if jobs.is_empty() {
                bail!("no staging batch with id {}", batch_id);
            }
            print_json(&BatchStatus {
                batch_id,
                jobs: jobs.iter().map(JobStatusView::from).collect(),
            })
        }
        Command::ListingVector {
            description,
            fields,
            photos,
        } => {
            let mut photo_text = Vec::new();
            if !photos.is_empty() {
                let tagger = PhotoTagger::from_config(&config.tagging, &config.gateway);
                for (_, result) in tagger.tag_photos(&photos).await {
                    if let Ok(tags) = result {
                        photo_text.push(tags.as_signal_text());
                    }
                }
            }
            print_json(&compute_listing_vibe_vector(&description, &photo_text, &fields))
        }
        Command::BuyerVector { events } => {
            let events: Vec<SwipeEvent> = read_json(&events)?;
            print_json(&compute_buyer_vibe_vector(&events))
        }
        Command::Leads { events, listings } => {
            let events: Vec<SwipeEvent> = read_json(&events)?;
            let listings: Vec<ListingVectorRecord> = read_json(&listings)?;
            let buyer = compute_buyer_vibe_vector(&events);
            let leads = rank_lead_candidates(
                &buyer.vector,
                listings.iter().map(|l| (l.listing_id.as_str(), &l.vector)),
                config.matching.lead_threshold,
                config.matching.max_leads,
            );
            print_json(&leads)
        }
    }
}
