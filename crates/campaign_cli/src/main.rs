use std::fs;
use std::path::PathBuf;
use std::process;

use campaign_core::campaign::ChecksumStatus;
use campaign_core::core_api::{Engine, Session};
use campaign_core::hash::hash_dvar;
use campaign_core::layout::SectionId;
use campaign_core::segment2::DvarMap;
use clap::Parser;
use serde_json::{Map as JsonMap, Value as JsonValue, json};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE")]
    path: PathBuf,
    /// List every dvar as hash=value.
    #[arg(long)]
    dvars: bool,
    /// Print one dvar, by name or 0x hash.
    #[arg(long = "get-dvar", value_name = "NAME")]
    get_dvar: Vec<String>,
    /// Print where the header and each segment sit in the written file.
    #[arg(long)]
    layout: bool,
    #[arg(long)]
    json: bool,
    /// Set a dvar, by name or 0x hash.
    #[arg(long = "set-dvar", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set_dvar: Vec<(String, String)>,
    /// Keep a dvar key but leave it out of the written save.
    #[arg(long = "unset-dvar", value_name = "NAME")]
    unset_dvar: Vec<String>,
    #[arg(long = "remove-dvar", value_name = "NAME")]
    remove_dvar: Vec<String>,
    /// Write the dvar table (after any edits) as JSON.
    #[arg(long = "export-dvars", value_name = "PATH")]
    export_dvars: Option<PathBuf>,
    /// Replace the whole dvar table from a JSON object of hash to value.
    #[arg(long = "import-dvars", value_name = "PATH")]
    import_dvars: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default, Clone, Copy)]
struct FieldSelection {
    dvars: bool,
    get_dvar: bool,
    layout: bool,
}

impl FieldSelection {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            dvars: cli.dvars,
            get_dvar: !cli.get_dvar.is_empty(),
            layout: cli.layout,
        }
    }

    fn is_field_mode(&self) -> bool {
        self.dvars || self.get_dvar || self.layout
    }

    fn selected_pairs(&self, cli: &Cli, session: &Session) -> Vec<(String, String)> {
        let mut out = Vec::new();

        for name in &cli.get_dvar {
            out.push((
                name.clone(),
                session.dvar(name).unwrap_or("<unset>").to_string(),
            ));
        }
        if self.dvars {
            for entry in session.dvars() {
                out.push((
                    entry.hash,
                    entry.value.unwrap_or_else(|| "<unset>".to_string()),
                ));
            }
        }
        if self.layout {
            for section in session.layout().sections {
                out.push((
                    section_label(section.id),
                    format!("{:#x}..{:#x}", section.range.start, section.range.end),
                ));
            }
        }

        out
    }

    fn selected_json(&self, cli: &Cli, session: &Session) -> JsonMap<String, JsonValue> {
        let mut out = JsonMap::new();

        if self.get_dvar {
            let values: JsonMap<String, JsonValue> = cli
                .get_dvar
                .iter()
                .map(|name| (name.clone(), json!(session.dvar(name))))
                .collect();
            out.insert("get_dvar".to_string(), JsonValue::Object(values));
        }
        if self.dvars {
            out.insert("dvars".to_string(), dvars_to_json(session));
        }
        if self.layout {
            out.insert("layout".to_string(), layout_to_json(session));
        }

        out
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let fields = FieldSelection::from_cli(&cli);
    let has_edits = !cli.set_dvar.is_empty()
        || !cli.unset_dvar.is_empty()
        || !cli.remove_dvar.is_empty()
        || cli.import_dvars.is_some();

    if has_edits && cli.output.is_none() {
        eprintln!("dvar edits require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one dvar edit");
        process::exit(2);
    }

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    log::debug!("read {} bytes from {}", bytes.len(), cli.path.display());
    let engine = Engine::new();
    let mut session = engine.open_bytes(bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", cli.path.display());
        eprintln!("  {}", e);
        process::exit(1);
    });

    if let Some(path) = &cli.import_dvars {
        let dvars = read_dvar_backup(path).unwrap_or_else(|e| {
            eprintln!("Failed to import dvar file {}: {e}", path.display());
            process::exit(1);
        });
        session.import_dvars(dvars);
    }
    for (name, value) in &cli.set_dvar {
        session.set_dvar(name, value).unwrap_or_else(|e| {
            eprintln!("Error setting dvar {name}: {e}");
            process::exit(1);
        });
    }
    for name in &cli.unset_dvar {
        session.unset_dvar(name);
    }
    for name in &cli.remove_dvar {
        session.remove_dvar(name).unwrap_or_else(|e| {
            eprintln!("Error removing dvar: {e}");
            process::exit(1);
        });
    }

    if let Some(path) = &cli.export_dvars {
        let rendered = serde_json::to_string_pretty(&session.export_dvars()).unwrap_or_else(|e| {
            eprintln!("Error rendering dvar backup: {e}");
            process::exit(1);
        });
        fs::write(path, rendered).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", path.display());
            process::exit(1);
        });
    }

    if let Some(out_path) = &cli.output {
        let edited_bytes = session.to_bytes().unwrap_or_else(|e| {
            eprintln!("Error creating modified save bytes: {e}");
            process::exit(1);
        });
        log::info!("writing {} bytes to {}", edited_bytes.len(), out_path.display());
        fs::write(out_path, edited_bytes).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
    }

    if cli.json {
        let json = if fields.is_field_mode() {
            JsonValue::Object(fields.selected_json(&cli, &session))
        } else {
            JsonValue::Object(default_json(&session))
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_field_mode() {
        for (key, value) in fields.selected_pairs(&cli, &session) {
            println!("{key}={value}");
        }
        return;
    }

    if let Some(out_path) = &cli.output {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    print_summary(&session);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    let (name, rhs) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {value:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("dvar name must not be empty".to_string());
    }
    Ok((name.to_string(), rhs.to_string()))
}

fn read_dvar_backup(path: &PathBuf) -> Result<DvarMap, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "checksum".to_string(),
        serde_json::to_value(snapshot.checksum).unwrap_or(JsonValue::Null),
    );
    out.insert("segments".to_string(), json!(snapshot.segment_count));
    out.insert("payload_len".to_string(), json!(snapshot.payload_len));
    out.insert("trailing_len".to_string(), json!(snapshot.trailing_len));
    out.insert("dvar_count".to_string(), json!(snapshot.dvar_count));
    out.insert("stored_health".to_string(), json!(snapshot.stored_health));
    out.insert(
        "effective_health".to_string(),
        json!(snapshot.effective_health),
    );
    out.insert(
        "string_tables".to_string(),
        JsonValue::Array(
            snapshot
                .string_tables
                .iter()
                .map(|s| {
                    json!({
                        "table": s.table.as_str(),
                        "capacity": s.capacity,
                        "populated": s.populated,
                    })
                })
                .collect(),
        ),
    );

    out
}

fn dvars_to_json(session: &Session) -> JsonValue {
    JsonValue::Array(
        session
            .dvars()
            .into_iter()
            .map(|entry| json!({ "hash": entry.hash, "value": entry.value }))
            .collect(),
    )
}

fn layout_to_json(session: &Session) -> JsonValue {
    let layout = session.layout();
    JsonValue::Array(
        layout
            .sections
            .iter()
            .map(|section| {
                json!({
                    "id": section_label(section.id),
                    "start": section.range.start,
                    "end": section.range.end,
                    "len": section.range.len(),
                })
            })
            .collect(),
    )
}

fn section_label(id: SectionId) -> String {
    match id {
        SectionId::Header => "header".to_string(),
        SectionId::Segment(index) => format!("segment{index}"),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

fn print_summary(session: &Session) {
    let snapshot = session.snapshot();

    println!("CAMPAIGN SAVE");
    println!("=============");
    match snapshot.checksum {
        ChecksumStatus::Valid { checksum } => println!("Checksum:       {checksum:#010x} (ok)"),
        ChecksumStatus::Mismatch { stored, computed } => println!(
            "Checksum:       {stored:#010x} (MISMATCH, computed {computed:#010x}; file may have been tampered with)"
        ),
    }
    println!("Segments:       {}", snapshot.segment_count);
    println!("Payload:        {} bytes", snapshot.payload_len);
    if snapshot.trailing_len > 0 {
        println!("Trailing bytes: {} (dropped on save)", snapshot.trailing_len);
    }
    println!("Dvars:          {}", snapshot.dvar_count);
    match snapshot.effective_health {
        Some(health) if health != snapshot.stored_health => println!(
            "Health:         {} (stored {}, overridden by {})",
            health,
            snapshot.stored_health,
            hash_dvar("g_player_maxHealth")
        ),
        Some(health) => println!("Health:         {health}"),
        None => println!(
            "Health:         {} (health dvar is not numeric)",
            snapshot.stored_health
        ),
    }

    println!();
    println!(" ::: String Tables :::");
    for table in &snapshot.string_tables {
        println!(
            "  {:<10} {:>5} / {:<5}",
            table.table.as_str(),
            table.populated,
            table.capacity
        );
    }
}
