//! rewind-import CLI tool
//!
//! Loads session archives into the replay server's RocksDB store.
//!
//! Usage:
//!   rewind-import load <archive.json>...
//!   rewind-import delete <session_id>
//!   rewind-import list

use rewind_server::{ServerConfig, SessionArchive, Storage};

fn print_usage() {
    eprintln!("rewind-import - Manage archived sessions for replay");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  rewind-import load <archive.json>...   Import session archives");
    eprintln!("  rewind-import delete <session_id>      Remove a session and its telemetry");
    eprintln!("  rewind-import list                     List archived sessions");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  REWIND_DATA_DIR  Archive directory (default: ./rewind-data)");
    eprintln!();
    eprintln!("Stop the server before importing; RocksDB allows one writer process.");
}

fn open_storage() -> Result<Storage, String> {
    let dir = ServerConfig::from_env().map_err(|e| e.to_string())?.data_dir;
    std::fs::create_dir_all(&dir).map_err(|e| format!("Cannot create {:?}: {}", dir, e))?;
    Storage::open(&dir).map_err(|e| format!("Cannot open archive at {:?}: {}", dir, e))
}

fn load(paths: &[String]) -> Result<(), String> {
    if paths.is_empty() {
        return Err("load requires at least one archive file".into());
    }
    let storage = open_storage()?;
    for path in paths {
        let bytes = std::fs::read(path).map_err(|e| format!("Cannot read {}: {}", path, e))?;
        let archive: SessionArchive =
            serde_json::from_slice(&bytes).map_err(|e| format!("Invalid archive {}: {}", path, e))?;
        storage.import(&archive).map_err(|e| e.to_string())?;
        println!(
            "Imported session {} ({} laps, {} telemetry series)",
            archive.session.session_id,
            archive.session.laps.len(),
            archive.telemetry.len()
        );
    }
    Ok(())
}

fn delete(arg: Option<&String>) -> Result<(), String> {
    let session_id: u64 = arg
        .ok_or("delete requires a session id")?
        .parse()
        .map_err(|e| format!("Invalid session id: {}", e))?;
    open_storage()?
        .delete_session(session_id)
        .map_err(|e| e.to_string())?;
    println!("Deleted session {}", session_id);
    Ok(())
}

fn list() -> Result<(), String> {
    let sessions = open_storage()?.list_sessions().map_err(|e| e.to_string())?;
    if sessions.is_empty() {
        println!("No archived sessions");
    }
    for s in sessions {
        println!(
            "{:>8}  {:>3} laps  {:>3} drivers  {:>5} lap records",
            s.session_id, s.total_laps, s.driver_count, s.lap_count
        );
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "load" => load(&args[2..]),
        "delete" => delete(args.get(2)),
        "list" => list(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("Unknown command: {}", other)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
