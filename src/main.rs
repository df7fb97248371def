use pidroute::scene::Scene;
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // stdout carries the JSON report only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pidroute=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scene.json> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>   Output file (default: stdout)");
        eprintln!("  -p, --pretty          Pretty-print the JSON report");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut pretty = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-p" | "--pretty" => pretty = true,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let scene = match Scene::from_json(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Scene error: {}", e);
            process::exit(1);
        }
    };

    let report = match scene.run() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Routing error: {}", e);
            process::exit(1);
        }
    };

    let invalid = report.connections.errors;
    if invalid > 0 {
        tracing::warn!(invalid, "some connections failed validation");
    }

    let json = match report.to_json(pretty) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Failed to encode report: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => println!("{}", json),
    }
}
