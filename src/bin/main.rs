use clap::Parser;
use log::LevelFilter;

use app_hub::Builder;

/// Demo client for the license-gated configuration hub: prints the machine
/// identity, runs the license check, resolves parameters, and lists every
/// licensed user.
#[derive(Debug, Parser)]
#[command(name = "app-hub", version, about)]
struct Args {
    /// Application name to check against the license table.
    #[arg(default_value = "joystick")]
    app: String,

    /// Declared client version (integer).
    #[arg(short = 'c', long, default_value = "5")]
    client_version: String,

    /// Document store base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Parameters to resolve after a successful check (repeatable).
    #[arg(short, long)]
    param: Vec<String>,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .init();

    let args = Args::parse();

    let mut builder = Builder::new(&args.app, &args.client_version).timeout_secs(args.timeout);
    if let Some(base_url) = &args.base_url {
        builder = builder.base_url(base_url);
    }
    let mut hub = builder.build();

    println!("machine identity: {}", hub.hwid());

    let granted = match hub.check_license() {
        Ok(grant) => {
            println!(
                "access granted: {} | {} | server {}",
                grant.user_name, grant.level, grant.server_name
            );

            for name in &args.param {
                match hub.get(name) {
                    Some(value) => println!("{name} = {value}"),
                    None => println!("{name} = <not found>"),
                }
            }

            true
        }
        Err(denial) => {
            eprintln!("access denied [{}]: {}", denial.code(), denial);
            false
        }
    };

    if let Some(roster) = hub.roster() {
        println!("\nlicensed users for '{}':", args.app);
        for entry in roster {
            let status = if entry.active {
                "active".to_string()
            } else {
                format!("until {}", entry.expires.as_deref().unwrap_or("-"))
            };
            println!(
                "  {:<12} | {:<4} | {:<10} | {}",
                entry.user_name, entry.level, entry.server_name, status
            );
        }
    }

    if !granted {
        std::process::exit(1);
    }
}
