use clap::{Parser, Subcommand};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rummikub")]
#[command(about = "Rummikub - combined server and client launcher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server and several CLI clients
    Both {
        /// Number of clients to start
        #[arg(short, long, default_value = "2")]
        clients: u32,
        /// Port for the server
        #[arg(short, long, default_value = "9001")]
        port: u16,
        /// Number of player seats
        #[arg(long, default_value = "5")]
        players: u32,
    },
    /// Run only the server
    Server {
        /// Port for the server
        #[arg(short, long, default_value = "9001")]
        port: u16,
        /// Number of player seats
        #[arg(long, default_value = "5")]
        players: u32,
    },
    /// Run only a CLI client
    Client,
    /// Run a hot-seat game in this terminal, no sockets
    Local {
        /// Number of player seats
        #[arg(long, default_value = "2")]
        players: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Both { clients, port, players } => run_both(clients, port, players),
        Commands::Server { port, players } => run_server(port, players, &[]),
        Commands::Client => run_client(),
        Commands::Local { players } => run_server(0, players, &["--local"]),
    }
}

fn run_both(clients: u32, port: u16, players: u32) {
    println!("🚀 Starting rummikub server + {} clients on port {}", clients, port);

    let server_handle = thread::spawn(move || {
        run_server(port, players, &[]);
    });

    // Give the server a moment to bind before clients dial in.
    thread::sleep(Duration::from_millis(1500));

    let mut client_handles = Vec::new();
    for i in 1..=clients {
        println!("🎮 Starting client {}...", i);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(500 * i as u64));
            run_client();
        });
        client_handles.push(handle);
    }

    println!("✅ All processes started. Press Ctrl+C to stop.");

    for handle in client_handles {
        let _ = handle.join();
    }
    let _ = server_handle.join();
}

fn run_server(port: u16, players: u32, extra_args: &[&str]) {
    let mut args = vec!["run", "-p", "rummikub-server"];
    if !extra_args.is_empty() {
        args.push("--");
        args.extend_from_slice(extra_args);
    }
    let status = Command::new("cargo")
        .args(&args)
        .env("ADDR", format!("0.0.0.0:{}", port))
        .env("PLAYERS", players.to_string())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();

    match status {
        Ok(exit_status) => {
            if !exit_status.success() {
                eprintln!("❌ Server exited with error: {}", exit_status);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to start server: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_client() {
    let status = Command::new("cargo")
        .args(&["run", "--bin", "cli_client"])
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();

    match status {
        Ok(exit_status) => {
            if !exit_status.success() {
                eprintln!("❌ Client exited with error: {}", exit_status);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to start client: {}", e);
            std::process::exit(1);
        }
    }
}
