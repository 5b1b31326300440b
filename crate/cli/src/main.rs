use std::process;

use jacarta_cli::jacarta_main;

#[tokio::main]
async fn main() {
    if let Some(err) = jacarta_main().await.err() {
        eprintln!("ERROR: {err}");
        process::exit(1);
    }
}
