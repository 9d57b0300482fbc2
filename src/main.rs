use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = verbsuggest::cli::Cli::parse();
    if let Err(err) = verbsuggest::cli::run(cli).await {
        eprintln!("verbsuggest: {}", err);
        if let Some(hint) = err.hint.as_deref() {
            eprintln!("hint: {}", hint);
        }
        std::process::exit(err.exit_code());
    }
}
