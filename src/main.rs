use colored::Colorize;

#[tokio::main]
async fn main() {
    if let Err(e) = plushy::run().await {
        eprintln!("{} {:#}", "error:".bright_red().bold(), e);
        std::process::exit(1);
    }
}
