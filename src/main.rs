#[tokio::main]
async fn main() {
    if let Err(error) = theme_admin_lib::run().await {
        eprintln!("theme-admin failed: {}", error);
        std::process::exit(1);
    }
}
