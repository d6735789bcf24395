use anyhow::Context;
use mlb_loader::config::Config;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::load(None).context("Failed to load configuration")?;
    let path = &config.database.path;

    if !path.exists() {
        println!("Nothing to do: {} does not exist", path.display());
        return Ok(());
    }

    println!("⚠️  WARNING: This will delete {} and every table in it!", path.display());
    println!("Press Enter to continue or Ctrl+C to cancel...");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    println!("🗑️  Removing database...");
    std::fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;

    println!("✅ Database removed; run `mlb_loader run` to rebuild it");
    Ok(())
}
