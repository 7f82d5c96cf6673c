use mismatch::grid::SweepConfig;

fn main() -> serde_json::Result<()> {
    let config = SweepConfig::default();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
