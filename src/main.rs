fn main() -> anyhow::Result<()> {
    discord_gtk::run()?;
    Ok(())
}
