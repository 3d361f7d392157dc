use anyhow::Result;
use console::style;
use docent::store::{DocumentStore, FileDocumentStore};

pub fn execute() -> Result<()> {
    let store = FileDocumentStore::default_location()?;
    store.clear()?;
    println!(
        "{} {}",
        style("Cleared").bold().green(),
        style(store.dir().display()).dim()
    );
    Ok(())
}
