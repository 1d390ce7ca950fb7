use std::path::Path;

use crate::categories::CategorySet;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path};

pub fn run(config: Option<&Path>, data_dir: Option<String>, base_currency: Option<String>) -> Result<()> {
    let mut settings = load_settings(config);
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(currency) = base_currency {
        settings.base_currency = currency.trim().to_uppercase();
    }
    // validates before anything is written
    settings.tracker_config()?;

    let dir = settings.data_dir();
    std::fs::create_dir_all(&dir)?;
    save_settings(&settings, config)?;

    let categories = settings.categories_path();
    if !categories.exists() {
        std::fs::write(&categories, format!("{}\n", CategorySet::new().to_json()?))?;
        println!("Created {}", categories.display());
    }

    let written = config.map_or_else(settings_path, Path::to_path_buf);
    println!("Settings saved to {}", written.display());
    println!("Data directory: {}", dir.display());
    println!("Put your exports at:");
    for (platform, path) in settings.sources() {
        println!("  {platform}: {}", path.display());
    }
    Ok(())
}
