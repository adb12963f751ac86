use anyhow::Result;
use colored::*;

use nioi_detectors::SmellCategory;

pub fn execute() -> Result<()> {
    println!("{}", "Configured smell categories:".bold());
    for category in SmellCategory::all() {
        println!("  {:<25} {}", category.id().cyan(), category.label());
    }
    Ok(())
}
