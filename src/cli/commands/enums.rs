//! Listings of the fixed categories and departments.

use civic_core::{Category, Department};

use crate::error::Result;
use crate::format::{CategoryInfo, format_category_badge};

/// Execute the categories command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn categories(json: bool) -> Result<()> {
    let infos: Vec<CategoryInfo> = Category::ALL.into_iter().map(CategoryInfo::from).collect();
    if json {
        println!("{}", serde_json::to_string(&infos)?);
        return Ok(());
    }
    for info in &infos {
        let appeal = if info.appeal { "  (appeal)" } else { "" };
        println!(
            "{} -> {}{appeal}",
            format_category_badge(info.category),
            info.department
        );
    }
    Ok(())
}

/// Execute the departments command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn departments(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&Department::ASSIGNABLE)?);
        return Ok(());
    }
    for department in Department::ASSIGNABLE {
        println!("{department}");
    }
    Ok(())
}
