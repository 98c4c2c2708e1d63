use super::utils::read_json;
use anyhow::Result;
use std::path::Path;
use waypoint_core::service_form::ServiceDraft;

pub fn validate(draft_path: &Path) -> Result<()> {
    let draft: ServiceDraft = read_json(draft_path)?;

    match draft.validate() {
        Ok(listing) => {
            println!("✅ Listing is valid");
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(())
        }
        Err(errors) => {
            println!("❌ Listing has {} problem(s):", errors.iter().count());
            for (field, error) in errors.iter() {
                println!("  - {}: {}", field, error);
            }
            anyhow::bail!("service draft is invalid")
        }
    }
}
