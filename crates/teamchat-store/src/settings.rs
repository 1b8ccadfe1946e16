//! Company branding updates.

use tracing::info;

use crate::error::{Result, StoreError};
use crate::store::Store;

impl Store {
    /// Update the company name and description.  A blank name keeps the
    /// current one.
    pub fn update_company(&mut self, name: &str, description: Option<&str>) {
        let name = name.trim();
        if !name.is_empty() {
            self.company.name = name.to_string();
        }
        if let Some(description) = description {
            self.company.description = description.trim().to_string();
        }

        info!(name = %self.company.name, "company settings updated");
        self.save();
    }

    /// Replace the company logo.  Only `data:image/...` URLs are accepted.
    pub fn set_logo(&mut self, data_url: &str) -> Result<()> {
        if !data_url.starts_with("data:image/") {
            return Err(StoreError::Validation(
                "logo must be an image data URL".into(),
            ));
        }

        self.company.logo = Some(data_url.to_string());
        info!(bytes = data_url.len(), "company logo updated");
        self.save();
        Ok(())
    }
}
