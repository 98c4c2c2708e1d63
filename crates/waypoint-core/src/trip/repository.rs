//! Trip and media repository traits.
//!
//! Defines the interface for persisting trips and uploading their media,
//! decoupling the organizer from the marketplace backend.

use super::media::UploadFile;
use super::model::Trip;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for persisting the trip being edited.
///
/// The backend is the system of record; the organizer holds a cache with
/// local-wins semantics and writes the whole document back on every save.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Replaces the stored trip with the given document.
    ///
    /// # Arguments
    ///
    /// * `trip_id` - The backend identifier of the trip
    /// * `trip` - The full trip body, derived fields included
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Trip saved successfully
    /// - `Err(_)`: The backend rejected the write or could not be reached
    async fn patch_trip(&self, trip_id: &str, trip: &Trip) -> Result<()>;
}

/// Stores uploaded media and hands back a public URL.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Uploads a file and returns the URL it is served from.
    async fn upload(&self, file: UploadFile) -> Result<String>;
}
