//! The trip aggregate and its satellite types.

pub mod location;
pub mod media;
pub mod model;
pub mod repository;

pub use location::{AddressComponent, GeoPoint, Geocoder, Location, PlaceDetails};
pub use media::{CarouselImage, ImageCarousel, Media, MediaFile, MediaFiles, MediaSize, MediaSlot, UploadFile};
pub use model::{
    DayAssignment, LocalizedText, OtherAttributes, Privacy, SelectedServiceOption, Service,
    ServiceId, Tag, Trip,
};
pub use repository::{MediaRepository, TripRepository};
