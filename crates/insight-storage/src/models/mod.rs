pub mod address;
pub mod client;
pub mod owner;
pub mod property;
pub mod rental;
pub mod report;
pub mod review;

pub use address::{Address, AddressUpdate};
pub use client::{Client, ClientUpdate};
pub use owner::{Owner, OwnerUpdate};
pub use property::{Property, PropertyUpdate};
pub use rental::{Rental, RentalUpdate};
pub use report::{ClientRentalCount, PropertyDetails, RatedProperty, RentalDetails};
pub use review::{Review, ReviewUpdate};
