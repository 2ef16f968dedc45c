//! # Courtside Domain
//!
//! Entity families and typed store wrappers for the Courtside booking
//! platform. Each family pairs its plain data shapes with a wrapper that owns
//! the [`DomainStore`](courtside_runtime::DomainStore) instances for the
//! family and exposes the operations the application actually calls:
//!
//! - [`VenueDirectory`]: venues plus the multi-step creation wizard draft
//! - [`AcademyRoster`]: academies, students, attendance, announcements
//! - [`PartnerBookingDesk`]: partner-side bookings mirrored into the public
//!   [`BookingBoard`](booking::PartnerBookingDesk::board)
//! - [`EventManager`] / [`RequestBook`]: managed events mirrored into the
//!   public catalog, with registration requests alongside
//!
//! Entities reference each other by [`EntityId`](courtside_core::entity::EntityId)
//! only. There is no referential integrity and no cascade: removing a venue
//! leaves bookings that reference it untouched unless the caller removes them
//! too.

/// Academies, students, attendance records and announcements
pub mod academy;

/// Partner bookings and the public booking board
pub mod booking;

/// Managed events, the public catalog and registration requests
pub mod event;

/// Venues and the venue creation wizard
pub mod venue;

pub use academy::{Academy, AcademyRoster, Announcement, AttendanceRecord, Student};
pub use booking::{Booking, GuestDetails, PartnerBooking, PartnerBookingDesk};
pub use event::{Event, EventManager, RegistrationRequest, RequestBook, RequestStatus};
pub use venue::{Address, AddressPatch, ContactInfo, ContactPatch, Venue, VenueDirectory, VenueDraft};
